// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the newsroom project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Uploaded files
//!
//! Metadata lives in memory (plus snapshot); contents are written to
//! `<upload_dir>/<id>` so a client-supplied file name never reaches the
//! filesystem.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::{snapshot, StoreError};

/// Metadata of an uploaded file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: String,
    /// Name given by the uploader, used for downloads
    pub filename: String,
    pub content_type: String,
    pub size: u64,
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
}

/// File store backed by a directory
pub struct FileStore {
    records: RwLock<BTreeMap<String, FileRecord>>,
    snapshot: Option<PathBuf>,
    upload_dir: PathBuf,
    max_size: u64,
}

impl FileStore {
    pub fn open(
        upload_dir: impl Into<PathBuf>,
        max_size: u64,
        snapshot_path: Option<PathBuf>,
    ) -> Result<Self, StoreError> {
        Ok(FileStore {
            records: RwLock::new(snapshot::load(snapshot_path.as_deref())?),
            snapshot: snapshot_path,
            upload_dir: upload_dir.into(),
            max_size,
        })
    }

    /// Largest accepted upload in bytes
    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    pub fn list(&self) -> Result<Vec<FileRecord>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned("file"))?;
        let mut list: Vec<FileRecord> = records.values().cloned().collect();
        list.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(list)
    }

    pub fn get(&self, id: &str) -> Result<FileRecord, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned("file"))?;
        records
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("file", id))
    }

    /// Metadata and contents of a file
    pub async fn read(&self, id: &str) -> Result<(FileRecord, Vec<u8>), StoreError> {
        let record = self.get(id)?;
        let path = self.upload_dir.join(&record.id);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| StoreError::io(&path, e))?;
        Ok((record, bytes))
    }

    /// Store a new file
    pub async fn save(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
        uploaded_by: &str,
    ) -> Result<FileRecord, StoreError> {
        let size = bytes.len() as u64;
        if size > self.max_size {
            return Err(StoreError::TooLarge {
                size,
                limit: self.max_size,
            });
        }

        let record = FileRecord {
            id: uuid::Uuid::new_v4().to_string(),
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            size,
            uploaded_by: uploaded_by.to_string(),
            uploaded_at: Utc::now(),
        };

        tokio::fs::create_dir_all(&self.upload_dir)
            .await
            .map_err(|e| StoreError::io(&self.upload_dir, e))?;
        let path = self.upload_dir.join(&record.id);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| StoreError::io(&path, e))?;
        debug!("Stored {} bytes for {} at {:?}", size, filename, path);

        let committed = match self.records.write() {
            Ok(mut records) => {
                snapshot::commit(self.snapshot.as_deref(), &mut *records, |records| {
                    records.insert(record.id.clone(), record.clone());
                    Ok(())
                })
            }
            Err(_) => Err(StoreError::Poisoned("file")),
        };
        if let Err(e) = committed {
            if let Err(cleanup) = tokio::fs::remove_file(&path).await {
                warn!("Failed to remove orphan contents at {:?}: {}", path, cleanup);
            }
            return Err(e);
        }
        Ok(record)
    }

    /// Remove a file's metadata and contents
    pub async fn delete(&self, id: &str) -> Result<FileRecord, StoreError> {
        let record = {
            let mut records = self.records.write().map_err(|_| StoreError::Poisoned("file"))?;
            snapshot::commit(self.snapshot.as_deref(), &mut *records, |records| {
                records
                    .remove(id)
                    .ok_or_else(|| StoreError::not_found("file", id))
            })?
        };

        let path = self.upload_dir.join(&record.id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Contents of file {} were already gone", record.id);
            }
            Err(e) => return Err(StoreError::io(&path, e)),
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_save_read_delete() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path().join("uploads"), 1024, None).unwrap();

        let record = store
            .save("notes.txt", "text/plain", b"hello".to_vec(), "u1")
            .await
            .unwrap();
        assert_eq!(record.size, 5);

        let (meta, bytes) = store.read(&record.id).await.unwrap();
        assert_eq!(meta.filename, "notes.txt");
        assert_eq!(bytes, b"hello");

        store.delete(&record.id).await.unwrap();
        assert!(store.get(&record.id).is_err());
        assert!(!dir.path().join("uploads").join(&record.id).exists());
    }

    #[tokio::test]
    async fn test_upload_limit() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path(), 4, None).unwrap();

        let err = store
            .save("big.bin", "application/octet-stream", vec![0u8; 5], "u1")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::TooLarge { size: 5, limit: 4 }));
        assert!(store.list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_metadata_snapshot() {
        let dir = tempdir().unwrap();
        let snapshot = dir.path().join("files.json");
        let id = {
            let store = FileStore::open(dir.path().join("up"), 1024, Some(snapshot.clone())).unwrap();
            store
                .save("a.txt", "text/plain", b"a".to_vec(), "u1")
                .await
                .unwrap()
                .id
        };
        let store = FileStore::open(dir.path().join("up"), 1024, Some(snapshot)).unwrap();
        let (_, bytes) = store.read(&id).await.unwrap();
        assert_eq!(bytes, b"a");
    }

    #[tokio::test]
    async fn test_failed_snapshot_discards_upload() {
        let dir = tempdir().unwrap();
        let snapshot = dir.path().join("files.json");
        let uploads = dir.path().join("up");
        let store = FileStore::open(&uploads, 1024, Some(snapshot.clone())).unwrap();
        std::fs::create_dir_all(&snapshot).unwrap();

        let result = store.save("a.txt", "text/plain", b"a".to_vec(), "u1").await;

        assert!(matches!(result, Err(StoreError::Io { .. })));
        assert!(store.list().unwrap().is_empty());
        assert_eq!(std::fs::read_dir(&uploads).unwrap().count(), 0);
    }
}
