// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the newsroom project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Storage locations

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where users, tokens, articles and uploads are kept.
///
/// Without `data_dir`, users, the token ledger, articles and file metadata
/// only live in memory and are lost on restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for the JSON snapshots of every store.
    #[serde(default)]
    pub data_dir: Option<String>,

    /// Directory receiving uploaded file contents.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,

    /// Largest accepted upload, in bytes. Default is 16 MiB.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_max_upload_size() -> u64 {
    16 * 1024 * 1024
}

impl StorageConfig {
    /// Path of the snapshot file `name` inside `data_dir`
    pub fn snapshot_path(&self, name: &str) -> Option<PathBuf> {
        self.data_dir
            .as_ref()
            .map(|dir| PathBuf::from(dir).join(name))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            upload_dir: default_upload_dir(),
            max_upload_size: default_max_upload_size(),
        }
    }
}
