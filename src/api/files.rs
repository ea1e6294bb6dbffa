// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the newsroom project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Uploaded files: public downloads, admin uploads and deletions
//!
//! Uploads send the raw file as the request body, with the file name in the
//! query string:
//!
//! ```bash
//! curl -X POST -H "Authorization: Bearer $TOKEN" -H "Content-Type: image/png" \
//!      --data-binary @logo.png "http://localhost:8080/api/files?name=logo.png"
//! ```

use std::sync::Arc;

use log::info;
use rocket::data::{Data, ToByteUnit};
use rocket::http::{ContentType, Status};
use rocket::serde::json::Json;
use rocket::{delete, get, post, State};

use super::error::ApiError;
use crate::auth::AdminOnly;
use crate::server::responders::FileDownload;
use crate::store::{FileRecord, FileStore};

/// Last path component of a client supplied file name
fn sanitize_filename(name: &str) -> Option<&str> {
    let name = name.rsplit(['/', '\\']).next()?.trim();
    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name)
    }
}

#[get("/files")]
pub fn list_files(files: &State<Arc<FileStore>>) -> Result<Json<Vec<FileRecord>>, ApiError> {
    Ok(Json(files.list()?))
}

#[get("/files/<id>")]
pub async fn download_file(
    id: &str,
    files: &State<Arc<FileStore>>,
) -> Result<FileDownload, ApiError> {
    let (record, bytes) = files.read(id).await?;
    Ok(FileDownload::new(record, bytes))
}

#[post("/files?<name>", data = "<data>")]
pub async fn upload_file(
    admin: AdminOnly,
    name: &str,
    content_type: Option<&ContentType>,
    data: Data<'_>,
    files: &State<Arc<FileStore>>,
) -> Result<(Status, Json<FileRecord>), ApiError> {
    let filename =
        sanitize_filename(name).ok_or_else(|| ApiError::bad_request("Invalid file name"))?;

    let limit = files.max_size();
    let capped = data
        .open(limit.bytes())
        .into_bytes()
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;
    if !capped.is_complete() {
        return Err(ApiError::new(
            Status::PayloadTooLarge,
            "payload_too_large",
            format!("Upload exceeds the limit of {} bytes", limit),
        ));
    }

    let content_type = content_type
        .map(|ct| ct.to_string())
        .unwrap_or_else(|| ContentType::Binary.to_string());
    let record = files
        .save(filename, &content_type, capped.into_inner(), &admin.0.user_id)
        .await?;
    info!(
        "File {} ({} bytes) uploaded by {}",
        record.filename, record.size, admin.0.user_id
    );
    Ok((Status::Created, Json(record)))
}

#[delete("/files/<id>")]
pub async fn delete_file(
    admin: AdminOnly,
    id: &str,
    files: &State<Arc<FileStore>>,
) -> Result<Status, ApiError> {
    let record = files.delete(id).await?;
    info!("File {} deleted by {}", record.filename, admin.0.user_id);
    Ok(Status::NoContent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("report.pdf"), Some("report.pdf"));
        assert_eq!(sanitize_filename("../../etc/passwd"), Some("passwd"));
        assert_eq!(sanitize_filename("C:\\tmp\\a.txt"), Some("a.txt"));
        assert_eq!(sanitize_filename("dir/"), None);
        assert_eq!(sanitize_filename(".."), None);
    }
}
