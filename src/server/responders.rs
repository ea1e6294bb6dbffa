// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the newsroom project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Binary responders for static assets and uploaded files

use std::fmt::Debug;
use std::io::Cursor;

use rocket::http::{ContentType, Header};
use rocket::response::{self, Responder, Response};
use rocket::Request;

use crate::store::FileRecord;

/// Static asset with its content type
///
/// Hashed front-end bundles are safe to cache for a week; `index.html` is
/// served with `no-cache` so a new deployment is picked up at once.
pub struct StaticFileResponse {
    pub content: Vec<u8>,
    pub content_type: ContentType,
    pub cacheable: bool,
}

/// Prints at most the first 1000 characters of text content, or the
/// first 100 bytes of binary content
impl Debug for StaticFileResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ct = &self.content_type;
        if ct.is_text() || ct.is_html() || ct.is_json() {
            let text_content = String::from_utf8_lossy(&self.content);
            f.debug_struct("StaticFileResponse")
                .field(
                    "content",
                    &text_content.chars().take(1000).collect::<String>(),
                )
                .field("content_type", ct)
                .finish()
        } else {
            f.debug_struct("StaticFileResponse")
                .field("binary_content_start", &self.content.get(0..100))
                .field("content_type", ct)
                .finish()
        }
    }
}

impl<'r> Responder<'r, 'static> for StaticFileResponse {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let cache_control = if self.cacheable {
            "max-age=604800"
        } else {
            "no-cache"
        };
        Response::build()
            .header(self.content_type)
            .header(Header::new("Cache-Control", cache_control))
            .sized_body(self.content.len(), Cursor::new(self.content))
            .ok()
    }
}

/// Download of an uploaded file under its original name
#[derive(Debug)]
pub struct FileDownload {
    record: FileRecord,
    bytes: Vec<u8>,
}

impl FileDownload {
    pub fn new(record: FileRecord, bytes: Vec<u8>) -> Self {
        FileDownload { record, bytes }
    }

    /// `Content-Disposition` value; quotes and control characters are
    /// replaced so the header stays well-formed
    fn disposition(&self) -> String {
        let name: String = self
            .record
            .filename
            .chars()
            .map(|c| if c == '"' || c.is_control() { '_' } else { c })
            .collect();
        format!("attachment; filename=\"{}\"", name)
    }
}

impl<'r> Responder<'r, 'static> for FileDownload {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let content_type =
            ContentType::parse_flexible(&self.record.content_type).unwrap_or(ContentType::Binary);
        let disposition = self.disposition();
        Response::build()
            .header(content_type)
            .header(Header::new("Content-Disposition", disposition))
            .sized_body(self.bytes.len(), Cursor::new(self.bytes))
            .ok()
    }
}
