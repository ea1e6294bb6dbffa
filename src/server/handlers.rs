// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the newsroom project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Static front end and CORS preflight
//!
//! Any GET that no API route answers is served from the static directory.
//! Paths without a matching file get `index.html` so the single-page front
//! end can route on the client side. Paths under `/api` never fall back and
//! end in a JSON 404 instead.

use std::path::{Path, PathBuf};

use include_dir::{include_dir, Dir};
use log::debug;
use rocket::http::ContentType;
use rocket::{get, options, State};

use super::responders::StaticFileResponse;

/// Front end embedded in the binary, used when no static directory is
/// configured or when it lacks a file
const STATIC_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/static");

const INDEX: &str = "index.html";

/// Location of the deployed front end
#[derive(Debug, Clone, Default)]
pub struct StaticSite {
    pub root: Option<PathBuf>,
}

impl StaticSite {
    pub fn new(root: Option<PathBuf>) -> Self {
        StaticSite { root }
    }

    /// Contents of `path` from the static directory, then from the embedded copy
    async fn load(&self, path: &Path) -> Option<Vec<u8>> {
        if let Some(root) = &self.root {
            let candidate = root.join(path);
            if tokio::fs::metadata(&candidate)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false)
            {
                match tokio::fs::read(&candidate).await {
                    Ok(content) => return Some(content),
                    Err(e) => debug!("Failed to read {:?}: {}", candidate, e),
                }
            }
        }
        STATIC_DIR
            .get_file(path)
            .map(|file| file.contents().to_vec())
    }
}

fn content_type_of(path: &Path) -> ContentType {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(ContentType::from_extension)
        .unwrap_or(ContentType::Binary)
}

/// Accept every CORS preflight request; the CORS fairing adds the headers
#[options("/<_path..>")]
pub async fn options(_path: PathBuf) -> Result<(), std::io::Error> {
    Ok(())
}

/// Serve a static file, or `index.html` for client-side routes
#[get("/<path..>", rank = 20)]
pub async fn spa(path: PathBuf, site: &State<StaticSite>) -> Option<StaticFileResponse> {
    if path.starts_with("api") {
        return None;
    }

    if !path.as_os_str().is_empty() {
        if let Some(content) = site.load(&path).await {
            return Some(StaticFileResponse {
                content,
                content_type: content_type_of(&path),
                cacheable: path != Path::new(INDEX),
            });
        }
        debug!("No static file for /{}, serving {}", path.display(), INDEX);
    }

    site.load(Path::new(INDEX))
        .await
        .map(|content| StaticFileResponse {
            content,
            content_type: ContentType::HTML,
            cacheable: false,
        })
}
