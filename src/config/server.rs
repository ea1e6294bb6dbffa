// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the newsroom project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! HTTP server configuration

use serde::{Deserialize, Serialize};

/// Configuration for the HTTP server.
///
/// ### Static front end
///
/// When `static_dir` points to an existing directory (typically the build
/// output of the single-page client), files are served from it and every
/// unmatched non-API path falls back to its `index.html`. Without it, the
/// `index.html` embedded in the binary is served instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The TCP port the server will listen on. Default value is 8080.
    #[serde(default = "default_port")]
    pub port: u16,

    /// The network address the server will bind to.
    ///
    /// Can be an IPv4/IPv6 address or a hostname. Default is "127.0.0.1".
    #[serde(default = "default_address")]
    pub address: String,

    /// The server name reported in HTTP headers and logs.
    #[serde(default = "default_name")]
    pub name: String,

    /// Directory holding the built front end, if any.
    #[serde(default)]
    pub static_dir: Option<String>,

    /// Add permissive CORS headers to every response. Default is `true`.
    #[serde(default = "default_cors")]
    pub enable_cors: bool,
}

fn default_port() -> u16 {
    8080
}

fn default_address() -> String {
    "127.0.0.1".to_string()
}

fn default_name() -> String {
    format!("NewsroomServer/{}", env!("CARGO_PKG_VERSION"))
}

fn default_cors() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            address: default_address(),
            name: default_name(),
            static_dir: None,
            enable_cors: default_cors(),
        }
    }
}
