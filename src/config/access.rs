// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the newsroom project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Seed users
//!
//! Users declared here are created in the credential store at startup when
//! no user with the same handle exists yet. Existing users are never
//! overwritten, so a password changed through the API survives a restart.

use base64::Engine;
use serde::{Deserialize, Serialize};

/// User declared in the configuration file
///
/// # Fields
///
/// * `user` - The handle used to log in
/// * `pass` - Base64-encoded password hash (created with `newsroom --hash-password <pw>`
///   or `openssl passwd -5 <pw> | base64 -w0`)
/// * `admin` - Whether the user may call admin-gated endpoints
///
/// # Example
///
/// ```
/// use newsroom::config::SeedUser;
///
/// let user = SeedUser {
///     user: "editor".to_string(),
///     pass: "JDUkM2E2OUZwQW0xejZBbWV2QSRvMlhhN0lxcVdVU1VPTUh6UVJiM3JjRlRhZy9WYjdpSWJtZUJFaXA3Y1ZECg==".to_string(),
///     admin: false,
///     email: None,
///     name: Some("Editor".to_string()),
/// };
/// assert!(user.password_hash().is_some());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUser {
    /// The handle used for authentication
    pub user: String,

    /// Base64-encoded password hash
    pub pass: String,

    /// Administrator flag
    #[serde(default)]
    pub admin: bool,

    pub email: Option<String>,
    pub name: Option<String>,
}

impl SeedUser {
    /// Decode the stored hash into its `$algo$salt$hash` form
    ///
    /// `openssl passwd` output piped to `base64` carries a trailing newline,
    /// which is removed here.
    pub fn password_hash(&self) -> Option<String> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&self.pass)
            .ok()?;
        let text = String::from_utf8(bytes).ok()?;
        Some(text.trim_end_matches(['\n', '\r']).to_string())
    }
}

/// Configuration for user access
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    /// List of users with their credentials and role
    #[serde(default)]
    pub users: Vec<SeedUser>,
}

impl Default for SeedUser {
    fn default() -> Self {
        Self {
            user: "admin".to_string(),
            // Default password hash for "admin123" (should be changed in production)
            pass: "JDUkM2E2OUZwQW0xejZBbWV2QSRvMlhhN0lxcVdVU1VPTUh6UVJiM3JjRlRhZy9WYjdpSWJtZUJFaXA3Y1ZECg==".to_string(),
            admin: true,
            email: Some("email@example.org".to_string()),
            name: Some("Admin User".to_string()),
        }
    }
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            users: vec![SeedUser::default()],
        }
    }
}
