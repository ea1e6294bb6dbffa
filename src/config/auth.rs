// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the newsroom project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Bearer token configuration

use chrono::{Duration, FixedOffset};
use serde::{Deserialize, Serialize};

/// Longest accepted token lifetime, one year
pub const MAX_TOKEN_LIFETIME_SECS: i64 = 365 * 24 * 3600;

/// Settings of the token service.
///
/// The same `hmac_secret` signs tokens at login and verifies them on every
/// request, so it must be identical for every instance of a deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for HMAC-based (HS256) token signing and verification.
    #[serde(default = "default_hmac_secret")]
    pub hmac_secret: String,

    /// Lifetime of an issued token, in seconds. Default is one hour.
    #[serde(default = "default_token_lifetime")]
    pub token_lifetime_secs: i64,

    /// Offset from UTC, in minutes, of the reference time zone.
    ///
    /// Ledger expiries stored without zone information are interpreted in
    /// this zone, and the current time is compared in the same zone.
    #[serde(default)]
    pub reference_utc_offset_minutes: i32,

    /// Value of the `iss` claim of issued tokens.
    #[serde(default = "default_issuer")]
    pub issuer: String,
}

fn default_hmac_secret() -> String {
    "my-super-secret-jwt-key-for-newsroom".to_string()
}

fn default_token_lifetime() -> i64 {
    3600
}

fn default_issuer() -> String {
    "newsroom".to_string()
}

impl AuthConfig {
    /// Token lifetime as a chrono duration
    pub fn token_lifetime(&self) -> Duration {
        // Out-of-range values are rejected by validation; clamp so this never panics
        Duration::seconds(self.token_lifetime_secs.clamp(1, MAX_TOKEN_LIFETIME_SECS))
    }

    /// The reference zone, or `None` when the offset is out of range
    pub fn reference_zone(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.reference_utc_offset_minutes.checked_mul(60)?)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            hmac_secret: default_hmac_secret(),
            token_lifetime_secs: default_token_lifetime(),
            reference_utc_offset_minutes: 0,
            issuer: default_issuer(),
        }
    }
}
