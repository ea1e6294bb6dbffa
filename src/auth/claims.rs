// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the newsroom project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Token payload and the identity decoded from it

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Claims signed into every bearer token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TokenClaims {
    /// Subject: id of the user the token was issued to
    pub sub: String,

    /// Administrator flag of the user at issuance time
    pub admin: bool,

    /// Issued at, seconds since the Unix epoch
    pub iat: i64,

    /// Expiration, seconds since the Unix epoch
    pub exp: i64,

    /// Issuer
    pub iss: String,

    /// Unique token identifier
    ///
    /// Two tokens issued to the same user within the same second would
    /// otherwise be byte-identical and share one ledger entry.
    pub jti: String,
}

/// Authenticated caller, as decoded from a validated token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub user_id: String,
    pub is_admin: bool,
    pub expiry: DateTime<Utc>,
}

impl TryFrom<TokenClaims> for Identity {
    type Error = ();

    fn try_from(claims: TokenClaims) -> Result<Self, Self::Error> {
        let expiry = Utc.timestamp_opt(claims.exp, 0).single().ok_or(())?;
        Ok(Identity {
            user_id: claims.sub,
            is_admin: claims.admin,
            expiry,
        })
    }
}
