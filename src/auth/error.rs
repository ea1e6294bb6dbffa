// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the newsroom project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use rocket::http::Status;
use thiserror::Error;

use crate::store::StoreError;

/// Reasons a request is rejected by the authentication layer
///
/// Every variant is recoverable at the request boundary: the request is
/// refused, the process keeps running. None of them is worth a retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The caller supplied no credential at all
    #[error("No bearer credential was supplied")]
    MissingCredential,

    /// No ledger entry matches the presented token string
    #[error("Token is unknown or has been revoked")]
    TokenNotFound,

    /// The ledger entry expired; it has been removed
    #[error("Token has expired")]
    TokenExpired,

    /// Signature verification or payload decoding failed
    #[error("Token signature or payload is invalid")]
    InvalidToken,

    /// The identity lacks the role required by the operation
    #[error("Operation requires administrator rights")]
    PermissionDenied,

    /// Login with an unknown handle or a wrong password
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Token issuance failed: {reason}")]
    Issuance { reason: String },

    #[error("Token ledger unavailable: {reason}")]
    Store { reason: String },
}

impl AuthError {
    /// Stable machine-readable code used in JSON error bodies
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => "missing_credential",
            AuthError::TokenNotFound => "token_not_found",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidToken => "invalid_token",
            AuthError::PermissionDenied => "permission_denied",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::Issuance { .. } => "token_issuance_failed",
            AuthError::Store { .. } => "ledger_unavailable",
        }
    }

    /// HTTP status of a request rejected with this error
    pub fn status(&self) -> Status {
        match self {
            AuthError::PermissionDenied => Status::Forbidden,
            AuthError::Issuance { .. } | AuthError::Store { .. } => Status::InternalServerError,
            _ => Status::Unauthorized,
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        AuthError::Store {
            reason: err.to_string(),
        }
    }
}
