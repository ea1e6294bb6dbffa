// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the newsroom project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! JSON error responses
//!
//! Every failure of the API, including the ones produced by Rocket
//! catchers, is answered with the same body:
//!
//! ```json
//! { "error": "token_expired", "message": "Token has expired" }
//! ```

use rocket::http::Status;
use rocket::response::{self, Responder, Response};
use rocket::serde::json::Json;
use rocket::Request;
use serde::{Deserialize, Serialize};

use crate::auth::password::PasswordError;
use crate::auth::AuthError;
use crate::store::StoreError;

/// Body of every error response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// Error returned by API handlers
#[derive(Debug)]
pub struct ApiError {
    pub status: Status,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: Status, code: &'static str, message: impl Into<String>) -> Self {
        ApiError {
            status,
            code,
            message: message.into(),
        }
    }

    /// 400 with the `invalid_request` code
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(Status::BadRequest, "invalid_request", message)
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.code.to_string(),
            message: self.message.clone(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        if err.status() == Status::InternalServerError {
            log::error!("Authentication backend failure: {}", err);
        }
        ApiError::new(err.status(), err.code(), err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateHandle { .. } => {
                ApiError::new(Status::Conflict, "duplicate_handle", err.to_string())
            }
            StoreError::NotFound { .. } => {
                ApiError::new(Status::NotFound, "not_found", err.to_string())
            }
            StoreError::TooLarge { .. } => {
                ApiError::new(Status::PayloadTooLarge, "payload_too_large", err.to_string())
            }
            _ => {
                log::error!("Storage failure: {}", err);
                ApiError::new(
                    Status::InternalServerError,
                    "internal_error",
                    "Internal storage failure",
                )
            }
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        log::error!("{}", err);
        ApiError::new(
            Status::InternalServerError,
            "internal_error",
            "Password could not be hashed",
        )
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status;
        Response::build_from(Json(self.body()).respond_to(request)?)
            .status(status)
            .ok()
    }
}
