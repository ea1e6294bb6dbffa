// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the newsroom project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! JSON error catchers
//!
//! Guards and data parsers fail before a handler runs, so their errors never
//! reach [`ApiError`]. These catchers give them the same JSON body.

use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{catch, catchers, Catcher, Request};

use crate::api::{ApiError, ErrorBody};
use crate::auth::guards::rejection;
use crate::auth::AuthError;

fn auth_body(request: &Request<'_>, fallback: AuthError) -> Json<ErrorBody> {
    let error = rejection(request).unwrap_or(fallback);
    Json(ApiError::from(error).body())
}

#[catch(401)]
fn unauthorized(request: &Request<'_>) -> Json<ErrorBody> {
    auth_body(request, AuthError::MissingCredential)
}

#[catch(403)]
fn forbidden(request: &Request<'_>) -> Json<ErrorBody> {
    auth_body(request, AuthError::PermissionDenied)
}

#[catch(404)]
fn not_found(request: &Request<'_>) -> Json<ErrorBody> {
    Json(ErrorBody {
        error: "not_found".to_string(),
        message: format!("No resource at {}", request.uri().path()),
    })
}

#[catch(default)]
fn default_catcher(status: Status, request: &Request<'_>) -> Json<ErrorBody> {
    if let Some(error) = rejection(request) {
        return Json(ApiError::from(error).body());
    }
    let code = match status.code {
        400 | 422 => "invalid_request",
        413 => "payload_too_large",
        500..=599 => "internal_error",
        _ => "error",
    };
    Json(ErrorBody {
        error: code.to_string(),
        message: status.reason_lossy().to_string(),
    })
}

pub fn all() -> Vec<Catcher> {
    catchers![unauthorized, forbidden, not_found, default_catcher]
}
