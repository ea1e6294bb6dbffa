// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the newsroom project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Login, logout, self-registration and current user

use std::sync::Arc;

use log::info;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{get, post, State};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::users::UserView;
use crate::auth::{AuthError, Authenticated, TokenService};
use crate::store::{CredentialStore, StoreError, User};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful login
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    /// Always `Bearer`
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    pub user: UserView,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Exchange a handle and password for a bearer token
///
/// Unknown handles and wrong passwords are reported identically.
#[post("/login", format = "json", data = "<request>")]
pub fn login(
    request: Json<LoginRequest>,
    users: &State<Arc<dyn CredentialStore>>,
    tokens: &State<Arc<TokenService>>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = users
        .find_by_handle(&request.username)?
        .filter(|user| user.verify_password(&request.password))
        .ok_or(AuthError::InvalidCredentials)?;

    let access_token = tokens.issue(&user)?;
    info!("User {} logged in", user.handle);

    Ok(Json(LoginResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: tokens.token_lifetime().num_seconds(),
        user: UserView::from(&user),
    }))
}

/// Revoke the token used for this request
#[post("/logout")]
pub fn logout(auth: Authenticated, tokens: &State<Arc<TokenService>>) -> Result<Status, ApiError> {
    tokens.revoke(Some(auth.token.as_str()))?;
    Ok(Status::NoContent)
}

/// Create a standard account
#[post("/register", format = "json", data = "<request>")]
pub fn register(
    request: Json<RegisterRequest>,
    users: &State<Arc<dyn CredentialStore>>,
) -> Result<(Status, Json<UserView>), ApiError> {
    let request = request.into_inner();
    let handle = request.username.trim();
    if handle.is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("Username and password are required"));
    }
    if users.find_by_handle(handle)?.is_some() {
        return Err(StoreError::DuplicateHandle {
            handle: handle.to_string(),
        }
        .into());
    }

    let mut user = User::new(handle, &request.password, false)?;
    user.email = request.email;
    user.name = request.name;
    users.save(user.clone())?;
    info!("Registered user {}", user.handle);

    Ok((Status::Created, Json(UserView::from(&user))))
}

/// Profile of the caller
#[get("/me")]
pub fn me(
    auth: Authenticated,
    users: &State<Arc<dyn CredentialStore>>,
) -> Result<Json<UserView>, ApiError> {
    let user = users
        .find_by_id(&auth.identity.user_id)?
        .ok_or_else(|| StoreError::not_found("user", &auth.identity.user_id))?;
    Ok(Json(UserView::from(&user)))
}
