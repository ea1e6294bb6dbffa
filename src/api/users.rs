// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the newsroom project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! User administration
//!
//! Every route here requires an administrator token.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::info;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{delete, get, post, put, State};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use crate::auth::{AdminOnly, TokenService};
use crate::store::{CredentialStore, StoreError, User};

/// A user as exposed by the API, without the password hash
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserView {
    pub id: String,
    pub username: String,
    pub is_admin: bool,
    pub email: Option<String>,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        UserView {
            id: user.id.clone(),
            username: user.handle.clone(),
            is_admin: user.is_admin,
            email: user.email.clone(),
            name: user.name.clone(),
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Partial update; the handle cannot be changed
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub password: Option<String>,
    pub is_admin: Option<bool>,
    pub email: Option<String>,
    pub name: Option<String>,
}

fn find(users: &Arc<dyn CredentialStore>, id: &str) -> Result<User, ApiError> {
    users
        .find_by_id(id)?
        .ok_or_else(|| StoreError::not_found("user", id).into())
}

#[get("/users")]
pub fn list_users(
    _admin: AdminOnly,
    users: &State<Arc<dyn CredentialStore>>,
) -> Result<Json<Vec<UserView>>, ApiError> {
    Ok(Json(users.list()?.iter().map(UserView::from).collect()))
}

#[get("/users/<id>")]
pub fn get_user(
    _admin: AdminOnly,
    id: &str,
    users: &State<Arc<dyn CredentialStore>>,
) -> Result<Json<UserView>, ApiError> {
    Ok(Json(UserView::from(&find(users, id)?)))
}

#[post("/users", format = "json", data = "<request>")]
pub fn create_user(
    admin: AdminOnly,
    request: Json<CreateUserRequest>,
    users: &State<Arc<dyn CredentialStore>>,
) -> Result<(Status, Json<UserView>), ApiError> {
    let request = request.into_inner();
    let handle = request.username.trim();
    if handle.is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("Username and password are required"));
    }

    let mut user = User::new(handle, &request.password, request.is_admin)?;
    user.email = request.email;
    user.name = request.name;
    users.save(user.clone())?;
    info!("User {} created by {}", user.handle, admin.0.user_id);

    Ok((Status::Created, Json(UserView::from(&user))))
}

/// Update a user
///
/// Tokens carry the role and are tied to the credential they were issued
/// for, so a role or password change revokes every token of the user.
#[put("/users/<id>", format = "json", data = "<request>")]
pub fn update_user(
    admin: AdminOnly,
    id: &str,
    request: Json<UpdateUserRequest>,
    users: &State<Arc<dyn CredentialStore>>,
    tokens: &State<Arc<TokenService>>,
) -> Result<Json<UserView>, ApiError> {
    let request = request.into_inner();
    let mut user = find(users, id)?;
    let was_admin = user.is_admin;
    let password_changed = request.password.is_some();

    if let Some(password) = request.password {
        if password.is_empty() {
            return Err(ApiError::bad_request("Password must not be empty"));
        }
        user.set_password(&password)?;
    }
    if let Some(is_admin) = request.is_admin {
        user.is_admin = is_admin;
    }
    if request.email.is_some() {
        user.email = request.email;
    }
    if request.name.is_some() {
        user.name = request.name;
    }

    users.save(user.clone())?;
    info!("User {} updated by {}", user.handle, admin.0.user_id);

    if password_changed || user.is_admin != was_admin {
        let revoked = tokens.revoke_user(&user.id)?;
        info!("Revoked {} token(s) of user {} after a credential change", revoked, user.handle);
    }
    Ok(Json(UserView::from(&user)))
}

/// Delete a user and revoke every token issued to them
#[delete("/users/<id>")]
pub fn delete_user(
    admin: AdminOnly,
    id: &str,
    users: &State<Arc<dyn CredentialStore>>,
    tokens: &State<Arc<TokenService>>,
) -> Result<Status, ApiError> {
    let user = find(users, id)?;
    users.delete(&user)?;
    let revoked = tokens.revoke_user(&user.id)?;
    info!(
        "User {} deleted by {} ({} token(s) revoked)",
        user.handle, admin.0.user_id, revoked
    );
    Ok(Status::NoContent)
}
