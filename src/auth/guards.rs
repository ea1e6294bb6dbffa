// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the newsroom project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Rocket request guards for bearer token authentication
//!
//! A request starts unauthenticated. [`Authenticated`] validates the
//! `Authorization` header through the managed [`TokenService`];
//! [`AdminOnly`] additionally asks the authorization gate for
//! [`Role::Admin`].
//!
//! | Condition | HTTP Status |
//! |-----------|-------------|
//! | Missing header, unknown, expired or invalid token | 401 Unauthorized |
//! | Valid token without the admin flag on an admin route | 403 Forbidden |
//! | Token service not managed, ledger failure | 500 Internal Server Error |
//!
//! The rejection reason is stored in the request-local cache so the error
//! catchers can report it in the JSON body.

use rocket::request::{FromRequest, Outcome, Request};
use rocket::State;
use std::sync::Arc;

use super::claims::Identity;
use super::error::AuthError;
use super::gate::{self, Role};
use super::token_service::{strip_bearer, TokenService};

/// Caller holding a valid bearer token
///
/// ```rust,no_run
/// use rocket::get;
/// use newsroom::auth::Authenticated;
///
/// #[get("/whoami")]
/// fn whoami(auth: Authenticated) -> String {
///     auth.identity.user_id
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub identity: Identity,
    /// The token string without its `Bearer ` prefix
    pub token: String,
}

/// Caller holding a valid bearer token issued to an administrator
#[derive(Debug, Clone)]
pub struct AdminOnly(pub Identity);

/// Reason the auth guards rejected the current request, if any
pub fn rejection(request: &Request<'_>) -> Option<AuthError> {
    request.local_cache(|| None::<AuthError>).clone()
}

fn reject<T>(request: &Request<'_>, error: AuthError) -> Outcome<T, AuthError> {
    let status = error.status();
    let cached = error.clone();
    request.local_cache(move || Some(cached));
    Outcome::Error((status, error))
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Authenticated {
    type Error = AuthError;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let service = match request.guard::<&State<Arc<TokenService>>>().await {
            Outcome::Success(service) => service,
            _ => {
                return reject(
                    request,
                    AuthError::Store {
                        reason: "token service is not configured".to_string(),
                    },
                )
            }
        };

        let header = request.headers().get_one("Authorization");
        match service.validate(header) {
            Ok(identity) => Outcome::Success(Authenticated {
                identity,
                token: strip_bearer(header.unwrap_or_default().trim()).to_string(),
            }),
            Err(error) => {
                log::debug!("Rejected {} {}: {}", request.method(), request.uri(), error);
                reject(request, error)
            }
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminOnly {
    type Error = AuthError;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let auth = match Authenticated::from_request(request).await {
            Outcome::Success(auth) => auth,
            Outcome::Error(e) => return Outcome::Error(e),
            Outcome::Forward(status) => return Outcome::Forward(status),
        };

        match gate::require(Some(&auth.identity), Role::Admin) {
            Ok(()) => Outcome::Success(AdminOnly(auth.identity)),
            Err(error) => {
                log::debug!(
                    "User {} denied {} {}",
                    auth.identity.user_id,
                    request.method(),
                    request.uri()
                );
                reject(request, error)
            }
        }
    }
}
