// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the newsroom project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Authorization gate
//!
//! Two roles exist. Administrators may call every operation, standard users
//! only those that merely require a login. There is no ownership rule: a
//! standard user cannot edit their own record through an admin operation.

use super::claims::Identity;
use super::error::AuthError;

/// Role required by an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Standard,
}

/// Decide whether `identity` may perform an operation requiring `required`
pub fn authorize(identity: Option<&Identity>, required: Role) -> bool {
    match (identity, required) {
        (None, _) => false,
        (Some(identity), Role::Admin) => identity.is_admin,
        (Some(_), Role::Standard) => true,
    }
}

/// Same as [`authorize`], with a refusal mapped to [`AuthError::PermissionDenied`]
pub fn require(identity: Option<&Identity>, required: Role) -> Result<(), AuthError> {
    if authorize(identity, required) {
        Ok(())
    } else {
        Err(AuthError::PermissionDenied)
    }
}
