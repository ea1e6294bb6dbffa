// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the newsroom project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Salted one-way password hashing
//!
//! New hashes use SHA-512 crypt (`$6$`). Verification accepts every unix
//! crypt flavour understood by `pwhash::unix::verify`, so hashes produced
//! with `openssl passwd -1/-5/-6` keep working.

use thiserror::Error;

#[derive(Error, Debug)]
#[error("Password hashing failed: {0}")]
pub struct PasswordError(String);

/// Hash a plaintext password with a fresh random salt
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    pwhash::sha512_crypt::hash(password).map_err(|e| PasswordError(e.to_string()))
}

/// Check a plaintext password against a stored `$algo$salt$hash` string
pub fn verify_password(password: &str, hash: &str) -> bool {
    pwhash::unix::verify(password, hash)
}
