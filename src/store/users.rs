// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the newsroom project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Credential store
//!
//! Durable record of user identities, password hashes and roles. Handles are
//! unique: [`CredentialStore::save`] refuses a user whose handle is already
//! held by a different id.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::{snapshot, StoreError};
use crate::auth::password;
use crate::config::AccessConfig;

/// A user account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    /// Login handle, immutable once created
    pub handle: String,
    /// Unix crypt hash (`$6$salt$hash`)
    pub password_hash: String,
    pub is_admin: bool,
    pub email: Option<String>,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Build a new user, hashing `password`
    pub fn new(
        handle: impl Into<String>,
        password: &str,
        is_admin: bool,
    ) -> Result<Self, password::PasswordError> {
        Ok(Self::with_hash(handle, password::hash_password(password)?, is_admin))
    }

    /// Build a new user from an already computed hash
    pub fn with_hash(handle: impl Into<String>, password_hash: String, is_admin: bool) -> Self {
        User {
            id: uuid::Uuid::new_v4().to_string(),
            handle: handle.into(),
            password_hash,
            is_admin,
            email: None,
            name: None,
            created_at: Utc::now(),
        }
    }

    /// Replace the stored credential
    pub fn set_password(&mut self, password: &str) -> Result<(), password::PasswordError> {
        self.password_hash = password::hash_password(password)?;
        Ok(())
    }

    /// Check a plaintext password against the stored hash
    pub fn verify_password(&self, password: &str) -> bool {
        password::verify_password(password, &self.password_hash)
    }
}

/// Access to user records
pub trait CredentialStore: Send + Sync {
    fn find_by_handle(&self, handle: &str) -> Result<Option<User>, StoreError>;

    fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError>;

    /// Insert or update a user, keyed by id
    fn save(&self, user: User) -> Result<(), StoreError>;

    /// Remove a user; returns `false` when it did not exist
    fn delete(&self, user: &User) -> Result<bool, StoreError>;

    /// All users ordered by handle
    fn list(&self) -> Result<Vec<User>, StoreError>;
}

/// In-memory credential store with optional JSON snapshot
pub struct UserStore {
    users: RwLock<BTreeMap<String, User>>,
    snapshot: Option<PathBuf>,
}

impl UserStore {
    /// A memory-only store
    pub fn new() -> Self {
        UserStore {
            users: RwLock::new(BTreeMap::new()),
            snapshot: None,
        }
    }

    /// Open a store backed by the snapshot at `path`, if any
    pub fn open(path: Option<PathBuf>) -> Result<Self, StoreError> {
        let users = snapshot::load(path.as_deref())?;
        Ok(UserStore {
            users: RwLock::new(users),
            snapshot: path,
        })
    }

    /// Create the configured users whose handle is still unknown
    ///
    /// Returns the number of users created.
    pub fn seed(&self, access: &AccessConfig) -> Result<usize, StoreError> {
        let mut created = 0;
        for seed in &access.users {
            if self.find_by_handle(&seed.user)?.is_some() {
                debug!("Seed user {} already exists", seed.user);
                continue;
            }
            let Some(hash) = seed.password_hash() else {
                warn!("Skipping seed user {}: password is not valid base64", seed.user);
                continue;
            };
            let mut user = User::with_hash(seed.user.clone(), hash, seed.admin);
            user.email = seed.email.clone();
            user.name = seed.name.clone();
            self.save(user)?;
            info!("Created user {} from configuration", seed.user);
            created += 1;
        }
        Ok(created)
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for UserStore {
    fn find_by_handle(&self, handle: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().map_err(|_| StoreError::Poisoned("user"))?;
        Ok(users.values().find(|u| u.handle == handle).cloned())
    }

    fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().map_err(|_| StoreError::Poisoned("user"))?;
        Ok(users.get(id).cloned())
    }

    fn save(&self, user: User) -> Result<(), StoreError> {
        let mut users = self.users.write().map_err(|_| StoreError::Poisoned("user"))?;
        if users
            .values()
            .any(|u| u.handle == user.handle && u.id != user.id)
        {
            return Err(StoreError::DuplicateHandle {
                handle: user.handle,
            });
        }
        snapshot::commit(self.snapshot.as_deref(), &mut *users, |users| {
            users.insert(user.id.clone(), user);
            Ok(())
        })
    }

    fn delete(&self, user: &User) -> Result<bool, StoreError> {
        let mut users = self.users.write().map_err(|_| StoreError::Poisoned("user"))?;
        if !users.contains_key(&user.id) {
            return Ok(false);
        }
        snapshot::commit(self.snapshot.as_deref(), &mut *users, |users| {
            users.remove(&user.id);
            Ok(true)
        })
    }

    fn list(&self) -> Result<Vec<User>, StoreError> {
        let users = self.users.read().map_err(|_| StoreError::Poisoned("user"))?;
        let mut list: Vec<User> = users.values().cloned().collect();
        list.sort_by(|a, b| a.handle.cmp(&b.handle));
        Ok(list)
    }
}
