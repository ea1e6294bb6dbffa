// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the newsroom project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Token ledger
//!
//! Server-side record of every issued bearer token. A token is only ever
//! accepted while its ledger entry exists and has not expired, so deleting an
//! entry is how a token is revoked.
//!
//! # Eviction
//!
//! Expired entries are removed lazily: the token service deletes an entry
//! when its token is presented after the expiry instant. There is no
//! background sweeper, so tokens that are never presented again stay in the
//! ledger until their user is deleted.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::store::{snapshot, StoreError};

/// Expiry instant as written in the ledger
///
/// Entries written by this service always carry an offset. Ledgers
/// imported from older deployments may hold naive timestamps, which are
/// read as wall-clock time in the reference zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredExpiry {
    Zoned(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

impl StoredExpiry {
    /// Attach `zone` to a naive expiry; zoned expiries are converted to it
    ///
    /// A fixed offset has no gaps or folds, so the local mapping is always
    /// unique. The UTC fallback only exists to keep this function total.
    pub fn normalize(&self, zone: &FixedOffset) -> DateTime<FixedOffset> {
        match self {
            StoredExpiry::Zoned(expiry) => expiry.with_timezone(zone),
            StoredExpiry::Naive(naive) => zone
                .from_local_datetime(naive)
                .single()
                .unwrap_or_else(|| zone.from_utc_datetime(naive)),
        }
    }
}

impl From<DateTime<FixedOffset>> for StoredExpiry {
    fn from(expiry: DateTime<FixedOffset>) -> Self {
        StoredExpiry::Zoned(expiry)
    }
}

/// One issued token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub user_id: String,
    pub token: String,
    pub expiry: StoredExpiry,
}

/// Storage backend of the token ledger
#[cfg_attr(test, mockall::automock)]
pub trait LedgerStore: Send + Sync {
    fn insert(&self, entry: LedgerEntry) -> Result<(), StoreError>;

    /// Exact match on the full token string
    fn find_by_token(&self, token: &str) -> Result<Option<LedgerEntry>, StoreError>;

    /// Remove an entry; removing an absent entry is not an error
    fn delete(&self, entry: &LedgerEntry) -> Result<(), StoreError>;

    /// Remove every entry of a user, returning how many were removed
    fn delete_for_user(&self, user_id: &str) -> Result<usize, StoreError>;
}

/// In-memory ledger keyed by token string, optionally persisted as JSON
#[derive(Debug, Default)]
pub struct TokenLedger {
    entries: RwLock<HashMap<String, LedgerEntry>>,
    snapshot: Option<PathBuf>,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a ledger backed by a snapshot file, loading the entries it holds
    pub fn open(path: Option<PathBuf>) -> Result<Self, StoreError> {
        let entries: HashMap<String, LedgerEntry> = snapshot::load(path.as_deref())?;
        debug!("Token ledger opened with {} entries", entries.len());
        Ok(TokenLedger {
            entries: RwLock::new(entries),
            snapshot: path,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply `change` and persist it; the in-memory ledger only moves on success
    fn commit<R>(
        &self,
        entries: &mut HashMap<String, LedgerEntry>,
        change: impl FnOnce(&mut HashMap<String, LedgerEntry>) -> R,
    ) -> Result<R, StoreError> {
        snapshot::commit(self.snapshot.as_deref(), entries, |next| Ok(change(next)))
    }
}

impl LedgerStore for TokenLedger {
    fn insert(&self, entry: LedgerEntry) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StoreError::Poisoned("token ledger"))?;
        self.commit(&mut entries, |entries| {
            entries.insert(entry.token.clone(), entry);
        })
    }

    fn find_by_token(&self, token: &str) -> Result<Option<LedgerEntry>, StoreError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| StoreError::Poisoned("token ledger"))?;
        Ok(entries.get(token).cloned())
    }

    fn delete(&self, entry: &LedgerEntry) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StoreError::Poisoned("token ledger"))?;
        if entries.contains_key(&entry.token) {
            self.commit(&mut entries, |entries| {
                entries.remove(&entry.token);
            })?;
        }
        Ok(())
    }

    fn delete_for_user(&self, user_id: &str) -> Result<usize, StoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StoreError::Poisoned("token ledger"))?;
        let removed = entries
            .values()
            .filter(|entry| entry.user_id == user_id)
            .count();
        if removed > 0 {
            self.commit(&mut entries, |entries| {
                entries.retain(|_, entry| entry.user_id != user_id);
            })?;
        }
        Ok(removed)
    }
}
