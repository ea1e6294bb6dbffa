// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the newsroom project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! JSON snapshots of in-memory stores
//!
//! Every store keeps its records in memory and, when given a path, rewrites
//! the whole snapshot after each mutation. The file is written next to its
//! final location and renamed over it, so a crash leaves either the old or
//! the new snapshot on disk.

use std::fs;
use std::path::Path;

use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::StoreError;

/// Load a snapshot, or the default value when there is no file yet
pub fn load<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T, StoreError> {
    let Some(path) = path else {
        return Ok(T::default());
    };
    if !path.exists() {
        debug!("No snapshot at {:?}, starting empty", path);
        return Ok(T::default());
    }
    let contents = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    Ok(serde_json::from_str(&contents)?)
}

/// Persist a snapshot; a `None` path keeps the store memory-only
pub fn save<T: Serialize>(path: Option<&Path>, value: &T) -> Result<(), StoreError> {
    let Some(path) = path else {
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
    }
    let tmp = path.with_extension("json.tmp");
    let contents = serde_json::to_vec_pretty(value)?;
    fs::write(&tmp, contents).map_err(|e| StoreError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| StoreError::io(path, e))?;
    Ok(())
}

/// Apply `change` to a copy of `current`, persist the copy, then swap it in
///
/// `current` is left untouched when either the change or the save fails.
pub fn commit<T, R>(
    path: Option<&Path>,
    current: &mut T,
    change: impl FnOnce(&mut T) -> Result<R, StoreError>,
) -> Result<R, StoreError>
where
    T: Serialize + Clone,
{
    let mut next = current.clone();
    let outcome = change(&mut next)?;
    save(path, &next)?;
    *current = next;
    Ok(outcome)
}
