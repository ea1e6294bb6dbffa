// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the newsroom project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Persistence for users, articles and uploaded files
//!
//! Each store keeps its records behind a `std::sync::RwLock` and writes a
//! JSON snapshot after every mutation when a data directory is configured.
//! Every mutation touches a single record; no operation spans two stores.

mod error;
pub mod files;
pub mod news;
pub mod snapshot;
pub mod users;

pub use error::StoreError;
pub use files::{FileRecord, FileStore};
pub use news::{Article, ArticleDraft, ArticlePatch, NewsStore};
pub use users::{CredentialStore, User, UserStore};
