// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the newsroom project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Newsroom library
//!
//! A small content backend: user accounts, a news feed and uploaded files
//! behind a JSON API. Writes are protected by bearer tokens recorded in a
//! server-side ledger and by an administrator/standard role gate.

pub mod api;
pub mod auth;
pub mod config;
pub mod server;
pub mod store;
