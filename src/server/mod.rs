// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the newsroom project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! HTTP server
//!
//! - `/api/*`: the JSON API
//! - `/*`: the static front end with `index.html` fallback
//!
//! Every error, including guard rejections, is answered with a JSON body.

pub mod builder;
mod catchers;
pub mod cors;
pub mod handlers;
pub mod responders;

pub use builder::{
    build_rocket, build_rocket_test_instance, figment_from_config, AppState, TestHandles,
};
