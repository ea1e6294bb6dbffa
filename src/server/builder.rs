// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the newsroom project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Rocket server builder and configuration
//!
//! This module opens the stores, wires the token service and builds the
//! Rocket instance with all routes, catchers, fairings and managed state.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, info};
use rocket::config::LogLevel;
use rocket::data::{Limits, ToByteUnit};
use rocket::figment::Figment;
use rocket::{routes, Build, Rocket};

use super::catchers;
use super::cors::CORS;
use super::handlers::{options, spa, StaticSite};
use crate::api;
use crate::auth::{Clock, LedgerStore, TokenLedger, TokenService};
use crate::config::Config;
use crate::store::{CredentialStore, FileStore, NewsStore, UserStore};

/// Everything the routes need, shared between requests
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub users: Arc<dyn CredentialStore>,
    pub news: Arc<NewsStore>,
    pub files: Arc<FileStore>,
    pub site: StaticSite,
    pub enable_cors: bool,
}

impl AppState {
    /// Open every store described by `config` and seed the configured users
    ///
    /// # Errors
    ///
    /// Fails when a snapshot cannot be read or parsed, or when the token
    /// settings are invalid.
    pub fn from_config(config: &Config, clock: Arc<dyn Clock>) -> Result<Self> {
        let storage = &config.storage;

        let users = UserStore::open(storage.snapshot_path("users.json"))
            .context("Failed to open the user store")?;
        let created = users
            .seed(&config.access)
            .context("Failed to seed configured users")?;
        debug!("{} configured user(s) created", created);

        let ledger: Arc<dyn LedgerStore> = Arc::new(
            TokenLedger::open(storage.snapshot_path("tokens.json"))
                .context("Failed to open the token ledger")?,
        );
        let tokens = TokenService::from_config(&config.auth, ledger, clock)?;

        let news = NewsStore::open(storage.snapshot_path("news.json"))
            .context("Failed to open the news store")?;
        let files = FileStore::open(
            &storage.upload_dir,
            storage.max_upload_size,
            storage.snapshot_path("files.json"),
        )
        .context("Failed to open the file store")?;

        Ok(AppState {
            tokens: Arc::new(tokens),
            users: Arc::new(users),
            news: Arc::new(news),
            files: Arc::new(files),
            site: StaticSite::new(config.server.static_dir.as_ref().map(PathBuf::from)),
            enable_cors: config.server.enable_cors,
        })
    }
}

/// Rocket figment for the `server` section of the configuration
pub fn figment_from_config(config: &Config) -> Figment {
    rocket::Config::figment()
        .merge(("ident", config.server.name.clone()))
        .merge(("limits", Limits::new().limit("json", 2.mebibytes())))
        .merge(("address", config.server.address.clone()))
        .merge(("port", config.server.port))
        .merge(("log_level", LogLevel::Normal))
}

/// Build a configured Rocket server instance
///
/// ### Example
///
/// ```no_run
/// use std::sync::Arc;
/// use newsroom::auth::SystemClock;
/// use newsroom::config::Config;
/// use newsroom::server::{build_rocket, figment_from_config, AppState};
///
/// #[rocket::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = Config::default();
///     let state = AppState::from_config(&config, Arc::new(SystemClock))?;
///     let _rocket = build_rocket(figment_from_config(&config), state).launch().await?;
///     Ok(())
/// }
/// ```
pub fn build_rocket(figment: Figment, state: AppState) -> Rocket<Build> {
    let rocket_builder = rocket::custom(figment);
    let rocket_builder = if state.enable_cors {
        debug!("CORS headers enabled");
        rocket_builder.attach(CORS)
    } else {
        rocket_builder
    };

    info!(
        "Serving static files from {}",
        state
            .site
            .root
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "the embedded front end".to_string())
    );

    rocket_builder
        .mount("/api", api::routes())
        .mount("/", routes![options, spa])
        .register("/", catchers::all())
        .manage(state.tokens)
        .manage(state.users)
        .manage(state.news)
        .manage(state.files)
        .manage(state.site)
}

/// Build a Rocket instance configured for tests
///
/// Stores follow `config.storage`: memory-only unless `data_dir` is set, in
/// which case snapshots are written there. Uses the given clock, a random
/// port and no logging. The returned state handles point at the same stores
/// as the instance.
pub fn build_rocket_test_instance(
    config: &Config,
    clock: Arc<dyn Clock>,
) -> Result<(Rocket<Build>, TestHandles)> {
    let figment = rocket::Config::figment()
        .merge(("address", "127.0.0.1"))
        .merge(("port", 0))
        .merge(("log_level", LogLevel::Off));

    let state = AppState::from_config(config, clock)?;
    let handles = TestHandles {
        tokens: state.tokens.clone(),
        users: state.users.clone(),
        news: state.news.clone(),
        files: state.files.clone(),
    };
    Ok((build_rocket(figment, state), handles))
}

/// Store handles returned alongside a test instance
#[derive(Clone)]
pub struct TestHandles {
    pub tokens: Arc<TokenService>,
    pub users: Arc<dyn CredentialStore>,
    pub news: Arc<NewsStore>,
    pub files: Arc<FileStore>,
}
