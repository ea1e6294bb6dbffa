// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the newsroom project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

// Main entry point for the newsroom server

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use base64::Engine;
use clap::Parser;
use log::info;
use rocket::config::LogLevel;

use newsroom::auth::{password, SystemClock};
use newsroom::config::{self, Config};
use newsroom::server::{build_rocket, figment_from_config, AppState};

/// News, users and file uploads behind a bearer-token protected JSON API
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Web server port (default: 8080)
    #[arg(short = 'p')]
    web_port: Option<u16>,

    /// Web server address (default: 127.0.0.1)
    #[arg(short = 'a')]
    web_address: Option<String>,

    /// HMAC secret for token signing
    #[arg(long)]
    hmac_secret: Option<String>,

    /// Path to configuration file (YAML format)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to a configuration to validate and exit
    #[arg(long)]
    validate_config: Option<PathBuf>,

    /// Output the configuration schema as JSON and exit
    #[arg(long)]
    show_config_schema: bool,

    /// Print the base64-encoded hash of a password for `access.users` and exit
    #[arg(long, value_name = "PASSWORD")]
    hash_password: Option<String>,

    /// Enable verbose logging (debug level)
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Disable all logging output
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

#[rocket::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.quiet {
        log::LevelFilter::Off
    } else if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if args.show_config_schema {
        return config::output_config_schema();
    }

    if let Some(plain) = &args.hash_password {
        let hash = password::hash_password(plain)?;
        println!(
            "{}",
            base64::engine::general_purpose::STANDARD.encode(hash.as_bytes())
        );
        return Ok(());
    }

    if let Some(validate_path) = args.validate_config {
        if !validate_path.exists() {
            return Err(anyhow::anyhow!(
                "Configuration file does not exist: {}",
                validate_path.display()
            ));
        }
        Config::from_file(&validate_path)
            .map_err(|err| anyhow::anyhow!("Configuration validation failed: {}", err))?;
        println!("Configuration file is valid: {}", validate_path.display());
        return Ok(());
    }

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from("config.yaml"));
    let mut config = Config::from_file(&config_path)?;
    config.apply_args(args.web_port, args.web_address.clone(), args.hmac_secret.clone());
    config::validate_specific_rules(&config)?;

    let state = AppState::from_config(&config, Arc::new(SystemClock))?;

    let mut figment = figment_from_config(&config);
    if args.quiet {
        figment = figment.merge(("log_level", LogLevel::Off));
    }

    info!(
        "Starting {} on {}:{}",
        config.server.name, config.server.address, config.server.port
    );
    let _rocket = build_rocket(figment, state)
        .launch()
        .await
        .context("Web server terminated with an error")?;

    info!("Server stopped");
    Ok(())
}
