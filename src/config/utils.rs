// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the newsroom project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration utilities
//!
//! This module provides utility functions for working with configuration
//! settings, including validation and schema management.

use std::collections::HashSet;

use anyhow::{Context, Result};
use log::{debug, warn};

use super::{Config, MAX_TOKEN_LIFETIME_SECS};

/// Output the embedded JSON schema to the console.
///
/// This function is called when the `--show-config-schema` flag is provided
/// on the command line.
///
/// # Example
///
/// ```bash
/// ./newsroom --show-config-schema > config_schema.json
/// ```
pub fn output_config_schema() -> Result<()> {
    let schema_str = include_str!("../../resources/config.schema.json");

    let schema: serde_json::Value =
        serde_json::from_str(schema_str).context("Failed to parse JSON schema")?;

    let formatted_schema =
        serde_json::to_string_pretty(&schema).context("Failed to format JSON schema")?;

    println!("{}", formatted_schema);

    Ok(())
}

/// Check if a string is a valid IP address
///
/// Validates that a string represents a valid IPv4 or IPv6 address,
/// or is one of the special values like "localhost" or "0.0.0.0".
pub fn is_valid_ip_address(addr: &str) -> bool {
    if addr.parse::<std::net::IpAddr>().is_ok() {
        return true;
    }

    // Special cases
    matches!(addr, "localhost" | "::" | "::0" | "0.0.0.0")
}

/// Validates the configuration against additional rules that aren't covered by the JSON schema.
///
/// # Validation Rules
///
/// - **Signing secret**: must not be empty
/// - **Token lifetime**: between one second and one year
/// - **Reference zone**: the UTC offset must describe a valid fixed offset
/// - **Port Range**: the server port must be within 1-65534
/// - **Seed users**: handles are unique and passwords are base64-encoded
///   unix crypt hashes (`$1$`, `$5$`, `$6$`, `$apr1$`)
pub fn validate_specific_rules(config: &Config) -> Result<()> {
    debug!("Performing additional validation checks");

    if config.auth.hmac_secret.is_empty() {
        anyhow::bail!("The HMAC secret must not be empty");
    }

    if !(1..=MAX_TOKEN_LIFETIME_SECS).contains(&config.auth.token_lifetime_secs) {
        anyhow::bail!(
            "Invalid token lifetime: {} seconds",
            config.auth.token_lifetime_secs
        );
    }

    if config.auth.reference_zone().is_none() {
        anyhow::bail!(
            "Invalid reference UTC offset: {} minutes",
            config.auth.reference_utc_offset_minutes
        );
    }

    if config.server.port < 1 || config.server.port > 65534 {
        anyhow::bail!("Invalid port number: {}", config.server.port);
    }

    if !is_valid_ip_address(&config.server.address) {
        // Hostnames are accepted, Rocket resolves them at launch
        warn!(
            "Potentially invalid address format: {}",
            config.server.address
        );
    }

    let mut handles = HashSet::new();
    for user in &config.access.users {
        if !handles.insert(user.user.as_str()) {
            anyhow::bail!("Duplicate user handle in access configuration: {}", user.user);
        }
        let hash = user
            .password_hash()
            .with_context(|| format!("Password of user {} is not valid base64", user.user))?;
        if !hash.starts_with("$1$")
            && !hash.starts_with("$5$")
            && !hash.starts_with("$6$")
            && !hash.starts_with("$apr1$")
        {
            anyhow::bail!(
                "Password of user {} is not a valid hash, you should use newsroom --hash-password <password>",
                user.user
            );
        }
    }

    Ok(())
}
