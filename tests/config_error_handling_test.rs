// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the newsroom project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use anyhow::Result;
use newsroom::config::Config;
use std::fs;
use std::path::Path;
use std::sync::Once;
use tempfile::tempdir;

static INIT: Once = Once::new();

// Setup logger for tests
fn setup() {
    INIT.call_once(|| {
        env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .is_test(true)
            .init();
    });
}

#[test]
fn test_config_deserialization_error_creates_sample_file() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");

    // Valid YAML, wrong types
    let invalid_yaml = r#"
server:
  port: "not-an-integer"
  address: 12345
auth:
  hmac_secret: []
"#;
    fs::write(&config_path, invalid_yaml)?;

    let result = Config::from_file(&config_path);
    assert!(result.is_err(), "Config loading should have failed");

    let sample_path = config_path.with_extension("sample.yaml");
    assert!(
        Path::new(&sample_path).exists(),
        "Sample config file was not created"
    );

    // The sample itself is a valid configuration
    let sample_config = Config::from_file(&sample_path)?;
    assert_eq!(sample_config.server.port, 8080);

    Ok(())
}

#[test]
fn test_invalid_seed_password_creates_sample_file() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");

    // "plaintext" is valid base64 but does not decode to a crypt hash
    let yaml = "access:\n  users:\n    - user: editor\n      pass: cGxhaW50ZXh0\n";
    fs::write(&config_path, yaml)?;

    assert!(Config::from_file(&config_path).is_err());
    assert!(config_path.with_extension("sample.yaml").exists());

    Ok(())
}

#[test]
fn test_syntax_error_is_reported() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, "server: [unclosed\n")?;

    let err = Config::from_file(&config_path).expect_err("invalid YAML must fail");
    assert!(!format!("{:#}", err).is_empty());

    Ok(())
}
