#![cfg(test)]

use std::fs;

use serde_json::json;
use tempfile::tempdir;

use super::common::setup_test_environment;
use crate::config::ConfigFormat;
use crate::kernel::constants;
use crate::kernel::error::{EXIT_CONFIG, Result};
use crate::logging::LogLevel;

#[test]
fn test_settings_survive_restart() -> Result<()> {
    let tmp_dir = tempdir().expect("Failed to create temp directory");
    let env = setup_test_environment(tmp_dir.path());

    let mut config = env.config("config.json")?;
    config.set_nested("plugins.auto_load", false)?;
    config.set_nested("logging.level", "WARNING")?;

    let app = env.application(env.config("config.json")?)?;
    assert!(!app.auto_load());
    assert_eq!(app.log_settings().level, LogLevel::Warning);
    Ok(())
}

#[cfg(feature = "yaml-config")]
#[test]
fn test_yaml_config_drives_application() -> Result<()> {
    let tmp_dir = tempdir().expect("Failed to create temp directory");
    let env = setup_test_environment(tmp_dir.path());
    fs::write(
        tmp_dir.path().join("config.yaml"),
        "plugins:\n  auto_load: false\nframework:\n  debug: true\n",
    )
    .unwrap();

    let config = env.config("config.yaml")?;
    assert_eq!(config.format(), ConfigFormat::Yaml);
    // Keys missing from the file come from the defaults.
    assert_eq!(
        config.get_nested("logging.log_file"),
        Some(&json!(constants::LOG_FILE_NAME))
    );

    let mut app = env.application(config)?;
    assert!(app.is_debug());
    assert_eq!(app.log_settings().level, LogLevel::Debug);
    assert!(app.start()?.is_none());
    Ok(())
}

#[test]
fn test_malformed_config_maps_to_config_exit_code() {
    let tmp_dir = tempdir().expect("Failed to create temp directory");
    let env = setup_test_environment(tmp_dir.path());
    fs::write(tmp_dir.path().join("config.json"), "{ not json").unwrap();

    let err = env.config("config.json").unwrap_err();
    assert_eq!(err.exit_code(), EXIT_CONFIG);
}
