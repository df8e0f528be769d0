//! Integration tests for `vulntriage config` behavior.
//!
//! Tests config validation and loading with real TOML files, the same
//! paths the `config show` / `config validate` subcommands exercise.

use std::fs;

use tempfile::TempDir;

use vulntriage_core::config::VulntriageConfig;

#[tokio::test]
async fn valid_config_file_loads() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("vulntriage.toml");

    let valid_config = r#"
[general]
log_level = "info"
log_format = "json"
data_dir = "."

[ingest]
max_row_errors = 50

[store]
persistent = false
"#;
    fs::write(&config_path, valid_config).expect("should write config");

    let config = VulntriageConfig::load(&config_path)
        .await
        .expect("valid config should load successfully");
    assert_eq!(config.general.log_format, "json");
    assert_eq!(config.ingest.max_row_errors, 50);
    assert!(!config.store.persistent);
}

#[tokio::test]
async fn malformed_toml_fails_to_load() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("bad.toml");

    fs::write(&config_path, "[general\nlog_level = \"info\"\n").expect("should write bad config");

    let result = VulntriageConfig::load(&config_path).await;
    assert!(result.is_err(), "malformed TOML should fail to load");
}

#[tokio::test]
async fn invalid_value_fails_validation() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("vulntriage.toml");

    fs::write(
        &config_path,
        "[general]\nlog_level = \"verbose\"\n",
    )
    .expect("should write config");

    let result = VulntriageConfig::load(&config_path).await;
    assert!(result.is_err(), "unknown log level should fail validation");
}

#[tokio::test]
async fn missing_file_falls_back_to_defaults() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("does-not-exist.toml");

    let config = VulntriageConfig::load_or_default(&config_path)
        .await
        .expect("missing file should fall back to defaults");
    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.store.snapshot_file, "vulntriage-store.json");
}

#[tokio::test]
async fn effective_config_renders_as_toml() {
    let config = VulntriageConfig::default();
    let rendered = toml::to_string_pretty(&config).expect("config should serialize");
    assert!(rendered.contains("[general]"));
    assert!(rendered.contains("[ingest]"));
    assert!(rendered.contains("[store]"));

    // show가 출력한 TOML은 validate로 다시 읽을 수 있어야 함
    let parsed = VulntriageConfig::parse(&rendered).expect("rendered config should parse");
    parsed.validate().expect("rendered config should validate");
}
