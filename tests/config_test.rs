//! Tests for config module

use sitemap_parser::config::ResolvedConfig;
use sitemap_parser::errors::AppError;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_config_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("sitemap-parser.toml");

    let config_content = r#"
should_cache = true
cache_dir = "custom/cache"
cache_max_age_secs = 0
timeout_secs = 30
user_agent = "crawler/1.0"
max_retries = 5
retry_initial_delay_ms = 200
retry_max_delay_ms = 2000
"#;

    fs::write(&config_path, config_content).unwrap();

    let config = ResolvedConfig::from_toml_file(&config_path).unwrap();

    assert!(config.should_cache);
    assert_eq!(config.cache_dir, PathBuf::from("custom/cache"));
    assert_eq!(config.cache_max_age(), None);
    assert_eq!(config.timeout(), Duration::from_secs(30));
    assert_eq!(config.user_agent, "crawler/1.0");
    assert_eq!(config.max_retries, 5);
    assert_eq!(config.retry_initial_delay_ms, 200);
    assert_eq!(config.retry_max_delay_ms, 2000);
}

#[test]
fn test_partial_config_keeps_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("sitemap-parser.toml");
    fs::write(&config_path, "max_retries = 0\n").unwrap();

    let config = ResolvedConfig::from_toml_file(&config_path).unwrap();
    let defaults = ResolvedConfig::default();

    assert_eq!(config.max_retries, 0);
    assert_eq!(config.cache_dir, defaults.cache_dir);
    assert_eq!(config.timeout_secs, defaults.timeout_secs);
    assert_eq!(config.user_agent, defaults.user_agent);
}

#[test]
fn test_unknown_key_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("sitemap-parser.toml");
    fs::write(&config_path, "shoud_cache = false\n").unwrap();

    let err = ResolvedConfig::from_toml_file(&config_path).unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
}

#[test]
fn test_missing_file_is_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let err = ResolvedConfig::from_toml_file(&temp_dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, AppError::Io(_)));
}
