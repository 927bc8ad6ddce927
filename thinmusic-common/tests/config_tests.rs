//! Unit tests for configuration loading and resolution
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate THINMUSIC_CONFIG are marked with #[serial].

use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use thinmusic_common::config::{
    config_file_path, load_toml_config, ConfigOverrides, LoggingConfig, ServiceConfig, TomlConfig,
    CONFIG_ENV_VAR, DEFAULT_DEBOUNCE_MS, DEFAULT_SEARCH_LIMIT,
};
use thinmusic_common::Error;

fn write_toml(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

// ============================================================================
// Resolution
// ============================================================================

#[test]
fn test_defaults_when_nothing_configured() {
    let config = ServiceConfig::resolve(&ConfigOverrides::default(), &TomlConfig::default()).unwrap();

    assert_eq!(config, ServiceConfig::default());
    assert_eq!(config.debounce, Duration::from_millis(DEFAULT_DEBOUNCE_MS));
    assert_eq!(config.search_limit, DEFAULT_SEARCH_LIMIT);
    assert!(config.developer_token.is_none());
}

#[test]
fn test_toml_overrides_defaults() {
    let toml = TomlConfig {
        port: Some(6000),
        storefront: Some("gb".to_string()),
        debounce_ms: Some(400),
        logging: LoggingConfig {
            level: Some("debug".to_string()),
        },
        ..Default::default()
    };

    let config = ServiceConfig::resolve(&ConfigOverrides::default(), &toml).unwrap();

    assert_eq!(config.port, 6000);
    assert_eq!(config.storefront, "gb");
    assert_eq!(config.debounce, Duration::from_millis(400));
    assert_eq!(config.log_level, "debug");
}

#[test]
fn test_command_line_overrides_toml() {
    let toml = TomlConfig {
        port: Some(6000),
        developer_token: Some("toml-token".to_string()),
        ..Default::default()
    };
    let overrides = ConfigOverrides {
        port: Some(7000),
        developer_token: Some("cli-token".to_string()),
        ..Default::default()
    };

    let config = ServiceConfig::resolve(&overrides, &toml).unwrap();

    assert_eq!(config.port, 7000);
    assert_eq!(config.developer_token.as_deref(), Some("cli-token"));
}

#[test]
fn test_blank_token_falls_through() {
    let toml = TomlConfig {
        music_user_token: Some("toml-user".to_string()),
        ..Default::default()
    };
    let overrides = ConfigOverrides {
        music_user_token: Some("".to_string()),
        ..Default::default()
    };

    let config = ServiceConfig::resolve(&overrides, &toml).unwrap();
    assert_eq!(config.music_user_token.as_deref(), Some("toml-user"));
}

#[test]
fn test_search_limit_out_of_range_rejected() {
    for limit in [0, 26] {
        let overrides = ConfigOverrides {
            search_limit: Some(limit),
            ..Default::default()
        };
        let result = ServiceConfig::resolve(&overrides, &TomlConfig::default());
        assert!(matches!(result, Err(Error::Config(_))), "limit {} accepted", limit);
    }
}

#[test]
fn test_non_http_base_url_rejected() {
    let toml = TomlConfig {
        api_base_url: Some("ftp://example.com".to_string()),
        ..Default::default()
    };
    let result = ServiceConfig::resolve(&ConfigOverrides::default(), &toml);
    assert!(matches!(result, Err(Error::Config(_))));
}

// ============================================================================
// TOML file loading
// ============================================================================

#[test]
fn test_missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_toml_config(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_load_full_file() {
    let file = write_toml(
        r#"
host = "0.0.0.0"
port = 8080
storefront = "de"
developer_token = "dev"
search_limit = 15

[logging]
level = "warn"
"#,
    );

    let config = load_toml_config(file.path()).unwrap();

    assert_eq!(config.host.as_deref(), Some("0.0.0.0"));
    assert_eq!(config.port, Some(8080));
    assert_eq!(config.storefront.as_deref(), Some("de"));
    assert_eq!(config.developer_token.as_deref(), Some("dev"));
    assert_eq!(config.search_limit, Some(15));
    assert_eq!(config.logging.level.as_deref(), Some("warn"));
    assert!(config.music_user_token.is_none());
}

#[test]
fn test_malformed_file_is_config_error() {
    let file = write_toml("port = \"not a number\"");
    let result = load_toml_config(file.path());
    assert!(matches!(result, Err(Error::Config(_))));
}

// ============================================================================
// Config file location
// ============================================================================

#[test]
#[serial]
fn test_explicit_path_wins() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/from-env.toml");
    let explicit = PathBuf::from("/tmp/explicit.toml");

    assert_eq!(config_file_path(Some(&explicit)), Some(explicit.clone()));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_env_path_used_without_explicit() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/from-env.toml");

    assert_eq!(config_file_path(None), Some(PathBuf::from("/tmp/from-env.toml")));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_default_path_under_config_dir() {
    env::remove_var(CONFIG_ENV_VAR);

    if let Some(path) = config_file_path(None) {
        assert!(path.ends_with("thinmusic/config.toml"));
    }
}
