//! Configuration loading and resolution
//!
//! Each setting is resolved in priority order:
//! 1. Command-line argument or its `THINMUSIC_*` environment variable
//! 2. TOML config file
//! 3. Compiled default
//!
//! A missing config file is not an error; the service starts on defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::{Error, Result};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5780;
pub const DEFAULT_API_BASE_URL: &str = "https://api.music.apple.com";
pub const DEFAULT_STOREFRONT: &str = "us";
pub const DEFAULT_DEBOUNCE_MS: u64 = 250;
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Largest page size the search endpoints accept
pub const MAX_SEARCH_LIMIT: u32 = 25;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "THINMUSIC_CONFIG";

/// Logging section of the TOML file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (`error`, `warn`, `info`, `debug`, `trace`)
    pub level: Option<String>,
}

/// Contents of `config.toml`; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub api_base_url: Option<String>,
    pub storefront: Option<String>,
    pub developer_token: Option<String>,
    pub music_user_token: Option<String>,
    pub debounce_ms: Option<u64>,
    pub search_limit: Option<u32>,
    pub logging: LoggingConfig,
}

/// Values given on the command line (or via environment)
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub api_base_url: Option<String>,
    pub storefront: Option<String>,
    pub developer_token: Option<String>,
    pub music_user_token: Option<String>,
    pub debounce_ms: Option<u64>,
    pub search_limit: Option<u32>,
    pub log_level: Option<String>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub api_base_url: String,
    pub storefront: String,
    pub developer_token: Option<String>,
    pub music_user_token: Option<String>,
    pub debounce: Duration,
    pub search_limit: u32,
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            storefront: DEFAULT_STOREFRONT.to_string(),
            developer_token: None,
            music_user_token: None,
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            search_limit: DEFAULT_SEARCH_LIMIT,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Merge overrides, TOML values and defaults, then validate
    pub fn resolve(overrides: &ConfigOverrides, toml: &TomlConfig) -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            host: pick(&overrides.host, &toml.host).unwrap_or(defaults.host),
            port: overrides.port.or(toml.port).unwrap_or(defaults.port),
            api_base_url: pick(&overrides.api_base_url, &toml.api_base_url)
                .unwrap_or(defaults.api_base_url),
            storefront: pick(&overrides.storefront, &toml.storefront)
                .unwrap_or(defaults.storefront),
            developer_token: pick(&overrides.developer_token, &toml.developer_token),
            music_user_token: pick(&overrides.music_user_token, &toml.music_user_token),
            debounce: overrides
                .debounce_ms
                .or(toml.debounce_ms)
                .map(Duration::from_millis)
                .unwrap_or(defaults.debounce),
            search_limit: overrides
                .search_limit
                .or(toml.search_limit)
                .unwrap_or(defaults.search_limit),
            log_level: pick(&overrides.log_level, &toml.logging.level)
                .unwrap_or(defaults.log_level),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.search_limit == 0 || self.search_limit > MAX_SEARCH_LIMIT {
            return Err(Error::Config(format!(
                "search_limit must be between 1 and {}, got {}",
                MAX_SEARCH_LIMIT, self.search_limit
            )));
        }
        if self.storefront.trim().is_empty() {
            return Err(Error::Config("storefront must not be empty".to_string()));
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "api_base_url must be an http(s) URL: {}",
                self.api_base_url
            )));
        }
        Ok(())
    }

    /// `host:port` string for binding the HTTP listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// First non-blank value, preferring the override
fn pick(primary: &Option<String>, secondary: &Option<String>) -> Option<String> {
    primary
        .iter()
        .chain(secondary.iter())
        .find(|v| !v.trim().is_empty())
        .cloned()
}

/// Locate the config file
///
/// Explicit path, then `THINMUSIC_CONFIG`, then `<config dir>/thinmusic/config.toml`.
pub fn config_file_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir().map(|d| d.join("thinmusic").join("config.toml"))
}

/// Read a TOML config file
///
/// A missing file yields defaults with a warning. An unreadable file is an I/O
/// error, a malformed one a configuration error.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!("Config file not found at {}, using defaults", path.display());
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Loaded config from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn test_pick_skips_blank_override() {
        let primary = Some("   ".to_string());
        let secondary = Some("toml".to_string());
        assert_eq!(pick(&primary, &secondary), Some("toml".to_string()));
        assert_eq!(pick(&None, &None), None);
    }

    #[test]
    fn test_bind_address() {
        let config = ServiceConfig::default();
        assert_eq!(config.bind_address(), "127.0.0.1:5780");
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(ServiceConfig::default().validate().is_ok());
    }

    #[test]
    #[traced_test]
    fn test_missing_config_file_logs_warning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let config = load_toml_config(&path).unwrap();

        assert!(config.port.is_none());
        assert!(logs_contain("Config file not found"));
    }

    #[test]
    fn test_directory_as_config_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(load_toml_config(dir.path()), Err(Error::Io(_))));
    }
}
