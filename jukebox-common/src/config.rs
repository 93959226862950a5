//! Bootstrap configuration loading
//!
//! Configuration file resolution follows a fixed priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Platform config file (`<config_dir>/jukebox/config.toml`)
//! 4. Compiled defaults (fallback)
//!
//! A missing configuration file is not an error: a warning is logged and the
//! compiled defaults are used. A file that exists but cannot be parsed is an
//! error.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming the configuration file
pub const CONFIG_ENV_VAR: &str = "JUKEBOX_CONFIG";

/// Bootstrap configuration loaded from TOML
///
/// Cannot change while the bot is running.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TomlConfig {
    /// Interval between backend event-processing polls
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Delay before the startup "nothing playing" comment check
    #[serde(default = "default_comment_check_delay_ms")]
    pub comment_check_delay_ms: u64,

    /// Upper bound for a single query resolution
    #[serde(default = "default_resolve_timeout_ms")]
    pub resolve_timeout_ms: u64,

    /// Music catalog used by the catalog resolver
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    /// Chat volume at startup (0-100)
    #[serde(default = "default_initial_volume")]
    pub initial_volume: u8,

    /// Buffered events per EventBus subscriber
    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_comment_check_delay_ms() -> u64 {
    5000
}

fn default_resolve_timeout_ms() -> u64 {
    5000
}

fn default_initial_volume() -> u8 {
    50
}

fn default_event_bus_capacity() -> usize {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            comment_check_delay_ms: default_comment_check_delay_ms(),
            resolve_timeout_ms: default_resolve_timeout_ms(),
            catalog_path: None,
            initial_volume: default_initial_volume(),
            event_bus_capacity: default_event_bus_capacity(),
            logging: LoggingConfig::default(),
        }
    }
}

impl TomlConfig {
    /// Parse a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text, validating ranges
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(Error::Config("poll_interval_ms must be positive".to_string()));
        }
        if self.resolve_timeout_ms == 0 {
            return Err(Error::Config("resolve_timeout_ms must be positive".to_string()));
        }
        if self.initial_volume > 100 {
            return Err(Error::Config(format!(
                "initial_volume must be within 0-100, got {}",
                self.initial_volume
            )));
        }
        if self.event_bus_capacity == 0 {
            return Err(Error::Config("event_bus_capacity must be positive".to_string()));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn comment_check_delay(&self) -> Duration {
        Duration::from_millis(self.comment_check_delay_ms)
    }

    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_millis(self.resolve_timeout_ms)
    }
}

/// Locate the configuration file by priority
///
/// Returns `None` when no candidate was named and the platform default does
/// not exist.
pub fn resolve_config_path(cli_arg: Option<&Path>, env_var_name: &str) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config file
    default_config_file().filter(|p| p.exists())
}

/// Platform config file location (`~/.config/jukebox/config.toml` on Linux)
pub fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("jukebox").join("config.toml"))
}

/// Resolve and load the configuration, degrading to defaults
///
/// Returns the configuration and the file it came from, if any.
pub fn load_config(cli_arg: Option<&Path>, env_var_name: &str) -> Result<(TomlConfig, Option<PathBuf>)> {
    let Some(path) = resolve_config_path(cli_arg, env_var_name) else {
        info!("No configuration file found, using compiled defaults");
        return Ok((TomlConfig::default(), None));
    };

    if !path.exists() {
        warn!("Configuration file {:?} does not exist, using compiled defaults", path);
        return Ok((TomlConfig::default(), None));
    }

    let config = TomlConfig::from_file(&path)?;
    info!("Loaded configuration from {:?}", path);
    Ok((config, Some(path)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TomlConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.comment_check_delay(), Duration::from_secs(5));
        assert_eq!(config.resolve_timeout(), Duration::from_secs(5));
        assert_eq!(config.logging.level, "info");
        assert!(config.catalog_path.is_none());
    }

    #[test]
    fn test_empty_document_equals_defaults() {
        assert_eq!(TomlConfig::from_toml_str("").unwrap(), TomlConfig::default());
    }

    #[test]
    fn test_partial_document_keeps_other_defaults() {
        let config = TomlConfig::from_toml_str(
            r#"
            resolve_timeout_ms = 250
            catalog_path = "/srv/music/catalog.toml"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.resolve_timeout(), Duration::from_millis(250));
        assert_eq!(config.poll_interval_ms, 1000);
        assert_eq!(config.catalog_path, Some(PathBuf::from("/srv/music/catalog.toml")));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_rejects_out_of_range_volume() {
        let err = TomlConfig::from_toml_str("initial_volume = 101").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_zero_poll_interval() {
        assert!(TomlConfig::from_toml_str("poll_interval_ms = 0").is_err());
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = TomlConfig::from_toml_str("poll_interval_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, Error::Toml(_)));
    }
}
