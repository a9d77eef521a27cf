//! Runtime configuration.
//!
//! Sources are layered in this order, later ones winning:
//! 1. built-in defaults
//! 2. a TOML file (`symtab.toml` in the working directory, or an explicit path)
//! 3. environment variables with the `SYMTAB__` prefix, e.g.
//!    `SYMTAB__ENCODING=latin1` or `SYMTAB__LOGGING__LEVEL=debug`

use std::path::Path;

use config as cfg;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::encoding::{ConversionStrategy, EncodingPolicy, TextEncoding};

pub const DEFAULT_CONFIG_FILE: &str = "symtab.toml";
pub const ENV_PREFIX: &str = "SYMTAB";

const MAX_INITIAL_CAPACITY: usize = 1 << 24;
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: &[&str] = &["pretty", "compact"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Which encoding the locale entry points decode with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingSetting {
    /// Follow `LC_ALL` / `LC_CTYPE` / `LANG`
    #[default]
    Locale,
    Utf8,
    Latin1,
    Ascii,
}

impl EncodingSetting {
    pub fn resolve(self) -> TextEncoding {
        match self {
            EncodingSetting::Locale => EncodingPolicy::from_locale().encoding,
            EncodingSetting::Utf8 => TextEncoding::Utf8,
            EncodingSetting::Latin1 => TextEncoding::Latin1,
            EncodingSetting::Ascii => TextEncoding::Ascii,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "pretty" or "compact"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub encoding: EncodingSetting,

    #[serde(default)]
    pub conversion_strategy: ConversionStrategy,

    /// Pre-sized symbol slots in a fresh table
    #[serde(default = "default_initial_capacity")]
    pub initial_capacity: usize,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            encoding: EncodingSetting::default(),
            conversion_strategy: ConversionStrategy::default(),
            initial_capacity: default_initial_capacity(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_initial_capacity() -> usize {
    256
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl RuntimeConfig {
    /// Load from `symtab.toml` (if present) and `SYMTAB__*` variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_sources(None, ENV_PREFIX)
    }

    /// Load with an explicit config file, which must exist.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        Self::load_from_sources(Some(path), ENV_PREFIX)
    }

    pub fn load_from_sources(path: Option<&Path>, env_prefix: &str) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => cfg::File::from(path).required(true),
            None => cfg::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config: RuntimeConfig = cfg::Config::builder()
            .add_source(file)
            .add_source(
                cfg::Environment::with_prefix(env_prefix)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?
            .try_deserialize()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        debug!(
            encoding = ?config.encoding,
            strategy = ?config.conversion_strategy,
            "Runtime configuration loaded"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_capacity > MAX_INITIAL_CAPACITY {
            return Err(ConfigError::ValidationError(format!(
                "initial_capacity {} exceeds {}",
                self.initial_capacity, MAX_INITIAL_CAPACITY
            )));
        }
        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "unknown log level '{}'",
                self.logging.level
            )));
        }
        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "unknown log format '{}'",
                self.logging.format
            )));
        }
        Ok(())
    }

    pub fn encoding_policy(&self) -> EncodingPolicy {
        EncodingPolicy::new(self.encoding.resolve()).with_strategy(self.conversion_strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = RuntimeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.encoding, EncodingSetting::Locale);
        assert_eq!(config.conversion_strategy, ConversionStrategy::Error);
    }

    #[test]
    fn explicit_encoding_ignores_locale() {
        let config = RuntimeConfig {
            encoding: EncodingSetting::Latin1,
            conversion_strategy: ConversionStrategy::Substitute,
            ..Default::default()
        };
        let policy = config.encoding_policy();
        assert_eq!(policy.encoding, TextEncoding::Latin1);
        assert_eq!(policy.strategy, ConversionStrategy::Substitute);
    }

    #[test]
    fn rejects_unknown_log_level() {
        let mut config = RuntimeConfig::default();
        config.logging.level = "chatty".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn rejects_oversized_capacity() {
        let config = RuntimeConfig {
            initial_capacity: MAX_INITIAL_CAPACITY + 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
