//! Configuration loading using Figment.
//!
//! Values are layered, later sources winning:
//! 1. built-in defaults
//! 2. a TOML file (`ndskit.toml` in the working directory, or `--config`)
//! 3. environment variables prefixed with `NDSKIT_`, nested with `__`
//!
//! ```toml
//! [resolver]
//! default_host = "nds.ligo.caltech.edu"
//! lookback_secs = 1209600
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```
//!
//! `NDSKIT_RESOLVER__DEFAULT_PORT=31201` overrides `resolver.default_port`.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use nds_client::ResolverSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logging::{parse_log_level, OutputFormat, LOG_LEVELS};

/// Config file read by [`NdsKitConfig::load`].
pub const DEFAULT_CONFIG_FILE: &str = "ndskit.toml";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "NDSKIT_";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested file does not exist
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// A source could not be read or did not match the schema
    #[error(transparent)]
    Figment(#[from] Box<figment::Error>),
    /// Loaded values are out of range
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NdsKitConfig {
    /// Host resolution
    pub resolver: ResolverSettings,
    /// Log output
    pub logging: LoggingConfig,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format
    pub format: OutputFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: OutputFormat::default(),
        }
    }
}

impl NdsKitConfig {
    /// Load from `ndskit.toml` (if present) and the environment.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Figment`] if a source is malformed.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment(Path::new(DEFAULT_CONFIG_FILE))
            .extract()
            .map_err(|e| ConfigError::Figment(Box::new(e)))
    }

    /// Load from `path`, which must exist, and the environment.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NotFound`] for a missing file, [`ConfigError::Figment`]
    /// if a source is malformed.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        Self::figment(path)
            .extract()
            .map_err(|e| ConfigError::Figment(Box::new(e)))
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if parse_log_level(&self.logging.level).is_err() {
            return Err(ConfigError::Invalid(format!(
                "log level '{}' must be one of: {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            )));
        }

        let resolver = &self.resolver;
        if resolver.default_host.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "resolver.default_host must not be empty".to_string(),
            ));
        }
        if resolver.default_port == 0 {
            return Err(ConfigError::Invalid(
                "resolver.default_port must be non-zero".to_string(),
            ));
        }
        if resolver.lookback_secs == 0 {
            return Err(ConfigError::Invalid(
                "resolver.lookback_secs must be positive".to_string(),
            ));
        }
        if resolver.primary_env.is_empty() || resolver.fallback_env.is_empty() {
            return Err(ConfigError::Invalid(
                "resolver environment variable names must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
