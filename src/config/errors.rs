//! Configuration error types
//!
//! Error codes:
//! - STOWAGE_CONFIG_MISSING_STORE: no durable store was supplied
//! - STOWAGE_CONFIG_MISSING_CODEC: no codec was supplied
//! - STOWAGE_CONFIG_INVALID: a configuration value is out of range
//! - STOWAGE_CONFIG_READ_FAILED: the configuration file could not be read
//! - STOWAGE_CONFIG_PARSE_FAILED: the configuration file is not valid JSON

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for configuration
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Assembly-time errors. None of these can occur once a
/// [`Stowage`](crate::Stowage) exists.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("a durable store is required")]
    MissingStore,

    #[error("a codec is required")]
    MissingCodec,

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ConfigError::Invalid(message.into())
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::MissingStore => "STOWAGE_CONFIG_MISSING_STORE",
            ConfigError::MissingCodec => "STOWAGE_CONFIG_MISSING_CODEC",
            ConfigError::Invalid(_) => "STOWAGE_CONFIG_INVALID",
            ConfigError::Read { .. } => "STOWAGE_CONFIG_READ_FAILED",
            ConfigError::Parse(_) => "STOWAGE_CONFIG_PARSE_FAILED",
        }
    }
}
