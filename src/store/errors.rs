//! Durable store error types
//!
//! Error codes:
//! - STOWAGE_STORE_IO_ERROR: a write, rename, delete or listing failed
//! - STOWAGE_STORE_CORRUPT_ENTRY: an entry file existed but could not be read;
//!   it has been deleted
//! - STOWAGE_STORE_INVALID_KEY: the key cannot name an entry

use std::io;

use thiserror::Error;

/// Result type for durable store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Durable store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// The medium rejected an operation. Any pending backup is still the
    /// authoritative value for the key.
    #[error("{message}: {source}")]
    Io {
        message: String,
        #[source]
        source: io::Error,
    },

    /// The entry could not be read and was removed. Later reads of the key
    /// report it as absent.
    #[error("corrupt entry for key '{key}': {reason}")]
    Corrupt {
        key: String,
        reason: String,
        #[source]
        source: Option<io::Error>,
    },

    /// The key is empty or cannot be used as a single path segment.
    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: &'static str },
}

impl StoreError {
    /// Create an I/O failure with context
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        StoreError::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a corrupt entry error
    pub fn corrupt(key: &str, reason: impl Into<String>, source: Option<io::Error>) -> Self {
        StoreError::Corrupt {
            key: key.to_string(),
            reason: reason.into(),
            source,
        }
    }

    /// Create an invalid key error
    pub fn invalid_key(key: &str, reason: &'static str) -> Self {
        StoreError::InvalidKey {
            key: key.to_string(),
            reason,
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Io { .. } => "STOWAGE_STORE_IO_ERROR",
            StoreError::Corrupt { .. } => "STOWAGE_STORE_CORRUPT_ENTRY",
            StoreError::InvalidKey { .. } => "STOWAGE_STORE_INVALID_KEY",
        }
    }

    /// Returns whether the failing entry was found unreadable
    pub fn is_corrupt(&self) -> bool {
        matches!(self, StoreError::Corrupt { .. })
    }

    /// Returns whether the medium rejected the operation
    pub fn is_io(&self) -> bool {
        matches!(self, StoreError::Io { .. })
    }
}
