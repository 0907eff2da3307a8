//! Transform error types
//!
//! Error codes:
//! - STOWAGE_TRANSFORM_ENCRYPT_FAILED
//! - STOWAGE_TRANSFORM_DECRYPT_FAILED: the stored payload is not in the
//!   transformed form

use thiserror::Error;

/// Result type for transform operations
pub type TransformResult<T> = Result<T, TransformError>;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("cannot transform payload for key '{key}': {reason}")]
    Encrypt { key: String, reason: String },

    #[error("cannot reverse payload for key '{key}': {reason}")]
    Decrypt { key: String, reason: String },
}

impl TransformError {
    pub fn encrypt(key: &str, reason: impl Into<String>) -> Self {
        TransformError::Encrypt {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn decrypt(key: &str, reason: impl Into<String>) -> Self {
        TransformError::Decrypt {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            TransformError::Encrypt { .. } => "STOWAGE_TRANSFORM_ENCRYPT_FAILED",
            TransformError::Decrypt { .. } => "STOWAGE_TRANSFORM_DECRYPT_FAILED",
        }
    }
}
