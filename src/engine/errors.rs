//! Orchestrator error types
//!
//! Error codes:
//! - STOWAGE_STORE_*: see [`StoreError`]
//! - STOWAGE_ENGINE_ENCODE_FAILED: the value could not be serialized
//! - STOWAGE_ENGINE_ENCRYPT_FAILED: the transform rejected the encoded value
//! - STOWAGE_ENGINE_DECODE_FAILED: the stored payload is not a value of the
//!   requested type
//! - STOWAGE_ENGINE_DECRYPT_FAILED: the stored payload could not be reversed
//!   by the transform
//! - STOWAGE_ENGINE_WORKER_FAILED: the background task did not complete

use thiserror::Error;

use crate::codec::CodecError;
use crate::store::StoreError;
use crate::transform::TransformError;

/// Result type for orchestrator operations
pub type StowageResult<T> = Result<T, StowageError>;

/// Errors surfaced by [`Stowage`](super::Stowage) operations
#[derive(Debug, Error)]
pub enum StowageError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("cannot encode value for key '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: CodecError,
    },

    #[error("cannot transform value for key '{key}': {source}")]
    Encrypt {
        key: String,
        #[source]
        source: TransformError,
    },

    #[error("cannot decode value for key '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: CodecError,
    },

    #[error("cannot reverse stored payload for key '{key}': {source}")]
    Decrypt {
        key: String,
        #[source]
        source: TransformError,
    },

    #[error("background worker failed: {0}")]
    Worker(String),
}

impl StowageError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            StowageError::Store(e) => e.code(),
            StowageError::Encode { .. } => "STOWAGE_ENGINE_ENCODE_FAILED",
            StowageError::Encrypt { .. } => "STOWAGE_ENGINE_ENCRYPT_FAILED",
            StowageError::Decode { .. } => "STOWAGE_ENGINE_DECODE_FAILED",
            StowageError::Decrypt { .. } => "STOWAGE_ENGINE_DECRYPT_FAILED",
            StowageError::Worker(_) => "STOWAGE_ENGINE_WORKER_FAILED",
        }
    }

    /// Returns whether a stored payload could not be turned back into a value
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            StowageError::Decode { .. } | StowageError::Decrypt { .. }
        )
    }

    /// Returns whether the entry was found unreadable on the medium
    pub fn is_corrupt(&self) -> bool {
        matches!(self, StowageError::Store(e) if e.is_corrupt())
    }
}
