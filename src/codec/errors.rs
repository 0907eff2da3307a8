//! Codec error types
//!
//! Error codes:
//! - STOWAGE_CODEC_ENCODE_FAILED: the value could not be encoded
//! - STOWAGE_CODEC_DECODE_FAILED: the payload is malformed or of another type

use thiserror::Error;

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Codec errors
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("encode failed: {0}")]
    Encode(String),

    #[error("decode failed: {0}")]
    Decode(String),
}

impl CodecError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            CodecError::Encode(_) => "STOWAGE_CODEC_ENCODE_FAILED",
            CodecError::Decode(_) => "STOWAGE_CODEC_DECODE_FAILED",
        }
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, CodecError::Decode(_))
    }
}
