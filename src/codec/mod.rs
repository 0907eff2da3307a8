//! Value codecs
//!
//! A codec turns a typed value into a string payload and back. Codecs carry
//! no per-key state; the orchestrator picks the target type at each call
//! site through a generic parameter.

mod errors;
mod json;

pub use errors::{CodecError, CodecResult};
pub use json::JsonCodec;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Typed value to string payload conversion
pub trait Codec: Send + Sync + fmt::Debug + 'static {
    /// Encode `value` as a payload string
    fn serialize<T>(&self, value: &T) -> CodecResult<String>
    where
        T: Serialize + ?Sized;

    /// Decode `payload` as a `T`
    ///
    /// Fails with [`CodecError::Decode`] on malformed input or when the
    /// payload does not describe a `T`.
    fn deserialize<T>(&self, payload: &str) -> CodecResult<T>
    where
        T: DeserializeOwned;
}
