//! Payload transforms
//!
//! A transform rewrites an encoded payload before it reaches the durable
//! store and reverses the rewrite on the way back. It is keyed by the storage
//! key and must be a total, deterministic, invertible pair per key. Neither
//! shipped transform provides confidentiality.

mod base64_transform;
mod errors;

pub use base64_transform::Base64Transform;
pub use errors::{TransformError, TransformResult};

use std::fmt;

/// Reversible string to string mapping applied to stored payloads
pub trait Transform: Send + Sync + fmt::Debug {
    fn encrypt(&self, key: &str, plain: &str) -> TransformResult<String>;

    fn decrypt(&self, key: &str, encrypted: &str) -> TransformResult<String>;
}

/// Stores payloads unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTransform;

impl Transform for IdentityTransform {
    fn encrypt(&self, _key: &str, plain: &str) -> TransformResult<String> {
        Ok(plain.to_string())
    }

    fn decrypt(&self, _key: &str, encrypted: &str) -> TransformResult<String> {
        Ok(encrypted.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_verbatim() {
        let t = IdentityTransform;
        let out = t.encrypt("k", "{\"a\":1}").unwrap();
        assert_eq!(out, "{\"a\":1}");
        assert_eq!(t.decrypt("k", &out).unwrap(), "{\"a\":1}");
    }
}
