use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use super::{Transform, TransformError, TransformResult};

/// Stores payloads as standard padded base64
///
/// Obfuscation only. Keeps stored files free of raw JSON so casual edits
/// fail loudly on decode instead of silently changing values.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64Transform;

impl Transform for Base64Transform {
    fn encrypt(&self, _key: &str, plain: &str) -> TransformResult<String> {
        Ok(STANDARD.encode(plain.as_bytes()))
    }

    fn decrypt(&self, key: &str, encrypted: &str) -> TransformResult<String> {
        let bytes = STANDARD
            .decode(encrypted.trim())
            .map_err(|e| TransformError::decrypt(key, e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| TransformError::decrypt(key, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encodes_standard_padded() {
        let t = Base64Transform;
        assert_eq!(t.encrypt("k", "true").unwrap(), "dHJ1ZQ==");
        assert_eq!(t.decrypt("k", "dHJ1ZQ==").unwrap(), "true");
    }

    #[test]
    fn test_tolerates_trailing_newline() {
        assert_eq!(Base64Transform.decrypt("k", "dHJ1ZQ==\n").unwrap(), "true");
    }

    #[test]
    fn test_rejects_plain_payload() {
        let err = Base64Transform.decrypt("k", "{\"a\":1}").unwrap_err();
        assert_eq!(err.code(), "STOWAGE_TRANSFORM_DECRYPT_FAILED");
    }

    #[test]
    fn test_rejects_non_utf8_output() {
        let encoded = STANDARD.encode([0xff, 0xfe]);
        assert!(Base64Transform.decrypt("k", &encoded).is_err());
    }
}
