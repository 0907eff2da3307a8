use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{Codec, CodecError, CodecResult};

/// JSON codec backed by `serde_json`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonCodec {
    pretty: bool,
}

impl JsonCodec {
    /// Compact output
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// Indented output. Decoding accepts either form.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    pub fn is_pretty(&self) -> bool {
        self.pretty
    }
}

impl Codec for JsonCodec {
    fn serialize<T>(&self, value: &T) -> CodecResult<String>
    where
        T: Serialize + ?Sized,
    {
        let encoded = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        encoded.map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn deserialize<T>(&self, payload: &str) -> CodecResult<T>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(payload).map_err(|e| CodecError::Decode(e.to_string()))
    }
}
