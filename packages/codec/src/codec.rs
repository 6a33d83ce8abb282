//! JSON codec implementation.

use bytes::Bytes;
use serde_json::Value;

use crate::CodecError;

/// A codec between JSON bytes and `serde_json::Value` trees.
///
/// Encoding is pretty-printed. Decoding accepts any JSON text, including a
/// bare scalar at the top level. Nothing here knows about domain types.
///
/// # Example
///
/// ```rust
/// use statevault_codec::JsonCodec;
/// use serde_json::json;
///
/// let value = json!({"id": "a", "v": 1});
/// let bytes = JsonCodec.encode(&value).unwrap();
/// assert_eq!(JsonCodec.decode(&bytes).unwrap(), value);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    /// Encode a value as pretty-printed UTF-8 JSON.
    pub fn encode(&self, value: &Value) -> Result<Bytes, CodecError> {
        let bytes = serde_json::to_vec_pretty(value).map_err(CodecError::Encode)?;
        Ok(Bytes::from(bytes))
    }

    /// Decode JSON bytes into a value tree.
    pub fn decode(&self, bytes: &[u8]) -> Result<Value, CodecError> {
        serde_json::from_slice(bytes).map_err(CodecError::Decode)
    }
}
