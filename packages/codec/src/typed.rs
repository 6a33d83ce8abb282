//! Conversion traits between domain types and JSON values.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::CodecError;

/// Something that can describe itself as a JSON value.
///
/// Implemented automatically for every `Serialize` type.
pub trait JsonWritable {
    fn to_json(&self) -> Result<Value, CodecError>;
}

impl<T: Serialize + ?Sized> JsonWritable for T {
    fn to_json(&self) -> Result<Value, CodecError> {
        serde_json::to_value(self).map_err(CodecError::Encode)
    }
}

/// Something that can be rebuilt from a JSON value.
///
/// Implemented automatically for every `DeserializeOwned` type. A type whose
/// shape does not match the value reports `CodecError::Convert`.
pub trait JsonReadable: Sized {
    fn from_json(value: Value) -> Result<Self, CodecError>;
}

impl<T: DeserializeOwned> JsonReadable for T {
    fn from_json(value: Value) -> Result<Self, CodecError> {
        serde_json::from_value(value).map_err(CodecError::convert)
    }
}
