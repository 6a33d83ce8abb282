//! Error types for the codec layer.

/// Errors produced while moving between bytes, JSON values and domain types.
///
/// `Decode` and `Convert` are kept apart so callers can tell a damaged file
/// from a well-formed file that does not describe the expected type.
#[derive(thiserror::Error, Debug)]
pub enum CodecError {
    /// The bytes were not valid JSON.
    #[error("malformed JSON: {0}")]
    Decode(#[source] serde_json::Error),

    /// A value could not be rendered as JSON.
    #[error("failed to encode JSON: {0}")]
    Encode(#[source] serde_json::Error),

    /// The JSON was well-formed but could not be turned into the requested type.
    #[error("JSON value rejected: {message}")]
    Convert { message: String },
}

impl CodecError {
    /// Build a conversion error from anything printable.
    ///
    /// Meant for hand-written `JsonReadable` impls and conversion closures.
    pub fn convert(message: impl std::fmt::Display) -> Self {
        CodecError::Convert {
            message: message.to_string(),
        }
    }
}
