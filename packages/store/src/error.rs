//! Error types for the persistence store.

use statevault_codec::CodecError;
use statevault_fs::FsError;

/// Errors surfaced by `Persistence`.
///
/// A missing document or collection is not an error: loads report it as
/// `Ok(None)` or an empty result instead.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// The store cannot operate: a root could not be created, or seeding the
    /// writing root from the reading root failed.
    #[error("persistence setup failed: {message}")]
    Setup {
        message: String,
        #[source]
        source: Option<FsError>,
    },

    /// A stored document was malformed or rejected by its conversion.
    #[error("failed to parse {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: CodecError,
    },

    /// A value could not be encoded for saving.
    #[error("failed to encode {name}: {source}")]
    Encode {
        name: String,
        #[source]
        source: CodecError,
    },

    /// The filesystem refused a read, write or listing.
    #[error("I/O failure for {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: FsError,
    },
}

impl StoreError {
    pub(crate) fn setup(message: impl Into<String>, source: FsError) -> Self {
        StoreError::Setup {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Map a failure from the path resolver. Directory creation failures
    /// mean the store layout itself is broken.
    pub(crate) fn resolve(name: &str, source: FsError) -> Self {
        match source {
            FsError::CreateDirectory { .. } => {
                StoreError::setup(format!("could not create directory for {}", name), source)
            }
            source => StoreError::Io {
                name: name.to_string(),
                source,
            },
        }
    }
}
