//! Error types for the filesystem layer.

use std::io;
use std::path::PathBuf;

/// Errors at the filesystem layer.
///
/// `NotFound` is split out from `Io` because higher layers treat a missing
/// file as "no prior state" rather than as a failure.
#[derive(thiserror::Error, Debug)]
pub enum FsError {
    /// Nothing exists at the path.
    #[error("no such file or directory: {}", .path.display())]
    NotFound { path: PathBuf },

    /// Any other I/O failure.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A directory could not be created.
    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The logical name would resolve outside of its root.
    #[error("invalid name {name:?}: {message}")]
    InvalidName { name: String, message: String },
}

impl FsError {
    /// Classify an I/O error, mapping `ErrorKind::NotFound` to `FsError::NotFound`.
    pub fn from_io(path: impl Into<PathBuf>, error: io::Error) -> Self {
        let path = path.into();
        if error.kind() == io::ErrorKind::NotFound {
            FsError::NotFound { path }
        } else {
            FsError::Io {
                path,
                source: error,
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FsError::NotFound { .. })
    }
}
