//! Store configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::StoreError;

/// Where a `Persistence` reads from and writes to.
///
/// Passed explicitly to the store so tests can point it at temporary
/// directories. It is serde-friendly so hosts can embed it in their own
/// settings files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub reading_root: PathBuf,
    pub writing_root: PathBuf,
}

impl StoreConfig {
    /// Read and write the same directory.
    pub fn shared(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            reading_root: root.clone(),
            writing_root: root,
        }
    }

    /// Read from one directory and write to another, e.g. while upgrading
    /// state left behind by an older release.
    pub fn split(reading_root: impl Into<PathBuf>, writing_root: impl Into<PathBuf>) -> Self {
        Self {
            reading_root: reading_root.into(),
            writing_root: writing_root.into(),
        }
    }

    /// A shared root named `folder_name` inside the platform's per-user data
    /// directory (`~/.local/share` on Linux, `~/Library/Application Support`
    /// on macOS).
    pub fn standard(folder_name: &str) -> Result<Self, StoreError> {
        let data_dir = dirs::data_dir().ok_or_else(|| StoreError::Setup {
            message: "no per-user data directory is available on this platform".to_string(),
            source: None,
        })?;
        Ok(Self::shared(data_dir.join(folder_name)))
    }

    pub fn is_shared(&self) -> bool {
        self.reading_root == self.writing_root
    }

    pub fn reading_root(&self) -> &Path {
        &self.reading_root
    }

    pub fn writing_root(&self) -> &Path {
        &self.writing_root
    }
}
