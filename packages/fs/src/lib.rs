//! Filesystem layer for statevault.
//!
//! Everything at this level is paths and bytes. No JSON, no domain types.
//!
//! - `PathResolver`: maps a logical name plus an `Intention` onto the reading
//!   or the writing root, creating directories on the write side when asked.
//! - `FileAccess`: the injectable file capability. `LocalFileAccess` is the
//!   std-backed implementation whose writes never leave a half-written file
//!   behind.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use statevault_fs::{FileAccess, Intention, LocalFileAccess, PathResolver};
//!
//! let read = tempfile::tempdir().unwrap();
//! let write = tempfile::tempdir().unwrap();
//! let access: Arc<dyn FileAccess> = Arc::new(LocalFileAccess);
//! let resolver = PathResolver::new(read.path(), write.path(), access.clone());
//!
//! let folder = resolver.resolve("projects", Intention::Writing, true).unwrap();
//! assert!(folder.is_dir());
//! assert!(folder.starts_with(write.path()));
//! ```

pub use bytes::Bytes;

mod access;
mod error;
mod resolve;

pub use access::{FileAccess, LocalFileAccess};
pub use error::FsError;
pub use resolve::{Intention, PathResolver};
