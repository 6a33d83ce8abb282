//! statevault: file-backed JSON persistence with separate read and write roots.
//!
//! Application state is kept as JSON documents and collections on the local
//! filesystem. Reading and writing happen against two roots so state written
//! by an older release can be read while the upgraded state goes elsewhere.
//!
//! The crate is split in layers, re-exported here:
//! - [`codec`]: JSON bytes <-> `serde_json::Value`, and the conversion traits
//! - [`fs`]: path resolution and atomic file access
//! - [`store`]: the `Persistence` store itself
//!
//! # Example
//!
//! ```rust
//! use statevault::{Persistence, StoreConfig};
//! use serde_json::json;
//!
//! let old = tempfile::tempdir().unwrap();
//! let new = tempfile::tempdir().unwrap();
//! std::fs::write(old.path().join("config.json"), br#"{"version": 1}"#).unwrap();
//!
//! let store = Persistence::open(StoreConfig::split(old.path(), new.path())).unwrap();
//! let config: Option<serde_json::Value> = store.load_document("config.json").unwrap();
//! store.save_document("config.json", &json!({"version": 2})).unwrap();
//!
//! assert_eq!(config, Some(json!({"version": 1})));
//! assert!(new.path().join("config.json").is_file());
//! ```

pub use statevault_codec as codec;
pub use statevault_fs as fs;
pub use statevault_store as store;

pub use statevault_store::{
    CodecError, Diagnostic, Diagnostics, FileAccess, FsError, Intention, ItemFailure,
    JsonReadable, JsonWritable, LoadReport, LocalFileAccess, LogDiagnostics, MemoryDiagnostics,
    Persistence, SaveReport, Severity, StoreConfig, StoreError,
};
