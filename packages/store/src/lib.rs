//! Dual-root JSON persistence.
//!
//! `Persistence` keeps application state on disk as JSON, either as single
//! documents or as collections (one file per item in a folder). Reads and
//! writes resolve against separate roots, which may be the same directory:
//!
//! ```text
//! <reading root>/settings.json            <- load_document("settings.json")
//! <writing root>/projects/<id>.json       <- save_collection("projects", ..)
//! ```
//!
//! Failures the store absorbs (unparsable collection items, best-effort
//! deletes) go to an injected `Diagnostics` sink; `LogDiagnostics` forwards
//! them to the `log` facade.
//!
//! # Example
//!
//! ```rust
//! use statevault_store::{Persistence, StoreConfig};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Project {
//!     id: String,
//!     branch: String,
//! }
//!
//! let dir = tempfile::tempdir().unwrap();
//! let store = Persistence::open(StoreConfig::shared(dir.path())).unwrap();
//!
//! let projects = vec![Project { id: "p1".into(), branch: "main".into() }];
//! let report = store
//!     .save_collection("projects", &projects, |p| p.id.clone())
//!     .unwrap();
//! assert!(report.is_complete());
//!
//! let loaded: Vec<Project> = store.load_collection("projects").unwrap();
//! assert_eq!(loaded, projects);
//! ```

mod config;
mod diagnostics;
mod error;
mod persistence;
mod report;

pub use config::StoreConfig;
pub use diagnostics::{Diagnostic, Diagnostics, LogDiagnostics, MemoryDiagnostics, Severity};
pub use error::StoreError;
pub use persistence::Persistence;
pub use report::{ItemFailure, LoadReport, SaveReport};

// Re-export the lower layers' vocabulary for convenience
pub use statevault_codec::{CodecError, JsonReadable, JsonWritable};
pub use statevault_fs::{FileAccess, FsError, Intention, LocalFileAccess};
