//! Diagnostics sink for failures the store absorbs instead of returning.
//!
//! Collection loads drop unreadable items and deletes are best-effort; both
//! still need to leave a trace somewhere. The store reports those events to
//! an injected `Diagnostics` rather than a global logger so tests can assert
//! on them.

use std::path::PathBuf;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Expected and harmless, e.g. deleting something that was never saved.
    Notice,
    /// Something was lost or skipped.
    Error,
}

/// One absorbed event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// The store operation that produced it, e.g. `"load_collection"`.
    pub operation: &'static str,
    pub path: PathBuf,
    pub message: String,
}

pub trait Diagnostics: Send + Sync {
    fn record(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn record(&self, diagnostic: Diagnostic) {
        let level = match diagnostic.severity {
            Severity::Notice => log::Level::Info,
            Severity::Error => log::Level::Error,
        };
        log::log!(
            level,
            "{} {}: {}",
            diagnostic.operation,
            diagnostic.path.display(),
            diagnostic.message
        );
    }
}

/// Keeps every diagnostic in memory.
#[derive(Debug, Default)]
pub struct MemoryDiagnostics {
    entries: Mutex<Vec<Diagnostic>>,
}

impl MemoryDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of everything recorded so far.
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

impl Diagnostics for MemoryDiagnostics {
    fn record(&self, diagnostic: Diagnostic) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(diagnostic);
    }
}
