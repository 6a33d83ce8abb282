//! Per-item outcomes of collection operations.

use std::path::PathBuf;

/// An item that could not be saved or loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of `Persistence::save_collection`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SaveReport {
    /// Files written, in item order.
    pub saved: Vec<PathBuf>,
    pub failures: Vec<ItemFailure>,
}

impl SaveReport {
    /// True when every item was written.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Outcome of `Persistence::load_collection_report`.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport<T> {
    pub items: Vec<T>,
    /// Files that were dropped from `items`.
    pub failures: Vec<ItemFailure>,
}

impl<T> Default for LoadReport<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            failures: Vec::new(),
        }
    }
}

impl<T> LoadReport<T> {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
