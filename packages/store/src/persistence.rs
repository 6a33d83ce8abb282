//! The dual-root JSON persistence store.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value as JsonValue;
use statevault_codec::{CodecError, JsonCodec, JsonReadable, JsonWritable};
use statevault_fs::{FileAccess, FsError, Intention, LocalFileAccess, PathResolver};

use crate::diagnostics::{Diagnostic, Diagnostics, LogDiagnostics, Severity};
use crate::report::{ItemFailure, LoadReport, SaveReport};
use crate::{StoreConfig, StoreError};

const ITEM_EXTENSION: &str = "json";

/// Stores JSON documents and collections under a reading and a writing root.
///
/// - A *document* is one file at `<root>/<name>`.
/// - A *collection* is a folder `<root>/<name>/` holding one `<item>.json`
///   file per item.
///
/// Loads resolve against the reading root and saves/deletes against the
/// writing root. Nothing is cached: every call goes to disk.
///
/// Collection loads are partially tolerant. A file that cannot be read,
/// parsed or converted is reported to the `Diagnostics` sink and left out,
/// and the rest of the collection still loads.
///
/// # Example
///
/// ```rust
/// use statevault_store::{Persistence, StoreConfig};
/// use serde_json::json;
///
/// let dir = tempfile::tempdir().unwrap();
/// let store = Persistence::open(StoreConfig::shared(dir.path())).unwrap();
///
/// store.save_document("settings.json", &json!({"theme": "dark"})).unwrap();
/// let settings: Option<serde_json::Value> = store.load_document("settings.json").unwrap();
/// assert_eq!(settings, Some(json!({"theme": "dark"})));
/// ```
pub struct Persistence {
    resolver: PathResolver,
    access: Arc<dyn FileAccess>,
    diagnostics: Arc<dyn Diagnostics>,
    codec: JsonCodec,
}

impl std::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persistence")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

impl Persistence {
    /// Open a store on the local filesystem, logging absorbed failures
    /// through the `log` facade.
    pub fn open(config: StoreConfig) -> Result<Persistence, StoreError> {
        Self::new(config, Arc::new(LocalFileAccess), Arc::new(LogDiagnostics))
    }

    /// Build a store and create both roots if they are missing.
    pub fn new(
        config: StoreConfig,
        access: Arc<dyn FileAccess>,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Result<Persistence, StoreError> {
        let resolver = PathResolver::new(config.reading_root, config.writing_root, access.clone());
        resolver.ensure_roots().map_err(|error| {
            StoreError::setup("could not create the persistence roots", error)
        })?;

        Ok(Persistence {
            resolver,
            access,
            diagnostics,
            codec: JsonCodec,
        })
    }

    pub fn reading_root(&self) -> &Path {
        self.resolver.reading_root()
    }

    pub fn writing_root(&self) -> &Path {
        self.resolver.writing_root()
    }

    /// Resolve a logical name without performing any I/O beyond the
    /// directory creation `Intention::Writing` implies.
    pub fn resolve(
        &self,
        name: &str,
        intention: Intention,
        is_directory: bool,
    ) -> Result<PathBuf, StoreError> {
        self.resolver
            .resolve(name, intention, is_directory)
            .map_err(|error| StoreError::resolve(name, error))
    }

    fn report(&self, severity: Severity, operation: &'static str, path: &Path, message: String) {
        self.diagnostics.record(Diagnostic {
            severity,
            operation,
            path: path.to_path_buf(),
            message,
        });
    }

    fn write_json(&self, name: &str, value: &JsonValue, path: &Path) -> Result<(), StoreError> {
        let bytes = self
            .codec
            .encode(value)
            .map_err(|source| StoreError::Encode {
                name: name.to_string(),
                source,
            })?;
        self.access
            .write_bytes(&bytes, path)
            .map_err(|source| StoreError::Io {
                name: name.to_string(),
                source,
            })
    }

    /// Read and decode the document `name`, or `None` if there is no file.
    fn read_json(&self, name: &str) -> Result<Option<JsonValue>, StoreError> {
        let path = self.resolve(name, Intention::Reading, false)?;
        let bytes = match self.access.read_bytes(&path) {
            Ok(bytes) => bytes,
            Err(FsError::NotFound { .. }) => {
                log::debug!("No stored state at {}", path.display());
                return Ok(None);
            }
            Err(source) => {
                return Err(StoreError::Io {
                    name: name.to_string(),
                    source,
                })
            }
        };

        self.codec
            .decode(&bytes)
            .map(Some)
            .map_err(|source| StoreError::Parse {
                name: name.to_string(),
                source,
            })
    }

    // Documents

    /// Encode `value` and atomically replace the document `name` with it.
    pub fn save_document<T: JsonWritable + ?Sized>(
        &self,
        name: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        let path = self.resolve(name, Intention::Writing, false)?;
        let json = value.to_json().map_err(|source| StoreError::Encode {
            name: name.to_string(),
            source,
        })?;
        self.write_json(name, &json, &path)
    }

    /// Load the document `name`.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - No such document under the reading root.
    /// * `Ok(Some(value))` - The decoded and converted document.
    /// * `Err(StoreError::Parse)` - The file is not valid JSON or does not
    ///   convert into `T`.
    /// * `Err(StoreError::Io)` - The file exists but could not be read.
    pub fn load_document<T: JsonReadable>(&self, name: &str) -> Result<Option<T>, StoreError> {
        self.load_document_with(name, T::from_json)
    }

    /// Like `load_document`, with a caller-supplied conversion.
    pub fn load_document_with<T, F>(&self, name: &str, convert: F) -> Result<Option<T>, StoreError>
    where
        F: FnOnce(JsonValue) -> Result<T, CodecError>,
    {
        let Some(json) = self.read_json(name)? else {
            return Ok(None);
        };

        convert(json)
            .map(Some)
            .map_err(|source| StoreError::Parse {
                name: name.to_string(),
                source,
            })
    }

    /// Delete the document `name` from the writing root.
    ///
    /// Best-effort: failures, including a missing file, are recorded as
    /// diagnostics and never returned.
    pub fn delete_document(&self, name: &str) {
        self.delete_entry("delete_document", name, false);
    }

    // Array documents

    /// Save `items` as a single document holding a JSON array.
    pub fn save_array<T: JsonWritable>(&self, name: &str, items: &[T]) -> Result<(), StoreError> {
        let path = self.resolve(name, Intention::Writing, false)?;
        let values = items
            .iter()
            .map(|item| item.to_json())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| StoreError::Encode {
                name: name.to_string(),
                source,
            })?;
        self.write_json(name, &JsonValue::Array(values), &path)
    }

    /// Load an array document written by `save_array`.
    pub fn load_array<T: JsonReadable>(&self, name: &str) -> Result<Option<Vec<T>>, StoreError> {
        self.load_array_with(name, T::from_json)
    }

    /// Load an array document, converting each element with `convert`.
    ///
    /// Elements that fail to convert are dropped and summarized in a single
    /// diagnostic. A document that is not an array is a parse error.
    pub fn load_array_with<T, F>(
        &self,
        name: &str,
        mut convert: F,
    ) -> Result<Option<Vec<T>>, StoreError>
    where
        F: FnMut(JsonValue) -> Result<T, CodecError>,
    {
        let Some(json) = self.read_json(name)? else {
            return Ok(None);
        };

        let JsonValue::Array(elements) = json else {
            return Err(StoreError::Parse {
                name: name.to_string(),
                source: CodecError::convert("expected a JSON array"),
            });
        };

        let total = elements.len();
        let mut first_failure = None;
        let items: Vec<T> = elements
            .into_iter()
            .filter_map(|element| match convert(element) {
                Ok(item) => Some(item),
                Err(error) => {
                    first_failure.get_or_insert(error);
                    None
                }
            })
            .collect();

        if let Some(error) = first_failure {
            let path = self.resolve(name, Intention::Reading, false)?;
            self.report(
                Severity::Error,
                "load_array",
                &path,
                format!(
                    "{} of {} entries failed to parse and will be ignored (first: {})",
                    total - items.len(),
                    total,
                    error
                ),
            );
        }

        Ok(Some(items))
    }

    // Collections

    /// Write each item to `<folder>/<name_for_item(item)>.json` under the
    /// writing root, creating the folder if needed.
    ///
    /// Items are written independently: a failing item is recorded in the
    /// returned report and in the diagnostics, and the remaining items are
    /// still attempted. Only a folder that cannot be created fails the call.
    /// Two items with the same name overwrite each other; that is recorded
    /// as a `Severity::Notice`.
    pub fn save_collection<T, F>(
        &self,
        folder: &str,
        items: &[T],
        name_for_item: F,
    ) -> Result<SaveReport, StoreError>
    where
        T: JsonWritable,
        F: Fn(&T) -> String,
    {
        let folder_path = self.resolve(folder, Intention::Writing, true)?;
        let mut report = SaveReport::default();
        let mut seen = HashSet::new();

        for item in items {
            let item_name = name_for_item(item);
            let path = folder_path.join(format!("{}.{}", item_name, ITEM_EXTENSION));
            if !seen.insert(item_name.clone()) {
                self.report(
                    Severity::Notice,
                    "save_collection",
                    &path,
                    format!(
                        "item name {:?} repeats; the later item replaces the earlier one",
                        item_name
                    ),
                );
            }

            match self.save_item(folder, &item_name, item, &path) {
                Ok(()) => report.saved.push(path),
                Err(error) => {
                    let reason = error.to_string();
                    self.report(Severity::Error, "save_collection", &path, reason.clone());
                    report.failures.push(ItemFailure { path, reason });
                }
            }
        }

        Ok(report)
    }

    fn save_item<T: JsonWritable>(
        &self,
        folder: &str,
        item_name: &str,
        item: &T,
        path: &Path,
    ) -> Result<(), StoreError> {
        let name = format!("{}/{}", folder, item_name);
        if item_name.is_empty()
            || item_name.contains(|c: char| c == '/' || c == '\\')
            || item_name.starts_with('.')
        {
            return Err(StoreError::Io {
                name,
                source: FsError::InvalidName {
                    name: item_name.to_string(),
                    message: "item names must be non-empty, visible, single path components"
                        .to_string(),
                },
            });
        }

        let json = item.to_json().map_err(|source| StoreError::Encode {
            name: name.clone(),
            source,
        })?;
        self.write_json(&name, &json, path)
    }

    /// Load every item in `folder` under the reading root.
    ///
    /// A missing folder yields an empty `Vec`. Items that fail are dropped;
    /// see `load_collection_report` to inspect them.
    pub fn load_collection<T: JsonReadable>(&self, folder: &str) -> Result<Vec<T>, StoreError> {
        self.load_collection_with(folder, T::from_json)
    }

    /// Like `load_collection`, with a caller-supplied conversion.
    pub fn load_collection_with<T, F>(&self, folder: &str, convert: F) -> Result<Vec<T>, StoreError>
    where
        F: FnMut(JsonValue) -> Result<T, CodecError>,
    {
        Ok(self.load_collection_report(folder, convert)?.items)
    }

    /// Load every item in `folder`, returning the dropped files alongside
    /// the loaded items.
    ///
    /// Fails only when an existing folder cannot be listed.
    pub fn load_collection_report<T, F>(
        &self,
        folder: &str,
        mut convert: F,
    ) -> Result<LoadReport<T>, StoreError>
    where
        F: FnMut(JsonValue) -> Result<T, CodecError>,
    {
        let folder_path = self.resolve(folder, Intention::Reading, true)?;
        let children = match self.access.list_immediate_children(&folder_path) {
            Ok(children) => children,
            Err(FsError::NotFound { .. }) => {
                log::debug!("No stored collection at {}", folder_path.display());
                return Ok(LoadReport::default());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    name: folder.to_string(),
                    source,
                })
            }
        };

        let mut report = LoadReport::default();
        for path in children {
            let loaded = self
                .access
                .read_bytes(&path)
                .map_err(|e| e.to_string())
                .and_then(|bytes| self.codec.decode(&bytes).map_err(|e| e.to_string()))
                .and_then(|json| convert(json).map_err(|e| e.to_string()));

            match loaded {
                Ok(item) => report.items.push(item),
                Err(reason) => {
                    self.report(
                        Severity::Error,
                        "load_collection",
                        &path,
                        format!("couldn't parse {} item, it will be ignored: {}", folder, reason),
                    );
                    report.failures.push(ItemFailure { path, reason });
                }
            }
        }

        Ok(report)
    }

    /// Delete the collection `folder` and all of its items from the writing
    /// root. Best-effort, like `delete_document`.
    pub fn delete_collection(&self, folder: &str) {
        self.delete_entry("delete_collection", folder, true);
    }

    fn delete_entry(&self, operation: &'static str, name: &str, is_directory: bool) {
        // Deleting never creates, so the folder is not materialized first.
        let path = match self
            .resolver
            .resolve(name, Intention::WritingNoCreateFolder, is_directory)
        {
            Ok(path) => path,
            Err(error) => {
                let root = self.writing_root().to_path_buf();
                self.report(Severity::Error, operation, &root, error.to_string());
                return;
            }
        };

        match self.access.delete(&path) {
            Ok(()) => {}
            Err(FsError::NotFound { .. }) => {
                self.report(
                    Severity::Notice,
                    operation,
                    &path,
                    "nothing to delete".to_string(),
                );
            }
            Err(error) => {
                self.report(Severity::Error, operation, &path, error.to_string());
            }
        }
    }

    // Seeding

    /// Copy `name` verbatim from the reading root into the writing root.
    ///
    /// Used to seed a fresh writing root from an older one. The destination
    /// must not exist yet. Any failure leaves the store unusable for the
    /// caller's purposes and is reported as `StoreError::Setup`.
    pub fn copy_to_write_location(&self, name: &str, is_directory: bool) -> Result<(), StoreError> {
        let from = self.resolve(name, Intention::Reading, is_directory)?;
        let to = self.resolve(name, Intention::WritingNoCreateFolder, is_directory)?;

        self.access
            .copy(&from, &to, is_directory)
            .map_err(|error| {
                StoreError::setup(
                    format!("could not copy {} into the writing root", name),
                    error,
                )
            })
    }
}

#[cfg(test)]
mod persistence_tests {
    use super::*;
    use crate::diagnostics::MemoryDiagnostics;
    use serde_json::json;
    use std::fs;

    struct TestPersistence {
        // Keeps the directories alive until the test store is dropped.
        _dir: tempfile::TempDir,
        store: Persistence,
        diagnostics: Arc<MemoryDiagnostics>,
    }

    impl TestPersistence {
        fn new() -> TestPersistence {
            let dir = tempfile::tempdir().unwrap();
            let diagnostics = Arc::new(MemoryDiagnostics::new());
            let store = Persistence::new(
                StoreConfig::shared(dir.path().join("root")),
                Arc::new(LocalFileAccess),
                diagnostics.clone(),
            )
            .unwrap();
            TestPersistence {
                _dir: dir,
                store,
                diagnostics,
            }
        }
    }

    #[test]
    fn construction_creates_roots() {
        let dir = tempfile::tempdir().unwrap();
        let read = dir.path().join("read").join("nested");
        let write = dir.path().join("write");

        let store = Persistence::open(StoreConfig::split(&read, &write)).unwrap();

        assert!(read.is_dir());
        assert!(write.is_dir());
        assert_eq!(store.reading_root(), read.as_path());
        assert_eq!(store.writing_root(), write.as_path());
    }

    #[test]
    fn construction_fails_when_root_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let occupied = dir.path().join("occupied");
        fs::write(&occupied, b"x").unwrap();

        let result = Persistence::open(StoreConfig::shared(&occupied));

        assert!(matches!(result, Err(StoreError::Setup { .. })));
    }

    #[test]
    fn document_file_is_pretty_json() {
        let t = TestPersistence::new();
        t.store
            .save_document("config.json", &json!({"a": 1}))
            .unwrap();

        let text = fs::read_to_string(t.store.writing_root().join("config.json")).unwrap();
        assert_eq!(text, "{\n  \"a\": 1\n}");
    }

    #[test]
    fn corrupt_document_is_a_parse_error() {
        let t = TestPersistence::new();
        fs::write(t.store.reading_root().join("broken.json"), b"{\"a\": ").unwrap();

        let result = t.store.load_document::<JsonValue>("broken.json");

        assert!(matches!(
            result,
            Err(StoreError::Parse {
                source: CodecError::Decode(_),
                ..
            })
        ));
    }

    #[test]
    fn rejected_conversion_is_a_parse_error() {
        let t = TestPersistence::new();
        t.store.save_document("count", &json!("not a number")).unwrap();

        let result = t.store.load_document::<u32>("count");

        assert!(matches!(
            result,
            Err(StoreError::Parse {
                source: CodecError::Convert { .. },
                ..
            })
        ));
    }

    #[test]
    fn unreadable_document_is_an_io_error() {
        let t = TestPersistence::new();
        // A directory where a file is expected cannot be read as bytes.
        fs::create_dir(t.store.reading_root().join("actually_a_dir")).unwrap();

        let result = t.store.load_document::<JsonValue>("actually_a_dir");

        assert!(matches!(result, Err(StoreError::Io { .. })));
    }

    #[test]
    fn array_document_drops_bad_elements() {
        let t = TestPersistence::new();
        t.store
            .save_document("tokens.json", &json!([1, 2, "three", 4]))
            .unwrap();

        let loaded: Vec<u32> = t.store.load_array("tokens.json").unwrap().unwrap();

        assert_eq!(loaded, vec![1, 2, 4]);
        let entries = t.diagnostics.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].operation, "load_array");
        assert!(entries[0].message.starts_with("1 of 4 entries"));
    }

    #[test]
    fn array_document_roundtrip() {
        let t = TestPersistence::new();
        t.store
            .save_array("names.json", &["a".to_string(), "b".to_string()])
            .unwrap();

        let loaded: Option<Vec<String>> = t.store.load_array("names.json").unwrap();

        assert_eq!(loaded, Some(vec!["a".to_string(), "b".to_string()]));
        assert!(t.diagnostics.entries().is_empty());
        assert_eq!(t.store.load_array::<String>("absent.json").unwrap(), None);
    }

    #[test]
    fn non_array_document_is_a_parse_error() {
        let t = TestPersistence::new();
        t.store.save_document("tokens.json", &json!({"a": 1})).unwrap();

        assert!(matches!(
            t.store.load_array::<JsonValue>("tokens.json"),
            Err(StoreError::Parse { .. })
        ));
    }

    #[test]
    fn invalid_item_names_fail_individually() {
        let t = TestPersistence::new();
        let items = vec![json!({"id": "ok"}), json!({"id": "../escape"}), json!({"id": ""})];

        let report = t
            .store
            .save_collection("items", &items, |item| {
                item["id"].as_str().unwrap_or_default().to_string()
            })
            .unwrap();

        assert_eq!(report.saved.len(), 1);
        assert_eq!(report.failures.len(), 2);
        assert!(!report.is_complete());
        assert_eq!(t.diagnostics.count(Severity::Error), 2);
        assert!(t.store.writing_root().join("items").join("ok.json").is_file());
    }

    #[test]
    fn delete_collection_removes_folder() {
        let t = TestPersistence::new();
        t.store
            .save_collection("items", &[json!({"id": "a"})], |_| "a".to_string())
            .unwrap();

        t.store.delete_collection("items");

        assert!(!t.store.writing_root().join("items").exists());
        assert!(t.diagnostics.entries().is_empty());
    }

    #[test]
    fn delete_missing_collection_is_a_notice() {
        let t = TestPersistence::new();

        t.store.delete_collection("never_saved");

        assert!(!t.store.writing_root().join("never_saved").exists());
        assert_eq!(t.diagnostics.count(Severity::Notice), 1);
        assert_eq!(t.diagnostics.count(Severity::Error), 0);
    }

    #[test]
    fn delete_with_invalid_name_is_recorded() {
        let t = TestPersistence::new();

        t.store.delete_document("../outside");

        assert_eq!(t.diagnostics.count(Severity::Error), 1);
    }

    #[test]
    fn resolve_exposes_layout() {
        let t = TestPersistence::new();
        let path = t
            .store
            .resolve("projects", Intention::Writing, true)
            .unwrap();
        assert!(path.is_dir());
        assert_eq!(path, t.store.writing_root().join("projects"));
    }
}
