//! File access capability and its local-disk implementation.

use std::ffi::OsStr;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::FsError;

/// Raw file operations the store needs.
///
/// Implementations must make `write_bytes` atomic from a reader's point of
/// view: either the old content or the new content is observed, never a mix.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Arc<dyn FileAccess>`.
pub trait FileAccess: Send + Sync {
    /// Read the whole file at `path`.
    ///
    /// # Returns
    ///
    /// * `Ok(bytes)` - The file contents.
    /// * `Err(FsError::NotFound)` - There is no file at `path`.
    /// * `Err(_)` - Any other failure.
    fn read_bytes(&self, path: &Path) -> Result<Bytes, FsError>;

    /// Replace the file at `path` with `bytes`. The parent directory must exist.
    fn write_bytes(&self, bytes: &[u8], path: &Path) -> Result<(), FsError>;

    /// Remove a file, or a directory together with its contents.
    fn delete(&self, path: &Path) -> Result<(), FsError>;

    /// List the regular, non-hidden files directly inside `dir`.
    ///
    /// Subdirectories are skipped, and so is anything whose name starts with
    /// a dot. A missing `dir` is `FsError::NotFound`.
    fn list_immediate_children(&self, dir: &Path) -> Result<Vec<PathBuf>, FsError>;

    /// Create `path` and any missing parents. Existing directories are fine.
    fn create_dir_all(&self, path: &Path) -> Result<(), FsError>;

    /// Copy a file, or a directory tree, from `from` to `to`.
    ///
    /// The parent of `to` must already exist and `to` itself must not.
    fn copy(&self, from: &Path, to: &Path, is_directory: bool) -> Result<(), FsError>;
}

/// `FileAccess` backed by `std::fs`.
///
/// Writes go to a hidden temporary sibling which is synced and then renamed
/// over the target, so the rename is the only visible step.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileAccess;

fn is_hidden(name: &OsStr) -> bool {
    name.to_str().is_some_and(|s| s.starts_with('.'))
}

impl FileAccess for LocalFileAccess {
    fn read_bytes(&self, path: &Path) -> Result<Bytes, FsError> {
        log::debug!("Reading {}...", path.display());
        let data = fs::read(path).map_err(|e| FsError::from_io(path, e))?;
        Ok(Bytes::from(data))
    }

    fn write_bytes(&self, bytes: &[u8], path: &Path) -> Result<(), FsError> {
        log::debug!("Writing {}...", path.display());

        let io_error = |source: io::Error| FsError::Io {
            path: path.to_path_buf(),
            source,
        };

        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        // The temporary file deletes itself on drop, so every early return
        // below cleans up after itself.
        let mut staged = tempfile::Builder::new()
            .prefix(".statevault-")
            .suffix(".tmp")
            .tempfile_in(parent)
            .map_err(io_error)?;
        staged.write_all(bytes).map_err(io_error)?;
        staged.as_file().sync_all().map_err(io_error)?;
        staged.persist(path).map_err(|e| io_error(e.error))?;

        Ok(())
    }

    fn delete(&self, path: &Path) -> Result<(), FsError> {
        log::debug!("Deleting {}...", path.display());
        let attr = fs::symlink_metadata(path).map_err(|e| FsError::from_io(path, e))?;
        if attr.is_dir() {
            fs::remove_dir_all(path).map_err(|e| FsError::from_io(path, e))
        } else {
            fs::remove_file(path).map_err(|e| FsError::from_io(path, e))
        }
    }

    fn list_immediate_children(&self, dir: &Path) -> Result<Vec<PathBuf>, FsError> {
        log::debug!("Listing {}...", dir.display());

        // walkdir reports a plain file as its own root without children.
        let attr = fs::metadata(dir).map_err(|e| FsError::from_io(dir, e))?;
        if !attr.is_dir() {
            return Err(FsError::Io {
                path: dir.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
            });
        }

        let mut children = Vec::new();
        for entry in walkdir::WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                // Depth zero is the directory itself: not being able to open
                // it fails the whole listing.
                Err(error) if error.depth() == 0 => {
                    let io_error = error
                        .into_io_error()
                        .unwrap_or_else(|| io::Error::other("directory walk failed"));
                    return Err(FsError::from_io(dir, io_error));
                }
                Err(error) => {
                    log::warn!(
                        "Skipping unreadable entry in {}: {}",
                        dir.display(),
                        error
                    );
                    continue;
                }
            };

            if is_hidden(entry.file_name()) || !entry.file_type().is_file() {
                continue;
            }
            children.push(entry.into_path());
        }

        Ok(children)
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), FsError> {
        fs::create_dir_all(path).map_err(|source| FsError::CreateDirectory {
            path: path.to_path_buf(),
            source,
        })
    }

    fn copy(&self, from: &Path, to: &Path, is_directory: bool) -> Result<(), FsError> {
        log::debug!("Copying {} to {}...", from.display(), to.display());

        if fs::symlink_metadata(to).is_ok() {
            return Err(FsError::Io {
                path: to.to_path_buf(),
                source: io::Error::new(io::ErrorKind::AlreadyExists, "destination already exists"),
            });
        }

        if !is_directory {
            fs::copy(from, to).map_err(|e| FsError::from_io(from, e))?;
            return Ok(());
        }

        for entry in walkdir::WalkDir::new(from).sort_by_file_name() {
            let entry = entry.map_err(|error| {
                let path = error.path().unwrap_or(from).to_path_buf();
                let io_error = error
                    .into_io_error()
                    .unwrap_or_else(|| io::Error::other("directory walk failed"));
                FsError::from_io(path, io_error)
            })?;

            let relative = entry
                .path()
                .strip_prefix(from)
                .map_err(|e| FsError::Io {
                    path: entry.path().to_path_buf(),
                    source: io::Error::other(e),
                })?;
            let target = to.join(relative);

            if entry.file_type().is_dir() {
                // The top-level directory must not create missing parents.
                let created = if relative.as_os_str().is_empty() {
                    fs::create_dir(&target)
                } else {
                    fs::create_dir_all(&target)
                };
                created.map_err(|source| FsError::CreateDirectory {
                    path: target.clone(),
                    source,
                })?;
            } else {
                fs::copy(entry.path(), &target).map_err(|e| FsError::from_io(entry.path(), e))?;
            }
        }

        Ok(())
    }
}
