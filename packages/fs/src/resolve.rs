//! Logical name resolution against the reading and writing roots.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::{FileAccess, FsError};

/// What a resolved path is going to be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intention {
    /// Resolve against the reading root.
    Reading,
    /// Resolve against the writing root, creating directories as needed.
    Writing,
    /// Resolve against the writing root without creating anything. Used when
    /// the caller is about to place an entry there itself, e.g. by copying.
    WritingNoCreateFolder,
}

/// Maps logical names onto paths under one of two roots.
///
/// The roots may be the same directory. Keeping them apart lets a host read
/// state left behind by an older version while writing upgraded state
/// somewhere else, without ever touching the original.
#[derive(Clone)]
pub struct PathResolver {
    reading_root: PathBuf,
    writing_root: PathBuf,
    access: Arc<dyn FileAccess>,
}

impl std::fmt::Debug for PathResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathResolver")
            .field("reading_root", &self.reading_root)
            .field("writing_root", &self.writing_root)
            .finish_non_exhaustive()
    }
}

impl PathResolver {
    pub fn new(
        reading_root: impl Into<PathBuf>,
        writing_root: impl Into<PathBuf>,
        access: Arc<dyn FileAccess>,
    ) -> Self {
        Self {
            reading_root: reading_root.into(),
            writing_root: writing_root.into(),
            access,
        }
    }

    pub fn reading_root(&self) -> &Path {
        &self.reading_root
    }

    pub fn writing_root(&self) -> &Path {
        &self.writing_root
    }

    /// The root a given intention resolves against.
    pub fn root_for(&self, intention: Intention) -> &Path {
        match intention {
            Intention::Reading => &self.reading_root,
            Intention::Writing | Intention::WritingNoCreateFolder => &self.writing_root,
        }
    }

    /// Create both roots if they are missing.
    pub fn ensure_roots(&self) -> Result<(), FsError> {
        self.access.create_dir_all(&self.reading_root)?;
        if self.writing_root != self.reading_root {
            self.access.create_dir_all(&self.writing_root)?;
        }
        Ok(())
    }

    /// Resolve `name` for `intention`.
    ///
    /// `name` is split on `/` and appended component by component, so
    /// `"projects/a.json"` lands in the `projects` subdirectory of the root.
    /// Empty and `.` components are ignored; `..` and absolute prefixes are
    /// rejected so a name can never leave its root.
    ///
    /// A directory resolved for `Intention::Writing` exists on return.
    pub fn resolve(
        &self,
        name: &str,
        intention: Intention,
        is_directory: bool,
    ) -> Result<PathBuf, FsError> {
        let mut path = self.root_for(intention).to_path_buf();
        for component in name.split('/') {
            match Path::new(component).components().next() {
                None | Some(Component::CurDir) => continue,
                Some(Component::Normal(part)) if part == OsStr::new(component) => {
                    path.push(part);
                }
                _ => {
                    return Err(FsError::InvalidName {
                        name: name.to_string(),
                        message: format!("component {:?} escapes the store root", component),
                    });
                }
            }
        }

        if is_directory && intention == Intention::Writing {
            self.access.create_dir_all(&path)?;
        }

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LocalFileAccess;

    fn resolver(read: &Path, write: &Path) -> PathResolver {
        PathResolver::new(read, write, Arc::new(LocalFileAccess))
    }

    #[test]
    fn intentions_pick_roots() {
        let read = tempfile::tempdir().unwrap();
        let write = tempfile::tempdir().unwrap();
        let r = resolver(read.path(), write.path());

        assert_eq!(
            r.resolve("config.json", Intention::Reading, false).unwrap(),
            read.path().join("config.json")
        );
        assert_eq!(
            r.resolve("config.json", Intention::Writing, false).unwrap(),
            write.path().join("config.json")
        );
        assert_eq!(
            r.resolve("config.json", Intention::WritingNoCreateFolder, false)
                .unwrap(),
            write.path().join("config.json")
        );
    }

    #[test]
    fn only_writing_directories_are_created() {
        let read = tempfile::tempdir().unwrap();
        let write = tempfile::tempdir().unwrap();
        let r = resolver(read.path(), write.path());

        let reading = r.resolve("projects", Intention::Reading, true).unwrap();
        assert!(!reading.exists());

        let no_create = r
            .resolve("syncers", Intention::WritingNoCreateFolder, true)
            .unwrap();
        assert!(!no_create.exists());

        let file = r.resolve("tokens.json", Intention::Writing, false).unwrap();
        assert!(!file.exists());

        let writing = r.resolve("a/b/projects", Intention::Writing, true).unwrap();
        assert!(writing.is_dir());
        assert_eq!(writing, write.path().join("a").join("b").join("projects"));
    }

    #[test]
    fn parent_components_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let r = resolver(dir.path(), dir.path());

        for name in ["../outside", "a/../../b", "a/.."] {
            let result = r.resolve(name, Intention::Reading, false);
            assert!(matches!(result, Err(FsError::InvalidName { .. })), "{}", name);
        }
    }

    #[test]
    fn leading_slash_stays_under_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let r = resolver(dir.path(), dir.path());

        let path = r.resolve("/etc/passwd", Intention::Reading, false).unwrap();

        assert_eq!(path, dir.path().join("etc").join("passwd"));
    }

    #[test]
    fn ensure_roots_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let read = dir.path().join("v1");
        let write = dir.path().join("v2").join("state");
        let r = resolver(&read, &write);

        r.ensure_roots().unwrap();

        assert!(read.is_dir());
        assert!(write.is_dir());
    }

    #[test]
    fn ensure_roots_fails_when_root_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("occupied");
        std::fs::write(&file, b"x").unwrap();
        let r = resolver(&file, &file);

        assert!(matches!(
            r.ensure_roots(),
            Err(FsError::CreateDirectory { .. })
        ));
    }
}
