use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use crate::error::{Error, Result};
use crate::storage::error::StorageSystemError;
use crate::storage::provider::StorageProvider;

/// Settings files on the local filesystem
///
/// Relative document paths are resolved against `base_path`; absolute paths
/// are used as-is (`Path::join` replaces the base with an absolute argument).
#[derive(Clone)]
pub struct LocalStorageProvider {
    base_path: PathBuf,
}

impl LocalStorageProvider {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        self.base_path.join(path)
    }

    /// Create the parent directory of `full_path` if missing and return it
    fn prepare_parent(full_path: &Path) -> Result<PathBuf> {
        let parent = full_path.parent().ok_or_else(|| StorageSystemError::InvalidPath {
            path: full_path.to_path_buf(),
            reason: "a settings file needs a parent directory".to_string(),
        })?;
        if parent.as_os_str().is_empty() {
            return Ok(PathBuf::from("."));
        }
        if !parent.is_dir() {
            fs::create_dir_all(parent).map_err(|e| Error::io(e, "create directory", parent.to_path_buf()))?;
        }
        Ok(parent.to_path_buf())
    }
}

impl StorageProvider for LocalStorageProvider {
    fn name(&self) -> &str {
        "local"
    }

    fn exists(&self, path: &Path) -> bool {
        self.resolve_path(path).exists()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        let full_path = self.resolve_path(path);
        if !full_path.is_file() {
            return Err(StorageSystemError::FileNotFound(full_path).into());
        }
        fs::read_to_string(&full_path).map_err(|e| Error::io(e, "read", full_path))
    }

    fn write_string(&self, path: &Path, contents: &str) -> Result<()> {
        let full_path = self.resolve_path(path);
        let parent = Self::prepare_parent(&full_path)?;

        // Stage the document next to its target, then move it into place
        let mut staged = NamedTempFile::new_in(&parent)
            .map_err(|e| Error::io(e, "create staging file in", parent.clone()))?;
        staged
            .write_all(contents.as_bytes())
            .map_err(|e| Error::io(e, "write staging file", staged.path().to_path_buf()))?;
        staged
            .persist(&full_path)
            .map_err(|e| Error::io(e.error, "replace", full_path.clone()))?;
        Ok(())
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        let source = self.resolve_path(from);
        let target = self.resolve_path(to);
        if !source.is_file() {
            return Err(StorageSystemError::FileNotFound(source).into());
        }
        Self::prepare_parent(&target)?;
        fs::copy(&source, &target)
            .map(|_| ())
            .map_err(|e| Error::io(e, "copy", source))
    }

    fn full_path(&self, path: &Path) -> PathBuf {
        self.resolve_path(path)
    }
}

impl fmt::Debug for LocalStorageProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalStorageProvider")
            .field("base_path", &self.base_path)
            .finish()
    }
}
