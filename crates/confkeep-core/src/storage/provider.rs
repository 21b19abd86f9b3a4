use std::fmt::Debug;
use std::path::{Path, PathBuf};
use crate::error::Result;

/// Where settings documents and their backups are stored.
///
/// Paths handed to a provider are the resolved document paths; how they map
/// onto real locations is up to the provider.
pub trait StorageProvider: Send + Sync + Debug {
    /// Short name used in log messages
    fn name(&self) -> &str;

    fn exists(&self, path: &Path) -> bool;

    /// Whole file content. A missing file is
    /// [`StorageSystemError::FileNotFound`](super::StorageSystemError::FileNotFound).
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Replace the file content, creating parent directories as needed
    fn write_string(&self, path: &Path, contents: &str) -> Result<()>;

    /// Copy a file, creating the target's parent directories as needed
    fn copy(&self, from: &Path, to: &Path) -> Result<()>;

    /// Location `path` is stored at, for display
    fn full_path(&self, path: &Path) -> PathBuf;
}
