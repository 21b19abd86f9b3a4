#![cfg(test)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tempfile::{tempdir, TempDir};

use crate::engine::SettingsManager;
use crate::error::Result;
use crate::registry::DocumentDescriptor;
use crate::storage::{LocalStorageProvider, StorageProvider};
use crate::tree::Format;

/// Local storage that counts file writes
#[derive(Debug)]
pub struct CountingProvider {
    inner: LocalStorageProvider,
    writes: AtomicUsize,
}

impl CountingProvider {
    pub fn new(base_path: PathBuf) -> Self {
        Self { inner: LocalStorageProvider::new(base_path), writes: AtomicUsize::new(0) }
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl StorageProvider for CountingProvider {
    fn name(&self) -> &str {
        "counting"
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.inner.read_to_string(path)
    }

    fn write_string(&self, path: &Path, contents: &str) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.write_string(path, contents)
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        self.inner.copy(from, to)
    }

    fn full_path(&self, path: &Path) -> PathBuf {
        self.inner.full_path(path)
    }
}

pub struct TestEnvironment {
    pub dir: TempDir,
    pub provider: Arc<CountingProvider>,
    pub manager: SettingsManager,
}

impl TestEnvironment {
    pub fn new() -> Self {
        let dir = tempdir().expect("Failed to create temp directory");
        let provider = Arc::new(CountingProvider::new(dir.path().to_path_buf()));
        let manager = SettingsManager::new(provider.clone());
        Self { dir, provider, manager }
    }

    /// A second manager over the same directory, as after a process restart
    pub fn restart(&self) -> SettingsManager {
        SettingsManager::new(Arc::new(LocalStorageProvider::new(self.dir.path().to_path_buf())))
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.file(name)).expect("Failed to read settings file")
    }

    pub fn write_file(&self, name: &str, contents: &str) {
        std::fs::write(self.file(name), contents).expect("Failed to write settings file");
    }
}

/// File name used for `format` in the helpers below
pub fn file_name(format: Format) -> String {
    format!("settings.{}", format.extension())
}

pub fn register_document(manager: &SettingsManager, format: Format) {
    manager
        .register_document(DocumentDescriptor::new("Settings", format, file_name(format)))
        .expect("Failed to register document");
}

pub const ALL_FORMATS: [Format; 3] = [Format::Xml, Format::Json, Format::Ini];
