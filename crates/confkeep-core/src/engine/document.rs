//! Per-document runtime state.
//!
//! One [`DocumentState`] exists per resolved file path. It is created the
//! first time a document is accessed and then lives as long as the manager.
use std::cell::RefCell;
use std::mem;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

use crate::error::Error;
use crate::storage::{StorageProvider, StorageSystemError};
use crate::tree::{Format, Tree};

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) enum TransactionState {
    #[default]
    Idle,
    Pending { backup: Tree },
}

#[derive(Debug)]
pub struct DocumentState {
    name: String,
    path: PathBuf,
    format: Format,
    live: Tree,
    transaction: TransactionState,
    /// Text of the last successful load or write, used to skip no-op writes
    last_serialized: Option<String>,
    loaded: bool,
}

impl DocumentState {
    pub(crate) fn new(name: impl Into<String>, path: PathBuf, format: Format) -> Self {
        Self {
            name: name.into(),
            path,
            format,
            live: Tree::new(),
            transaction: TransactionState::Idle,
            last_serialized: None,
            loaded: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn tree(&self) -> &Tree {
        &self.live
    }

    pub(crate) fn tree_mut(&mut self) -> &mut Tree {
        &mut self.live
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.transaction, TransactionState::Pending { .. })
    }

    /// Read and parse the file. Missing, unreadable or malformed files all
    /// produce an empty tree.
    pub(crate) fn load(&mut self, provider: &dyn StorageProvider) {
        self.live = match provider.read_to_string(&self.path) {
            Ok(text) => match self.format.parse(&text) {
                Ok(tree) => {
                    debug!("Loaded document '{}' from {}", self.name, self.path.display());
                    tree
                }
                Err(err) => {
                    warn!(
                        "Document '{}' at {} is malformed, starting from an empty tree: {}",
                        self.name,
                        self.path.display(),
                        err
                    );
                    Tree::new()
                }
            },
            Err(Error::StorageSystem(StorageSystemError::FileNotFound(_))) => {
                debug!("Document '{}' has no file at {} yet", self.name, self.path.display());
                Tree::new()
            }
            Err(err) => {
                warn!("Could not read document '{}': {}", self.name, err);
                Tree::new()
            }
        };
        // A file is only rewritten once its content actually changes
        self.last_serialized = self.format.serialize(&self.live).ok();
        self.loaded = true;
    }

    /// Serialize the live tree and write it if it changed since the last
    /// write, or unconditionally when `force` is set. Failures are logged.
    pub(crate) fn write_back(&mut self, provider: &dyn StorageProvider, force: bool) -> bool {
        let text = match self.format.serialize(&self.live) {
            Ok(text) => text,
            Err(err) => {
                warn!("Could not serialize document '{}': {}", self.name, err);
                return false;
            }
        };
        if !force && self.last_serialized.as_deref() == Some(text.as_str()) {
            return false;
        }
        match provider.write_string(&self.path, &text) {
            Ok(()) => {
                debug!("Wrote document '{}' to {}", self.name, self.path.display());
                self.last_serialized = Some(text);
                true
            }
            Err(err) => {
                warn!("Could not write document '{}': {}", self.name, err);
                false
            }
        }
    }

    /// Snapshot the live tree. Returns false if a transaction is already open.
    pub(crate) fn begin_transaction(&mut self) -> bool {
        if self.is_pending() {
            return false;
        }
        self.transaction = TransactionState::Pending { backup: self.live.clone() };
        true
    }

    /// Drop the snapshot. Returns false if no transaction was open.
    pub(crate) fn end_transaction(&mut self) -> bool {
        let previous = mem::take(&mut self.transaction);
        matches!(previous, TransactionState::Pending { .. })
    }

    /// Restore the snapshot. Returns false if no transaction was open.
    pub(crate) fn rollback_transaction(&mut self) -> bool {
        match mem::take(&mut self.transaction) {
            TransactionState::Pending { backup } => {
                self.live = backup;
                true
            }
            TransactionState::Idle => false,
        }
    }

    /// Forget everything loaded so the next access reads the file again
    pub(crate) fn discard(&mut self) {
        self.live = Tree::new();
        self.transaction = TransactionState::Idle;
        self.last_serialized = None;
        self.loaded = false;
    }
}

/// A document state behind its re-entrant lock.
///
/// The lock serializes threads; the `RefCell` inside hands out short-lived
/// borrows to the thread holding it, which may nest acquisitions.
#[derive(Debug)]
pub(crate) struct DocumentCell {
    state: ReentrantMutex<RefCell<DocumentState>>,
}

impl DocumentCell {
    pub(crate) fn new(state: DocumentState) -> Self {
        Self { state: ReentrantMutex::new(RefCell::new(state)) }
    }

    pub(crate) fn lock(&self) -> ReentrantMutexGuard<'_, RefCell<DocumentState>> {
        self.state.lock()
    }
}
