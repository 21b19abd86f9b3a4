//! Scoped access to a document's live tree.
//!
//! Acquiring a [`TreeGuard`] locks the document (blocking), loading and
//! migrating it on first use. Dropping a write guard persists the tree unless
//! a transaction is pending; read guards never touch the file.
use std::cell::{Ref, RefCell, RefMut};
use std::path::PathBuf;
use std::thread;

use log::warn;
use parking_lot::ReentrantMutexGuard;

use super::document::{DocumentCell, DocumentState};
use super::migration::{self, LoadSpec};
use crate::storage::StorageProvider;
use crate::tree::{Format, Tree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    Write,
}

pub struct TreeGuard<'a> {
    state: ReentrantMutexGuard<'a, RefCell<DocumentState>>,
    provider: &'a dyn StorageProvider,
    mode: AccessMode,
}

impl<'a> TreeGuard<'a> {
    pub(crate) fn acquire(
        cell: &'a DocumentCell,
        provider: &'a dyn StorageProvider,
        mode: AccessMode,
        spec: &LoadSpec,
    ) -> Self {
        let guard = Self { state: cell.lock(), provider, mode };
        let loaded = guard.state.borrow().is_loaded();
        if !loaded {
            guard.state.borrow_mut().load(provider);
            // Nested acquisitions from the hook see the document as loaded
            migration::run(&guard, spec);
        }
        guard
    }

    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    pub fn format(&self) -> Format {
        self.state.borrow().format()
    }

    pub fn path(&self) -> PathBuf {
        self.state.borrow().path().to_path_buf()
    }

    pub fn is_pending(&self) -> bool {
        self.state.borrow().is_pending()
    }

    /// Borrow the live tree. Release it before re-entering the engine.
    pub fn tree(&self) -> Ref<'_, Tree> {
        Ref::map(self.state.borrow(), DocumentState::tree)
    }

    /// Mutably borrow the live tree. Only write guards persist the changes.
    pub fn tree_mut(&self) -> RefMut<'_, Tree> {
        RefMut::map(self.state.borrow_mut(), DocumentState::tree_mut)
    }

    pub(crate) fn state_mut(&self) -> RefMut<'_, DocumentState> {
        self.state.borrow_mut()
    }

    /// Write the live tree now
    pub(crate) fn flush(&self, force: bool) -> bool {
        self.state.borrow_mut().write_back(self.provider, force)
    }

    /// Throw the cached state away and load the file again
    pub(crate) fn reload(&self, spec: &LoadSpec) {
        {
            let mut state = self.state.borrow_mut();
            state.discard();
            state.load(self.provider);
        }
        migration::run(self, spec);
    }
}

impl Drop for TreeGuard<'_> {
    fn drop(&mut self) {
        if self.mode != AccessMode::Write || thread::panicking() {
            return;
        }
        match self.state.try_borrow_mut() {
            Ok(mut state) => {
                if !state.is_pending() {
                    state.write_back(self.provider, false);
                }
            }
            Err(_) => warn!("Document tree still borrowed when releasing write access, skipping write-back"),
        }
    }
}
