//! The settings engine.
//!
//! [`SettingsManager`] is the context object callers construct once and
//! share. Each registered document gets a lazily created [`DocumentState`]
//! behind a re-entrant lock; all access goes through a scoped [`TreeGuard`]
//! that loads, migrates and persists the document as needed.
pub mod document;
pub mod guard;
mod link;
pub mod manager;
pub mod migration;
pub mod options;
mod transaction;

pub use document::DocumentState;
pub use guard::{AccessMode, TreeGuard};
pub use manager::SettingsManager;
pub use options::{DefaultMode, SettingsOptions, DEFAULT_VERSION_KEY};

pub(crate) use link::LinkBinding;
