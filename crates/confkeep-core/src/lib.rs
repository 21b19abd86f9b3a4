//! # Confkeep Core
//!
//! Typed, cached, transactional access to settings stored in XML, JSON or
//! INI documents.
//!
//! Callers register documents and the named values inside them on a
//! [`SettingsManager`], then read and write through the returned typed
//! handles. Each document is parsed once, guarded by a re-entrant lock,
//! written back after every change unless a transaction is pending, and
//! checked against its declared schema version on first load.
//!
//! ```no_run
//! use std::sync::Arc;
//! use confkeep_core::{DocumentDescriptor, Format, LocalStorageProvider, Setting, SettingsManager};
//!
//! # fn main() -> confkeep_core::Result<()> {
//! let provider = Arc::new(LocalStorageProvider::new("/etc/myapp".into()));
//! let manager = SettingsManager::new(provider);
//! manager.register_document(DocumentDescriptor::new("Machine", Format::Xml, "machine.xml"))?;
//! let speed = manager.register_scalar("Machine", "Speed", "machine.speed", 1.0f64)?;
//!
//! speed.write(&manager, &2.5);
//! assert_eq!(speed.read(&manager), 2.5);
//! # Ok(())
//! # }
//! ```
pub mod codec;
pub mod engine;
pub mod error;
pub mod handle;
pub mod registry;
pub mod storage;
pub mod tree;

pub use codec::{Codec, SettingValue};
pub use engine::{AccessMode, DefaultMode, SettingsManager, SettingsOptions, TreeGuard};
pub use error::{Error, Result};
pub use handle::{ListSetting, MapSetting, ScalarSetting, Setting, SettingsDocument};
pub use registry::{DocumentDescriptor, MigrationHook, RegistryError, ValueDescriptor, ValueKind};
pub use storage::{LocalStorageProvider, StorageProvider, StorageSystemError};
pub use tree::{Format, Tree, TreeError};
