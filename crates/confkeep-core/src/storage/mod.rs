//! Byte-level storage used by the settings engine.
//!
//! The engine never touches `std::fs` directly; every load, write-back,
//! backup and restore goes through a [`StorageProvider`].
pub mod error;
pub mod provider;
pub mod local;

pub use error::StorageSystemError;
pub use provider::StorageProvider;
pub use local::LocalStorageProvider;
