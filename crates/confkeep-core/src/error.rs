//! # Confkeep Errors
//!
//! Defines the crate-wide [`Error`] type.
//!
//! Each subsystem owns a typed error enum ([`StorageSystemError`],
//! [`TreeError`], [`RegistryError`]); [`Error`] wraps them so callers can
//! use `?` across subsystem boundaries. Only registration and explicit file
//! operations (backup/restore, options loading) surface errors to callers;
//! value reads and writes absorb failures and fall back to defaults.
use std::path::PathBuf;
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::registry::error::RegistryError;
use crate::storage::error::StorageSystemError;
use crate::tree::error::TreeError;

#[derive(Debug, ThisError)]
pub enum Error {
    /// Typed storage system error
    #[error("Storage system error: {0}")]
    StorageSystem(#[from] StorageSystemError),

    /// Document tree parse/serialize error
    #[error("Document tree error: {0}")]
    Tree(#[from] TreeError),

    /// Document or value registration error
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

// Helper to create I/O errors with context
impl Error {
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        Error::StorageSystem(StorageSystemError::Io {
            source,
            operation: operation.into(),
            path,
        })
    }
}
