//! # Confkeep Storage Errors
//!
//! [`StorageSystemError`] reports failures while moving document bytes
//! between the engine and a [`StorageProvider`](super::StorageProvider), and
//! while decoding auxiliary files such as engine options. Document load and
//! write-back failures are logged by the engine instead of being returned.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageSystemError {
    #[error("Failed to {operation} '{}': {source}", path.display())]
    Io {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No settings file at '{}'", .0.display())]
    FileNotFound(PathBuf),

    #[error("Could not encode {format} output: {source}")]
    SerializationError {
        format: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("Could not decode {format} input: {source}")]
    DeserializationError {
        format: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("Unsupported settings format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid settings path '{}': {reason}", path.display())]
    InvalidPath { path: PathBuf, reason: String },
}
