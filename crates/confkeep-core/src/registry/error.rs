//! # Confkeep Registry Errors
//!
//! Registration failures are configuration mistakes made at startup. They
//! are returned to the caller, which is expected to abort.
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Document '{document}' is already registered")]
    DuplicateDocument { document: String },

    #[error("Value '{value}' is already registered in document '{document}'")]
    DuplicateValue { document: String, value: String },

    #[error("Value '{value}' in document '{document}' uses the reserved version key '{key}'")]
    ReservedKey { document: String, value: String, key: String },

    #[error("Value '{value}' in document '{document}' has an empty key path")]
    EmptyKeyPath { document: String, value: String },

    #[error("Document '{document}' is not registered")]
    UnknownDocument { document: String },
}
