use thiserror::Error;

use super::format::Format;

/// Failures of the document backends.
///
/// The engine treats a parse failure as "start from an empty tree", so these
/// mostly surface through logging and the explicit `Format::parse` API.
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("Failed to parse {format} document: {message}")]
    Parse { format: Format, message: String },

    #[error("Failed to serialize {format} document: {message}")]
    Serialize { format: Format, message: String },
}

impl TreeError {
    pub(crate) fn parse(format: Format, message: impl ToString) -> Self {
        TreeError::Parse { format, message: message.to_string() }
    }

    pub(crate) fn serialize(format: Format, message: impl ToString) -> Self {
        TreeError::Serialize { format, message: message.to_string() }
    }
}
