use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::codec::DEFAULT_XML_LIST_ELEMENT;
use crate::error::Result;
use crate::storage::{StorageProvider, StorageSystemError};

/// Name of the reserved top-level key holding a document's schema version
pub const DEFAULT_VERSION_KEY: &str = "version";

/// How a value is considered to be at its default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultMode {
    /// A value is at its default while its key path is absent from the file.
    /// Resetting erases the key path.
    #[default]
    DefaultValueIfAbsentFromFile,
    /// A value is at its default while the stored value equals the declared
    /// one. Resetting writes the declared default into the file.
    DefaultValueWrittenInFile,
}

/// Process-wide settings engine options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsOptions {
    pub version_key: String,
    pub xml_list_element: String,
    pub default_mode: DefaultMode,
}

impl Default for SettingsOptions {
    fn default() -> Self {
        Self {
            version_key: DEFAULT_VERSION_KEY.to_string(),
            xml_list_element: DEFAULT_XML_LIST_ELEMENT.to_string(),
            default_mode: DefaultMode::default(),
        }
    }
}

impl SettingsOptions {
    /// Parse options from JSON. Missing fields keep their defaults.
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| {
            StorageSystemError::DeserializationError {
                format: "JSON".to_string(),
                source: Box::new(e),
            }
            .into()
        })
    }

    /// Load options from a JSON file through `provider`
    pub fn load(provider: &dyn StorageProvider, path: &Path) -> Result<Self> {
        let text = provider.read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
