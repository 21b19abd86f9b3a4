use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::TreeError;
use super::{ini, json, xml, Tree};

/// Supported settings file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// XML (.xml): elements become children, lists use a repeated element tag
    Xml,
    /// JSON (.json): objects become keyed children, lists become arrays
    Json,
    /// INI (.ini): sections hold dotted keys, lists use indexed keys
    Ini,
}

impl Format {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Xml => "xml",
            Format::Json => "json",
            Format::Ini => "ini",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }

    /// Parse a document. Blank input is an empty tree.
    pub fn parse(&self, text: &str) -> Result<Tree, TreeError> {
        if text.trim().is_empty() {
            return Ok(Tree::new());
        }
        match self {
            Format::Xml => xml::parse(text),
            Format::Json => json::parse(text),
            Format::Ini => ini::parse(text),
        }
    }

    /// Serialize a document
    pub fn serialize(&self, tree: &Tree) -> Result<String, TreeError> {
        match self {
            Format::Xml => xml::serialize(tree),
            Format::Json => json::serialize(tree),
            Format::Ini => ini::serialize(tree),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Xml => "XML",
            Format::Json => "JSON",
            Format::Ini => "INI",
        };
        f.write_str(name)
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "xml" => Ok(Format::Xml),
            "json" => Ok(Format::Json),
            "ini" => Ok(Format::Ini),
            other => Err(format!("unknown settings format '{}'", other)),
        }
    }
}
