use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::tree::{Format, Tree};

/// Callback consulted when a stored schema version differs from the declared
/// one. Receives `(stored, declared)`; returning `true` writes the declared
/// version into the document immediately.
pub type MigrationHook = Arc<dyn Fn(u32, u32) -> bool + Send + Sync>;

/// Static description of a settings document
#[derive(Clone, Serialize)]
pub struct DocumentDescriptor {
    name: String,
    format: Format,
    path_template: String,
    schema_version: u32,
    #[serde(skip)]
    migration_hook: Option<MigrationHook>,
}

impl DocumentDescriptor {
    /// `path_template` may contain `@{placeholder}` tokens
    pub fn new(name: impl Into<String>, format: Format, path_template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            format,
            path_template: path_template.into(),
            schema_version: 0,
            migration_hook: None,
        }
    }

    pub fn with_schema_version(mut self, version: u32) -> Self {
        self.schema_version = version;
        self
    }

    pub fn with_migration_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(u32, u32) -> bool + Send + Sync + 'static,
    {
        self.migration_hook = Some(Arc::new(hook));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn path_template(&self) -> &str {
        &self.path_template
    }

    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    pub fn migration_hook(&self) -> Option<&MigrationHook> {
        self.migration_hook.as_ref()
    }
}

impl fmt::Debug for DocumentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentDescriptor")
            .field("name", &self.name)
            .field("format", &self.format)
            .field("path_template", &self.path_template)
            .field("schema_version", &self.schema_version)
            .field("has_migration_hook", &self.migration_hook.is_some())
            .finish()
    }
}

/// Shape of a stored value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Scalar,
    List,
    Map,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Scalar => "scalar",
            ValueKind::List => "list",
            ValueKind::Map => "map",
        };
        f.write_str(name)
    }
}

/// Static description of a named value inside a document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueDescriptor {
    name: String,
    kind: ValueKind,
    type_name: String,
    document: String,
    key_path: String,
    /// Declared default, encoded the way the owning document stores it
    #[serde(skip)]
    default: Tree,
}

impl ValueDescriptor {
    pub fn new(
        document: impl Into<String>,
        name: impl Into<String>,
        kind: ValueKind,
        type_name: impl Into<String>,
        key_path: impl Into<String>,
        default: Tree,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            type_name: type_name.into(),
            document: document.into(),
            key_path: key_path.into(),
            default,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn key_path(&self) -> &str {
        &self.key_path
    }

    pub fn default_tree(&self) -> &Tree {
        &self.default
    }
}
