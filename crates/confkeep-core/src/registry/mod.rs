//! Document and value registries.
//!
//! Both tables are filled once at startup and read on every access. Names
//! are matched exactly; listing follows registration order.
pub mod descriptor;
pub mod error;

pub use descriptor::{DocumentDescriptor, MigrationHook, ValueDescriptor, ValueKind};
pub use error::RegistryError;

use std::collections::HashMap;
use std::fmt;

#[derive(Default)]
pub struct Registry {
    documents: Vec<DocumentDescriptor>,
    values: Vec<ValueDescriptor>,
    document_index: HashMap<String, usize>,
    value_index: HashMap<(String, String), usize>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("documents", &self.list_documents())
            .field("values", &self.values.len())
            .finish()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_document(&mut self, descriptor: DocumentDescriptor) -> Result<(), RegistryError> {
        if self.document_index.contains_key(descriptor.name()) {
            return Err(RegistryError::DuplicateDocument {
                document: descriptor.name().to_string(),
            });
        }
        self.document_index.insert(descriptor.name().to_string(), self.documents.len());
        self.documents.push(descriptor);
        Ok(())
    }

    /// Register a value. `version_key` is the currently reserved key name.
    pub fn register_value(&mut self, descriptor: ValueDescriptor, version_key: &str) -> Result<(), RegistryError> {
        let document = descriptor.document().to_string();
        let value = descriptor.name().to_string();

        if !self.document_index.contains_key(&document) {
            return Err(RegistryError::UnknownDocument { document });
        }
        if descriptor.key_path().is_empty() {
            return Err(RegistryError::EmptyKeyPath { document, value });
        }
        if descriptor.key_path() == version_key {
            return Err(RegistryError::ReservedKey { document, value, key: version_key.to_string() });
        }

        let index_key = (document, value);
        if self.value_index.contains_key(&index_key) {
            let (document, value) = index_key;
            return Err(RegistryError::DuplicateValue { document, value });
        }
        self.value_index.insert(index_key, self.values.len());
        self.values.push(descriptor);
        Ok(())
    }

    pub fn lookup_document(&self, name: &str) -> Option<&DocumentDescriptor> {
        self.document_index.get(name).map(|&index| &self.documents[index])
    }

    pub fn lookup_value(&self, document: &str, name: &str) -> Option<&ValueDescriptor> {
        self.value_index
            .get(&(document.to_string(), name.to_string()))
            .map(|&index| &self.values[index])
    }

    pub fn list_documents(&self) -> Vec<String> {
        self.documents.iter().map(|d| d.name().to_string()).collect()
    }

    pub fn list_values(&self, document: &str) -> Vec<String> {
        self.values_of(document).map(|v| v.name().to_string()).collect()
    }

    pub fn values_of<'a>(&'a self, document: &'a str) -> impl Iterator<Item = &'a ValueDescriptor> + 'a {
        self.values.iter().filter(move |v| v.document() == document)
    }
}
