//! Value codec: typed values to and from document subtrees.
//!
//! Scalars map to a node's text. Lists and maps map to the children of the
//! node at the value's key path, with per-format child keys:
//!
//! | format | list item key        | map entry key |
//! |--------|----------------------|---------------|
//! | XML    | configurable tag     | entry key     |
//! | JSON   | `""` (array item)    | entry key     |
//! | INI    | item index           | entry key     |
mod value;

pub use value::SettingValue;

use std::collections::BTreeMap;

use log::debug;

use crate::tree::{Format, Tree};

/// Default XML tag used for list items
pub const DEFAULT_XML_LIST_ELEMENT: &str = "value";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Codec {
    format: Format,
    xml_list_element: String,
}

impl Codec {
    pub fn new(format: Format, xml_list_element: impl Into<String>) -> Self {
        Self { format, xml_list_element: xml_list_element.into() }
    }

    pub fn format(&self) -> Format {
        self.format
    }

    fn list_item_key(&self, index: usize) -> String {
        match self.format {
            Format::Xml => self.xml_list_element.clone(),
            Format::Json => String::new(),
            Format::Ini => index.to_string(),
        }
    }

    pub fn read_scalar<T: SettingValue>(&self, tree: &Tree, key_path: &str) -> Option<T> {
        let node = tree.get(key_path)?;
        let value = T::decode(node.data());
        if value.is_none() {
            debug!("Value at '{}' is not a valid {}: {:?}", key_path, T::type_name(), node.data());
        }
        value
    }

    pub fn write_scalar<T: SettingValue>(&self, tree: &mut Tree, key_path: &str, value: &T) {
        tree.put_value(key_path, value.encode());
    }

    pub fn encode_scalar<T: SettingValue>(&self, value: &T) -> Tree {
        Tree::with_data(value.encode())
    }

    pub fn read_list<T: SettingValue>(&self, tree: &Tree, key_path: &str) -> Option<Vec<T>> {
        let node = tree.get(key_path)?;
        Some(
            node.value_children()
                .filter_map(|(_, item)| T::decode(item.data()))
                .collect(),
        )
    }

    pub fn encode_list<T: SettingValue>(&self, values: &[T]) -> Tree {
        let mut node = Tree::new();
        for (index, value) in values.iter().enumerate() {
            node.push_child(self.list_item_key(index), Tree::with_data(value.encode()));
        }
        node
    }

    pub fn write_list<T: SettingValue>(&self, tree: &mut Tree, key_path: &str, values: &[T]) {
        tree.put(key_path, self.encode_list(values));
    }

    /// Append one item without rewriting the existing ones
    pub fn add_to_list<T: SettingValue>(&self, tree: &mut Tree, key_path: &str, value: &T) {
        let node = tree.get_or_create(key_path);
        let key = self.list_item_key(node.value_children().count());
        node.push_child(key, Tree::with_data(value.encode()));
    }

    pub fn read_map<T: SettingValue>(&self, tree: &Tree, key_path: &str) -> Option<BTreeMap<String, T>> {
        let node = tree.get(key_path)?;
        Some(
            node.value_children()
                .filter_map(|(key, item)| T::decode(item.data()).map(|value| (key.to_string(), value)))
                .collect(),
        )
    }

    pub fn encode_map<T: SettingValue>(&self, entries: &BTreeMap<String, T>) -> Tree {
        let mut node = Tree::new();
        for (key, value) in entries {
            node.push_child(key.clone(), Tree::with_data(value.encode()));
        }
        node
    }

    pub fn write_map<T: SettingValue>(&self, tree: &mut Tree, key_path: &str, entries: &BTreeMap<String, T>) {
        tree.put(key_path, self.encode_map(entries));
    }

    /// Create or replace one entry, leaving its siblings untouched
    pub fn set_map_entry<T: SettingValue>(&self, tree: &mut Tree, key_path: &str, entry: &str, value: &T) {
        let node = tree.get_or_create(key_path);
        match node.child_mut(entry) {
            Some(existing) => *existing = Tree::with_data(value.encode()),
            None => {
                node.push_child(entry, Tree::with_data(value.encode()));
            }
        }
    }
}
