//! JSON backend.
//!
//! Objects map to keyed children in file order, arrays to `""`-keyed
//! children. Scalars are stored as text; numbers and booleans keep their
//! literal spelling and are written back as JSON strings.
use serde_json::{Map, Value};

use super::error::TreeError;
use super::format::Format;
use super::Tree;

pub(crate) fn parse(text: &str) -> Result<Tree, TreeError> {
    let value: Value = serde_json::from_str(text).map_err(|e| TreeError::parse(Format::Json, e))?;
    Ok(from_value(value))
}

pub(crate) fn serialize(tree: &Tree) -> Result<String, TreeError> {
    let value = if tree.is_empty() {
        Value::Object(Map::new())
    } else {
        to_value(tree)
    };
    let mut text = serde_json::to_string_pretty(&value).map_err(|e| TreeError::serialize(Format::Json, e))?;
    text.push('\n');
    Ok(text)
}

fn from_value(value: Value) -> Tree {
    match value {
        Value::Object(map) => {
            let mut node = Tree::new();
            for (key, child) in map {
                node.push_child(key, from_value(child));
            }
            node
        }
        Value::Array(items) => {
            let mut node = Tree::new();
            for item in items {
                node.push_child("", from_value(item));
            }
            node
        }
        Value::String(s) => Tree::with_data(s),
        Value::Number(n) => Tree::with_data(n.to_string()),
        Value::Bool(b) => Tree::with_data(b.to_string()),
        Value::Null => Tree::new(),
    }
}

pub(crate) fn to_value(tree: &Tree) -> Value {
    if !tree.has_children() {
        return Value::String(tree.data().to_string());
    }
    if tree.children().all(|(key, _)| key.is_empty()) {
        return Value::Array(tree.children().map(|(_, child)| to_value(child)).collect());
    }
    // Repeated keys collapse onto the last occurrence
    let mut map = Map::new();
    for (key, child) in tree.children() {
        map.insert(key.to_string(), to_value(child));
    }
    Value::Object(map)
}
