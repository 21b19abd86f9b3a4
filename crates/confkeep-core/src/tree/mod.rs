//! Format-neutral document tree.
//!
//! A [`Tree`] node carries a string `data` payload and an ordered list of
//! `(key, child)` pairs. Keys may repeat (XML siblings) and may be empty
//! (JSON array items). Paths are dot-separated sequences of keys; the empty
//! path addresses the node itself. Lookups follow the first child matching
//! each segment.
pub mod error;
pub mod format;
mod ini;
mod json;
mod xml;

pub use error::TreeError;
pub use format::Format;

/// Child key holding an XML element's attributes
pub const XML_ATTR_KEY: &str = "<xmlattr>";
/// Child key holding an XML comment
pub const XML_COMMENT_KEY: &str = "<xmlcomment>";

/// Returns true for keys that carry markup rather than values.
pub fn is_markup_key(key: &str) -> bool {
    key == XML_ATTR_KEY || key == XML_COMMENT_KEY
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('.').filter(|_| !path.is_empty())
}

fn split_last(path: &str) -> (&str, &str) {
    path.rsplit_once('.').unwrap_or(("", path))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    data: String,
    children: Vec<(String, Tree)>,
}

impl Tree {
    /// Create an empty node
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a leaf holding `data`
    pub fn with_data(data: impl Into<String>) -> Self {
        Self { data: data.into(), children: Vec::new() }
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn set_data(&mut self, data: impl Into<String>) {
        self.data = data.into();
    }

    /// No data and no children
    pub fn is_empty(&self) -> bool {
        self.data.is_empty() && self.children.is_empty()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Number of direct children
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Direct children in stored order
    pub fn children(&self) -> impl Iterator<Item = (&str, &Tree)> {
        self.children.iter().map(|(key, child)| (key.as_str(), child))
    }

    /// Direct children that hold values, skipping XML attributes and comments
    pub fn value_children(&self) -> impl Iterator<Item = (&str, &Tree)> {
        self.children().filter(|(key, _)| !is_markup_key(key))
    }

    /// First direct child named `key`
    pub fn child(&self, key: &str) -> Option<&Tree> {
        self.children.iter().find(|(k, _)| k == key).map(|(_, child)| child)
    }

    /// First direct child named `key`, mutably
    pub fn child_mut(&mut self, key: &str) -> Option<&mut Tree> {
        self.children.iter_mut().find(|(k, _)| k == key).map(|(_, child)| child)
    }

    /// Append a direct child, even if one with the same key exists
    pub fn push_child(&mut self, key: impl Into<String>, child: Tree) -> &mut Tree {
        self.children.push((key.into(), child));
        let last = self.children.len() - 1;
        &mut self.children[last].1
    }

    /// First direct child named `key`, appended empty if missing
    pub(crate) fn child_or_insert(&mut self, key: &str) -> &mut Tree {
        match self.children.iter().position(|(k, _)| k == key) {
            Some(index) => &mut self.children[index].1,
            None => self.push_child(key, Tree::new()),
        }
    }

    /// Subtree at `path`
    pub fn get(&self, path: &str) -> Option<&Tree> {
        let mut node = self;
        for segment in segments(path) {
            node = node.child(segment)?;
        }
        Some(node)
    }

    /// Subtree at `path`, mutably
    pub fn get_mut(&mut self, path: &str) -> Option<&mut Tree> {
        let mut node = self;
        for segment in segments(path) {
            node = node.child_mut(segment)?;
        }
        Some(node)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Subtree at `path`, creating empty nodes along the way
    pub fn get_or_create(&mut self, path: &str) -> &mut Tree {
        let mut node = self;
        for segment in segments(path) {
            node = node.child_or_insert(segment);
        }
        node
    }

    /// Replace the subtree at `path`, or create it
    pub fn put(&mut self, path: &str, subtree: Tree) -> &mut Tree {
        if path.is_empty() {
            *self = subtree;
            return self;
        }
        let (parent, last) = split_last(path);
        let node = self.get_or_create(parent).child_or_insert(last);
        *node = subtree;
        node
    }

    /// Overwrite the data at `path` in place, creating the node if needed
    pub fn put_value(&mut self, path: &str, value: impl Into<String>) {
        self.get_or_create(path).set_data(value);
    }

    /// Append `subtree` under `path`, keeping any existing sibling with the same key
    pub fn add(&mut self, path: &str, subtree: Tree) -> &mut Tree {
        let (parent, last) = split_last(path);
        self.get_or_create(parent).push_child(last, subtree)
    }

    /// Remove every node at `path`. Returns the number of nodes removed.
    pub fn erase(&mut self, path: &str) -> usize {
        if path.is_empty() {
            let removed = usize::from(!self.is_empty());
            *self = Tree::new();
            return removed;
        }
        let (parent, last) = split_last(path);
        match self.get_mut(parent) {
            Some(node) => {
                let before = node.children.len();
                node.children.retain(|(key, _)| key != last);
                before - node.children.len()
            }
            None => 0,
        }
    }

    /// Human-readable rendering: leaf data verbatim, compact JSON otherwise
    pub fn to_display_string(&self) -> String {
        if self.children.is_empty() {
            self.data.clone()
        } else {
            json::to_value(self).to_string()
        }
    }
}
