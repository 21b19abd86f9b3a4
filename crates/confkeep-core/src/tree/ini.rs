//! INI backend built on `rust-ini`.
//!
//! INI is only two levels deep, so deeper trees are flattened: top-level
//! nodes with children become sections and everything below them is
//! written as dotted keys (`list.0`, `map.key`). Parsing expands dotted keys
//! back into nested nodes. Top-level leaves live in the general section.
//!
//! A `.` inside a single key is written as `\` so it does not split on
//! reload. Values with surrounding whitespace, a leading quote or line
//! breaks are written double-quoted with backslash escapes; everything else
//! is written verbatim.
use ini::{EscapePolicy, Ini, ParseOption, WriteOption};

use super::error::TreeError;
use super::format::Format;
use super::Tree;

const KEY_DOT_ESCAPE: char = '\\';

pub(crate) fn parse(text: &str) -> Result<Tree, TreeError> {
    let options = ParseOption { enabled_quote: false, enabled_escape: false, ..ParseOption::default() };
    let document = Ini::load_from_str_opt(text, options).map_err(|e| TreeError::parse(Format::Ini, e))?;
    let mut root = Tree::new();
    for (section, properties) in document.iter() {
        let base = match section {
            Some(name) => root.child_or_insert(&unescape_key(name)),
            None => &mut root,
        };
        for (key, value) in properties.iter() {
            let mut node = &mut *base;
            for segment in key.split('.') {
                node = node.child_or_insert(&unescape_key(segment));
            }
            node.set_data(decode_value(value));
        }
    }
    Ok(root)
}

pub(crate) fn serialize(tree: &Tree) -> Result<String, TreeError> {
    let mut document = Ini::new();
    for (key, child) in tree.children() {
        let key = escape_key(key);
        if !child.has_children() || !child.data().is_empty() {
            document.with_general_section().set(key.as_str(), encode_value(child.data()));
        }
        if !child.has_children() {
            continue;
        }
        let mut entries = Vec::new();
        flatten(child, "", &mut entries);
        let mut section = document.with_section(Some(key));
        for (path, value) in entries {
            section.set(path, value);
        }
    }

    let options = WriteOption { escape_policy: EscapePolicy::Nothing, ..WriteOption::default() };
    let mut out = Vec::new();
    document.write_to_opt(&mut out, options).map_err(|e| TreeError::serialize(Format::Ini, e))?;
    String::from_utf8(out).map_err(|e| TreeError::serialize(Format::Ini, e))
}

fn flatten(node: &Tree, prefix: &str, entries: &mut Vec<(String, String)>) {
    for (key, child) in node.children() {
        let key = escape_key(key);
        let path = if prefix.is_empty() { key } else { format!("{}.{}", prefix, key) };
        // Empty leaves are kept so that empty lists and maps survive a reload
        if !child.data().is_empty() || !child.has_children() {
            entries.push((path.clone(), encode_value(child.data())));
        }
        flatten(child, &path, entries);
    }
}

fn escape_key(key: &str) -> String {
    key.replace('.', &KEY_DOT_ESCAPE.to_string())
}

fn unescape_key(key: &str) -> String {
    key.replace(KEY_DOT_ESCAPE, ".")
}

fn needs_quotes(value: &str) -> bool {
    value != value.trim() || value.starts_with('"') || value.contains(['\n', '\r'])
}

fn encode_value(value: &str) -> String {
    if !needs_quotes(value) {
        return value.to_string();
    }
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}

fn decode_value(raw: &str) -> String {
    let inner = match raw.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) {
        Some(inner) => inner,
        None => return raw.to_string(),
    };
    let mut value = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            value.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => value.push('\n'),
            Some('r') => value.push('\r'),
            Some('t') => value.push('\t'),
            Some(other) => value.push(other),
            None => value.push('\\'),
        }
    }
    value
}
