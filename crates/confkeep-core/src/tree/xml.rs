//! XML backend built on `quick-xml`.
//!
//! Elements map to children keyed by tag name and text content to the
//! node's data. Attributes live under an [`XML_ATTR_KEY`] child and comments
//! become [`XML_COMMENT_KEY`] children so that untouched documents survive a
//! load/save cycle.
//!
//! Leaf text is kept exactly as written. Text of elements with child
//! elements is trimmed, which drops the indentation between them.
//!
//! Keys that are not valid element names (map keys with spaces, empty keys)
//! are written as `<entry key="...">` and read back under their original key.
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::error::TreeError;
use super::format::Format;
use super::{Tree, XML_ATTR_KEY, XML_COMMENT_KEY};

fn parse_err(message: impl ToString) -> TreeError {
    TreeError::parse(Format::Xml, message)
}

fn write_err(message: impl ToString) -> TreeError {
    TreeError::serialize(Format::Xml, message)
}

/// Element standing in for a key that is not a valid element name
const ENTRY_ELEMENT: &str = "entry";
/// Attribute of [`ENTRY_ELEMENT`] holding the real key
const ENTRY_KEY_ATTR: &str = "key";

fn is_name_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic() || (!c.is_ascii() && c.is_alphanumeric())
}

/// Conservative check against the XML `Name` production
fn is_element_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_name_start(first) => {
            chars.all(|c| is_name_start(c) || c.is_ascii_digit() || matches!(c, '-' | '.' | ':'))
        }
        _ => false,
    }
}

pub(crate) fn parse(text: &str) -> Result<Tree, TreeError> {
    let mut reader = Reader::from_str(text);

    let mut root = Tree::new();
    let mut open: Vec<(String, Tree)> = Vec::new();

    loop {
        match reader.read_event().map_err(parse_err)? {
            Event::Start(start) => open.push(open_element(&start)?),
            Event::Empty(start) => {
                let (name, node) = open_element(&start)?;
                parent_of(&mut open, &mut root).push_child(name, node);
            }
            Event::End(_) => {
                let (name, mut node) = open.pop().ok_or_else(|| parse_err("unexpected closing tag"))?;
                if node.children().any(|(key, _)| key != XML_ATTR_KEY) {
                    let trimmed = node.data().trim().to_string();
                    node.set_data(trimmed);
                }
                parent_of(&mut open, &mut root).push_child(name, node);
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(parse_err)?;
                append_text(&mut open, &text);
            }
            Event::CData(cdata) => {
                let text = String::from_utf8_lossy(&cdata).into_owned();
                append_text(&mut open, &text);
            }
            Event::Comment(comment) => {
                let text = String::from_utf8_lossy(&comment).trim().to_string();
                parent_of(&mut open, &mut root).push_child(XML_COMMENT_KEY, Tree::with_data(text));
            }
            Event::Eof => break,
            // Declarations, processing instructions and doctypes carry no settings
            _ => {}
        }
    }

    if let Some((name, _)) = open.last() {
        return Err(parse_err(format!("element <{}> is never closed", name)));
    }
    Ok(root)
}

fn open_element(start: &BytesStart<'_>) -> Result<(String, Tree), TreeError> {
    let mut name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut node = Tree::new();
    let mut attributes = Tree::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(parse_err)?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute.unescape_value().map_err(parse_err)?.into_owned();
        if name == ENTRY_ELEMENT && key == ENTRY_KEY_ATTR && !is_element_name(&value) {
            name = value;
            continue;
        }
        attributes.push_child(key, Tree::with_data(value));
    }
    if attributes.has_children() {
        node.push_child(XML_ATTR_KEY, attributes);
    }
    Ok((name, node))
}

fn parent_of<'a>(open: &'a mut [(String, Tree)], root: &'a mut Tree) -> &'a mut Tree {
    match open.last_mut() {
        Some((_, node)) => node,
        None => root,
    }
}

fn append_text(open: &mut [(String, Tree)], text: &str) {
    // Text outside the root element is not part of the document
    if let Some((_, node)) = open.last_mut() {
        let mut data = node.data().to_string();
        data.push_str(text);
        node.set_data(data);
    }
}

pub(crate) fn serialize(tree: &Tree) -> Result<String, TreeError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(write_err)?;
    for (key, child) in tree.children() {
        write_node(&mut writer, key, child)?;
    }
    let mut text = String::from_utf8(writer.into_inner()).map_err(write_err)?;
    text.push('\n');
    Ok(text)
}

fn write_node(writer: &mut Writer<Vec<u8>>, key: &str, node: &Tree) -> Result<(), TreeError> {
    if key == XML_ATTR_KEY {
        return Ok(());
    }
    if key == XML_COMMENT_KEY {
        let comment = format!(" {} ", node.data());
        return writer
            .write_event(Event::Comment(BytesText::from_escaped(comment.as_str())))
            .map_err(write_err);
    }

    let attributes = node.child(XML_ATTR_KEY);
    let tag = if is_element_name(key) { key } else { ENTRY_ELEMENT };
    let mut start = BytesStart::new(tag);
    if tag != key {
        if attributes.is_some_and(|a| a.child(ENTRY_KEY_ATTR).is_some()) {
            return Err(write_err(format!(
                "key '{}' is not an element name and already has a '{}' attribute",
                key, ENTRY_KEY_ATTR
            )));
        }
        start.push_attribute((ENTRY_KEY_ATTR, key));
    }
    if let Some(attributes) = attributes {
        for (name, value) in attributes.children() {
            start.push_attribute((name, value.data()));
        }
    }

    let has_content = !node.data().is_empty() || node.children().any(|(k, _)| k != XML_ATTR_KEY);
    if !has_content {
        return writer.write_event(Event::Empty(start)).map_err(write_err);
    }

    writer.write_event(Event::Start(start)).map_err(write_err)?;
    if !node.data().is_empty() {
        writer.write_event(Event::Text(BytesText::new(node.data()))).map_err(write_err)?;
    }
    for (child_key, child) in node.children() {
        write_node(writer, child_key, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(tag))).map_err(write_err)
}
