//! Generic XML document model
//!
//! The vendor envelope is irregular enough that a fixed serde schema for the
//! whole document is brittle; instead responses are decoded into a
//! `serde_json::Value` tree and inspected through the typed views in
//! [`super::envelope`]. Requests are written with an event writer so element
//! order and nesting match the vendor DTD exactly.

use crate::error::{Error, Result};
use crate::types::JsonValue;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde_json::{Map, Value};

// ============================================================================
// Reading: XML -> JSON tree
// ============================================================================

/// Decode an XML document into a JSON-equivalent tree.
///
/// Repeated sibling elements collapse into arrays, empty elements become
/// `null`, text leaves become strings. Attributes are not represented; the
/// vendor response envelope carries everything in element content.
pub fn document_to_value(body: &str) -> Result<JsonValue> {
    let trimmed = body.trim_start();
    if !trimmed.starts_with('<') {
        return Err(Error::xml("input does not appear to be XML"));
    }

    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut root = Map::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(start)) => {
                let name = String::from_utf8_lossy(start.name().as_ref()).to_string();
                let child = read_element(&mut reader)?;
                insert_child(&mut root, name, child);
            }
            Ok(Event::Empty(empty)) => {
                let name = String::from_utf8_lossy(empty.name().as_ref()).to_string();
                insert_child(&mut root, name, Value::Null);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(Error::xml(format!("XML parse error: {e}"))),
        }
        buf.clear();
    }

    if root.is_empty() {
        return Err(Error::xml("document has no root element"));
    }

    Ok(Value::Object(root))
}

fn read_element(reader: &mut Reader<&[u8]>) -> Result<Value> {
    let mut children = Map::new();
    let mut text = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(start)) => {
                let name = String::from_utf8_lossy(start.name().as_ref()).to_string();
                let child = read_element(reader)?;
                insert_child(&mut children, name, child);
            }
            Ok(Event::Empty(empty)) => {
                let name = String::from_utf8_lossy(empty.name().as_ref()).to_string();
                insert_child(&mut children, name, Value::Null);
            }
            Ok(Event::Text(t)) => {
                let unescaped = t
                    .unescape()
                    .map_err(|e| Error::xml(format!("XML parse error: {e}")))?;
                let trimmed = unescaped.trim();
                if !trimmed.is_empty() {
                    text.push_str(trimmed);
                }
            }
            Ok(Event::CData(cdata)) => {
                text.push_str(&String::from_utf8_lossy(cdata.as_ref()));
            }
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(Error::xml("unexpected end of document inside an element"))
            }
            Ok(_) => {}
            Err(e) => return Err(Error::xml(format!("XML parse error: {e}"))),
        }
        buf.clear();
    }

    if children.is_empty() {
        if text.is_empty() {
            Ok(Value::Null)
        } else {
            Ok(Value::String(text))
        }
    } else {
        Ok(Value::Object(children))
    }
}

/// Insert a child value, collapsing repeated element names into an array
fn insert_child(map: &mut Map<String, Value>, name: String, child: Value) {
    if let Some(existing) = map.get_mut(&name) {
        match existing {
            Value::Array(items) => items.push(child),
            _ => {
                let first = existing.take();
                *existing = Value::Array(vec![first, child]);
            }
        }
    } else {
        map.insert(name, child);
    }
}

// ============================================================================
// Writing: event-based request serialization
// ============================================================================

/// Event writer for vendor request bodies
pub struct XmlBuilder {
    writer: Writer<Vec<u8>>,
}

impl XmlBuilder {
    /// Start a document with the standard XML declaration
    pub fn new() -> Result<Self> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(|e| Error::xml(e.to_string()))?;
        Ok(Self { writer })
    }

    /// Open an element
    pub fn open(&mut self, name: &str) -> Result<&mut Self> {
        self.writer
            .write_event(Event::Start(BytesStart::new(name)))
            .map_err(|e| Error::xml(e.to_string()))?;
        Ok(self)
    }

    /// Open an element carrying a single attribute
    pub fn open_with_attr(&mut self, name: &str, key: &str, value: &str) -> Result<&mut Self> {
        let mut start = BytesStart::new(name);
        start.push_attribute((key, value));
        self.writer
            .write_event(Event::Start(start))
            .map_err(|e| Error::xml(e.to_string()))?;
        Ok(self)
    }

    /// Close an element
    pub fn close(&mut self, name: &str) -> Result<&mut Self> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(|e| Error::xml(e.to_string()))?;
        Ok(self)
    }

    /// Write `<name>text</name>`, escaping the text content
    pub fn leaf(&mut self, name: &str, text: &str) -> Result<&mut Self> {
        self.open(name)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(|e| Error::xml(e.to_string()))?;
        self.close(name)
    }

    /// Write an empty element `<name/>`
    pub fn empty(&mut self, name: &str) -> Result<&mut Self> {
        self.writer
            .write_event(Event::Empty(BytesStart::new(name)))
            .map_err(|e| Error::xml(e.to_string()))?;
        Ok(self)
    }

    /// Finish and return the serialized document
    pub fn finish(self) -> Result<String> {
        String::from_utf8(self.writer.into_inner())
            .map_err(|e| Error::xml(format!("request body is not UTF-8: {e}")))
    }
}
