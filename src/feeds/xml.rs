//! A schema-tolerant view of an XML document.
//!
//! The airport status feed has no stable schema: lists with a single item lose
//! their wrapper, and the element holding program entries is named differently
//! per delay category. Rather than deserializing into fixed structs, the
//! document is read into a generic tree of [`XmlValue`]s:
//!
//! - an element with only text becomes [`XmlValue::Text`]
//! - an element with nothing inside becomes [`XmlValue::Null`]
//! - an element with children becomes [`XmlValue::Map`], in document order
//! - repeated sibling elements fold into one [`XmlValue::List`] entry
//! - attributes become `@name` entries, text mixed with children becomes `#text`
//!
//! [`as_sequence`] then gives callers a uniform "zero, one, or many" view.

use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

/// Why a document could not be turned into an [`XmlValue`] tree.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed XML at byte {position}: {message}")]
    Xml { position: u64, message: String },
    #[error("document has no root element")]
    MissingRoot,
    #[error("unbalanced document: {0}")]
    Unbalanced(&'static str),
}

/// A node of the generic document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlValue {
    Null,
    Text(String),
    List(Vec<XmlValue>),
    Map(Vec<(String, XmlValue)>),
}

impl XmlValue {
    /// Look up a child by element name (or `@attr` / `#text`).
    ///
    /// Returns `None` for non-map values.
    pub fn get(&self, key: &str) -> Option<&XmlValue> {
        match self {
            XmlValue::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// The children of a map in document order; empty for anything else.
    pub fn entries(&self) -> &[(String, XmlValue)] {
        match self {
            XmlValue::Map(entries) => entries,
            _ => &[],
        }
    }

    /// Text content of a leaf, or the `#text` of a mixed element.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            XmlValue::Text(s) => Some(s),
            XmlValue::Map(_) => self.get("#text").and_then(XmlValue::as_text),
            _ => None,
        }
    }

    /// Whether the value carries anything: `Null`, blank text and empty
    /// collections are all considered empty.
    pub fn is_present(&self) -> bool {
        match self {
            XmlValue::Null => false,
            XmlValue::Text(s) => !s.trim().is_empty(),
            XmlValue::List(items) => !items.is_empty(),
            XmlValue::Map(entries) => !entries.is_empty(),
        }
    }
}

/// View a value as a sequence: a list yields its items, `Null` yields
/// nothing, and any other single value yields itself.
pub fn as_sequence(value: &XmlValue) -> &[XmlValue] {
    match value {
        XmlValue::List(items) => items,
        XmlValue::Null => &[],
        single => std::slice::from_ref(single),
    }
}

/// An element that has been opened but not yet closed.
struct Frame {
    name: String,
    children: Vec<(String, XmlValue)>,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart<'_>, position: u64) -> Result<Self, ParseError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut children = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| ParseError::Xml {
                position,
                message: e.to_string(),
            })?;
            let key = format!("@{}", String::from_utf8_lossy(attr.key.as_ref()));
            let value = attr.unescape_value().map_err(|e| ParseError::Xml {
                position,
                message: e.to_string(),
            })?;
            insert_child(&mut children, key, XmlValue::Text(value.into_owned()));
        }
        Ok(Self {
            name,
            children,
            text: String::new(),
        })
    }

    fn close(self) -> (String, XmlValue) {
        let text = self.text.trim();
        let value = if self.children.is_empty() {
            if text.is_empty() {
                XmlValue::Null
            } else {
                XmlValue::Text(text.to_string())
            }
        } else {
            let mut children = self.children;
            if !text.is_empty() {
                insert_child(&mut children, "#text".to_string(), XmlValue::Text(text.to_string()));
            }
            XmlValue::Map(children)
        };
        (self.name, value)
    }
}

fn insert_child(children: &mut Vec<(String, XmlValue)>, key: String, value: XmlValue) {
    match children.iter_mut().find(|(k, _)| *k == key) {
        Some((_, XmlValue::List(items))) => items.push(value),
        Some((_, existing)) => {
            let first = std::mem::replace(existing, XmlValue::Null);
            *existing = XmlValue::List(vec![first, value]);
        }
        None => children.push((key, value)),
    }
}

/// Parse `body` into a one-entry map keyed by the root element name.
///
/// # Errors
///
/// Returns a [`ParseError`] if the document is not well-formed, has no root
/// element, or has more than one.
pub fn parse_document(body: &str) -> Result<XmlValue, ParseError> {
    let mut reader = Reader::from_str(body);
    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<(String, XmlValue)> = None;

    loop {
        let position = reader.buffer_position() as u64;
        let event = reader.read_event().map_err(|e| ParseError::Xml {
            position: reader.error_position() as u64,
            message: e.to_string(),
        })?;

        match event {
            Event::Start(start) => stack.push(Frame::open(&start, position)?),
            Event::Empty(start) => {
                let closed = Frame::open(&start, position)?.close();
                attach(&mut stack, &mut root, closed)?;
            }
            Event::End(_) => {
                let frame = stack
                    .pop()
                    .ok_or(ParseError::Unbalanced("closing tag without an open element"))?;
                attach(&mut stack, &mut root, frame.close())?;
            }
            Event::Text(text) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&text));
                }
            }
            Event::CData(data) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::GeneralRef(reference) => {
                if let Some(frame) = stack.last_mut() {
                    let resolved = reference.resolve_char_ref().map_err(|e| ParseError::Xml {
                        position,
                        message: e.to_string(),
                    })?;
                    match resolved {
                        Some(ch) => frame.text.push(ch),
                        None => {
                            let name = String::from_utf8_lossy(&reference);
                            match resolve_predefined_entity(&name) {
                                Some(s) => frame.text.push_str(s),
                                // Unknown entities are kept verbatim.
                                None => {
                                    frame.text.push('&');
                                    frame.text.push_str(&name);
                                    frame.text.push(';');
                                }
                            }
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(ParseError::Unbalanced("element left open at end of document"));
    }
    let (name, value) = root.ok_or(ParseError::MissingRoot)?;
    Ok(XmlValue::Map(vec![(name, value)]))
}

fn attach(
    stack: &mut [Frame],
    root: &mut Option<(String, XmlValue)>,
    (name, value): (String, XmlValue),
) -> Result<(), ParseError> {
    match stack.last_mut() {
        Some(parent) => {
            insert_child(&mut parent.children, name, value);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some((name, value));
            Ok(())
        }
        None => Err(ParseError::Unbalanced("more than one root element")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_document() {
        let doc = parse_document(
            "<?xml version=\"1.0\"?><Root><Name>Ground Stops</Name><Empty/><Blank>  </Blank></Root>",
        )
        .unwrap();
        let root = doc.get("Root").unwrap();
        assert_eq!(root.get("Name").and_then(XmlValue::as_text), Some("Ground Stops"));
        assert_eq!(root.get("Empty"), Some(&XmlValue::Null));
        assert_eq!(root.get("Blank"), Some(&XmlValue::Null));
        assert_eq!(root.get("Missing"), None);
    }

    #[test]
    fn test_repeated_siblings_become_list() {
        let doc = parse_document("<R><Item>a</Item><Other/><Item>b</Item><Item>c</Item></R>").unwrap();
        let items = doc.get("R").unwrap().get("Item").unwrap();
        assert_eq!(
            items,
            &XmlValue::List(vec![
                XmlValue::Text("a".into()),
                XmlValue::Text("b".into()),
                XmlValue::Text("c".into()),
            ])
        );
        // Map keeps first-occurrence order.
        let keys: Vec<&str> = doc.get("R").unwrap().entries().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["Item", "Other"]);
    }

    #[test]
    fn test_attributes_and_mixed_text() {
        let doc = parse_document(r#"<R><Delay Type="Arrival">late<Min>5</Min></Delay></R>"#).unwrap();
        let delay = doc.get("R").unwrap().get("Delay").unwrap();
        assert_eq!(delay.get("@Type").and_then(XmlValue::as_text), Some("Arrival"));
        assert_eq!(delay.get("Min").and_then(XmlValue::as_text), Some("5"));
        assert_eq!(delay.as_text(), Some("late"));
    }

    #[test]
    fn test_entities_are_resolved() {
        let doc = parse_document("<R><Reason>WX &amp; VOL &#65;</Reason></R>").unwrap();
        assert_eq!(
            doc.get("R").unwrap().get("Reason").and_then(XmlValue::as_text),
            Some("WX & VOL A")
        );
    }

    #[test]
    fn test_as_sequence_normalizes() {
        let single = XmlValue::Text("x".into());
        assert_eq!(as_sequence(&single), &[XmlValue::Text("x".into())]);
        assert!(as_sequence(&XmlValue::Null).is_empty());
        let list = XmlValue::List(vec![XmlValue::Null, XmlValue::Text("y".into())]);
        assert_eq!(as_sequence(&list).len(), 2);
    }

    #[test]
    fn test_is_present() {
        assert!(!XmlValue::Null.is_present());
        assert!(!XmlValue::Text("  ".into()).is_present());
        assert!(!XmlValue::Map(vec![]).is_present());
        assert!(!XmlValue::List(vec![]).is_present());
        assert!(XmlValue::Text("x".into()).is_present());
    }

    #[test]
    fn test_malformed_documents_are_errors() {
        assert!(parse_document("<R><A></B></R>").is_err());
        assert!(parse_document("<R><A>").is_err());
        assert!(matches!(parse_document(""), Err(ParseError::MissingRoot)));
        assert!(matches!(parse_document("just text"), Err(ParseError::MissingRoot)));
    }
}
