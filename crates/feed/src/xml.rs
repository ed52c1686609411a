// ABOUTME: Minimal XML document tree built on quick-xml events.
// ABOUTME: Rejects text that is not well-formed XML and maps elements to generic JSON values.

use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesRef, BytesStart, Event};
use quick_xml::reader::Reader;
use serde_json::{Map, Value};

use crate::error::FeedError;

/// A parsed XML element with its attributes, child elements, and own text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    /// Qualified name as written, prefix included (`dc:creator`).
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    text: String,
}

impl Element {
    fn from_start(e: &BytesStart) -> Result<Self, FeedError> {
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(FeedError::malformed)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let raw = String::from_utf8_lossy(&attr.value);
            let value = unescape(&raw)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| raw.to_string());
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
            text: String::new(),
        })
    }

    /// Own text content (CDATA included), trimmed.
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    /// First child element with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All child elements with the given name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Text of the first child with the given name; empty text counts as absent.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(Element::text).filter(|t| !t.is_empty())
    }

    /// Converts this element to a generic value.
    ///
    /// Leaf elements without attributes become their text, or null when empty.
    /// Anything else becomes the object built by [`Element::to_map`].
    pub fn to_value(&self) -> Value {
        if self.attributes.is_empty() && self.children.is_empty() {
            let text = self.text();
            return if text.is_empty() {
                Value::Null
            } else {
                Value::String(text.to_string())
            };
        }
        Value::Object(self.to_map())
    }

    /// Maps this element to an object: `@attr` keys, child elements by name, and
    /// remaining text under `#text`. Repeated child names collect into an array.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        for (key, value) in &self.attributes {
            map.insert(format!("@{}", key), Value::String(value.clone()));
        }
        for child in &self.children {
            let value = child.to_value();
            match map.get_mut(&child.name) {
                Some(Value::Array(items)) => items.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    map.insert(child.name.clone(), value);
                }
            }
        }
        let text = self.text();
        if !text.is_empty() {
            map.insert("#text".to_string(), Value::String(text.to_string()));
        }
        map
    }
}

/// Parses a complete XML document and returns its root element.
///
/// Fails when the reader reports an error, when tags are unbalanced, when there is
/// no root or more than one root, or when non-whitespace text sits outside the root.
pub fn parse_document(text: &str) -> Result<Element, FeedError> {
    let mut reader = Reader::from_str(text);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            FeedError::Malformed(format!("{} at byte {}", e, reader.error_position()))
        })?;

        match event {
            Event::Start(ref e) => {
                if stack.is_empty() && root.is_some() {
                    return Err(FeedError::malformed("more than one root element"));
                }
                stack.push(Element::from_start(e)?);
            }
            Event::Empty(ref e) => {
                let element = Element::from_start(e)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| FeedError::malformed("unexpected closing tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(ref e) => {
                let chunk = e.decode().map_err(FeedError::malformed)?;
                push_text(&mut stack, &chunk)?;
            }
            Event::CData(ref e) => {
                let chunk = String::from_utf8_lossy(e);
                push_text(&mut stack, &chunk)?;
            }
            Event::GeneralRef(ref e) => {
                let resolved = resolve_reference(e)?;
                push_text(&mut stack, &resolved)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(FeedError::Malformed(format!(
            "unclosed element <{}>",
            open.name
        )));
    }

    root.ok_or_else(|| FeedError::malformed("no root element"))
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), FeedError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(FeedError::Malformed(format!(
                "element <{}> after root element",
                element.name
            )))
        }
    }
    Ok(())
}

fn push_text(stack: &mut [Element], chunk: &str) -> Result<(), FeedError> {
    match stack.last_mut() {
        Some(current) => current.text.push_str(chunk),
        None if chunk.trim().is_empty() => {}
        None => return Err(FeedError::malformed("text outside root element")),
    }
    Ok(())
}

/// Resolves `&name;` and `&#..;` references. Unknown entities are kept verbatim.
fn resolve_reference(e: &BytesRef) -> Result<String, FeedError> {
    if let Ok(Some(ch)) = e.resolve_char_ref() {
        return Ok(ch.to_string());
    }
    let name = e.decode().map_err(FeedError::malformed)?;
    Ok(match resolve_predefined_entity(&name) {
        Some(resolved) => resolved.to_string(),
        None => format!("&{};", name),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_nested_elements_and_text() {
        let root = parse_document("<a><b>one</b><c x=\"1\">two</c></a>").unwrap();
        assert_eq!(root.name, "a");
        assert_eq!(root.child_text("b"), Some("one"));
        assert_eq!(
            root.child("c").unwrap().attributes,
            vec![("x".to_string(), "1".to_string())]
        );
    }

    #[test]
    fn test_entities_and_cdata_join_text() {
        let root = parse_document("<a>Tom &amp; Jerry &#65;<![CDATA[ <b>raw</b>]]></a>").unwrap();
        assert_eq!(root.text(), "Tom & Jerry A <b>raw</b>");
    }

    #[test]
    fn test_unknown_entity_kept_verbatim() {
        let root = parse_document("<a>x&nbsp;y</a>").unwrap();
        assert_eq!(root.text(), "x&nbsp;y");
    }

    #[test]
    fn test_to_value_shapes() {
        let root = parse_document(
            r#"<item><empty/><guid isPermaLink="false">g-1</guid><cat>a</cat><cat>b</cat><cat>c</cat></item>"#,
        )
        .unwrap();
        assert_eq!(
            Value::Object(root.to_map()),
            json!({
                "empty": null,
                "guid": {"@isPermaLink": "false", "#text": "g-1"},
                "cat": ["a", "b", "c"]
            })
        );
    }

    #[test]
    fn test_rejects_non_xml() {
        assert!(parse_document("this is not xml").is_err());
        assert!(parse_document("").is_err());
        assert!(parse_document("   ").is_err());
    }

    #[test]
    fn test_rejects_unbalanced_tags() {
        assert!(parse_document("<a><b></a>").is_err());
        assert!(parse_document("<a><b>").is_err());
        assert!(parse_document("</a>").is_err());
    }

    #[test]
    fn test_rejects_multiple_roots() {
        assert!(parse_document("<a/><b/>").is_err());
        assert!(parse_document("<a></a>trailing").is_err());
    }

    #[test]
    fn test_prolog_and_comments_ignored() {
        let root = parse_document(
            "<?xml version=\"1.0\"?>\n<!-- generated -->\n<rss version=\"2.0\"><channel/></rss>\n",
        )
        .unwrap();
        assert_eq!(root.name, "rss");
        assert!(root.child("channel").is_some());
    }
}
