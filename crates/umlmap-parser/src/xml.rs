//! XMI XML to JSON conversion.
//!
//! Produces the same loosely-shaped JSON tree that browser-side XML-to-JSON
//! converters produce, so XML and JSON exports go through one mapper:
//!
//! - attributes become string keys spelled with their namespace prefix
//!   (`xmi:id`, `name`)
//! - child elements become keys named after their qualified tag; a tag that
//!   occurs once is an object, a repeated tag is an array
//! - non-blank text content is stored under `#text`

use log::trace;
use roxmltree::{Document, Node};
use serde_json::{Map, Value};

use crate::error::MapError;

/// Parses an XMI document and converts it to JSON.
///
/// # Errors
///
/// Returns [`MapError::Xml`] if the text is not well-formed XML.
///
/// # Examples
///
/// ```
/// use umlmap_parser::xml::xml_to_value;
///
/// let xml = r#"<xmi:XMI xmlns:xmi="http://www.omg.org/spec/XMI/20131001">
///     <item name="a"/><item name="b"/><single/>
/// </xmi:XMI>"#;
/// let value = xml_to_value(xml).unwrap();
/// assert_eq!(value["xmi:XMI"]["item"][1]["name"], "b");
/// assert!(value["xmi:XMI"]["single"].is_object());
/// ```
pub fn xml_to_value(text: &str) -> Result<Value, MapError> {
    let doc = Document::parse(text)?;
    let root = doc.root_element();
    trace!(root = qualified_tag(root).as_str(); "Converting XML document");

    let mut map = Map::new();
    map.insert(qualified_tag(root), element_to_value(root));
    Ok(Value::Object(map))
}

fn element_to_value(node: Node<'_, '_>) -> Value {
    let mut map = Map::new();

    for attribute in node.attributes() {
        let key = qualify(node, attribute.namespace(), attribute.name());
        map.insert(key, Value::String(attribute.value().to_string()));
    }

    let mut text = String::new();
    for child in node.children() {
        if child.is_element() {
            insert_child(&mut map, qualified_tag(child), element_to_value(child));
        } else if child.is_text() {
            text.push_str(child.text().unwrap_or_default());
        }
    }

    let text = text.trim();
    if !text.is_empty() {
        map.insert("#text".to_string(), Value::String(text.to_string()));
    }
    Value::Object(map)
}

/// Inserts a child, turning the slot into an array on the second occurrence.
fn insert_child(map: &mut Map<String, Value>, key: String, value: Value) {
    match map.get_mut(&key) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            map.insert(key, value);
        }
    }
}

fn qualified_tag(node: Node<'_, '_>) -> String {
    let tag = node.tag_name();
    qualify(node, tag.namespace(), tag.name())
}

fn qualify(node: Node<'_, '_>, namespace: Option<&str>, local: &str) -> String {
    match namespace.and_then(|uri| node.lookup_prefix(uri)) {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}:{local}"),
        _ => local.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const XMI: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xmi:XMI xmi:version="2.1" xmlns:uml="http://schema.omg.org/spec/UML/2.1" xmlns:xmi="http://schema.omg.org/spec/XMI/2.1">
  <uml:Model xmi:type="uml:Model" name="EA_Model">
    <packagedElement xmi:type="uml:Package" xmi:id="PKG" name="FINT">
      <packagedElement xmi:type="uml:Class" xmi:id="C1" name="Person"/>
    </packagedElement>
  </uml:Model>
  <xmi:Extension extender="Enterprise Architect">
    <elements>
      <element xmi:idref="C1"><properties documentation="Et menneske"/></element>
    </elements>
  </xmi:Extension>
</xmi:XMI>"#;

    #[test]
    fn test_namespaced_names() {
        let value = xml_to_value(XMI).unwrap();
        let model = &value["xmi:XMI"]["uml:Model"];
        assert_eq!(model["name"], "EA_Model");

        let package = &model["packagedElement"];
        assert_eq!(package["xmi:type"], "uml:Package");
        assert_eq!(package["xmi:id"], "PKG");
        assert_eq!(package["packagedElement"]["name"], "Person");
    }

    #[test]
    fn test_extension_is_kept() {
        let value = xml_to_value(XMI).unwrap();
        let element = &value["xmi:XMI"]["xmi:Extension"]["elements"]["element"];
        assert_eq!(element["xmi:idref"], "C1");
        assert_eq!(element["properties"]["documentation"], "Et menneske");
    }

    #[test]
    fn test_repeated_children_become_arrays() {
        let value = xml_to_value("<a><b>1</b><b>2</b><b>3</b></a>").unwrap();
        let items = value["a"]["b"].as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[2]["#text"], "3");
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        assert!(matches!(xml_to_value("<a><b></a>"), Err(MapError::Xml(_))));
    }
}
