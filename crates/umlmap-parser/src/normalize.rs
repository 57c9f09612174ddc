//! Shape normalization of XML-derived JSON.
//!
//! Converting XML to JSON loses cardinality: an element that appears once
//! becomes an object, an element that appears several times becomes an
//! array. Converters also disagree on how attributes are spelled. The
//! helpers here absorb both ambiguities so the mapper can read a document
//! without ad hoc shape checks.

use std::borrow::Cow;

use serde_json::Value;

/// Key prefixes used by common XML-to-JSON converters for attributes.
const ATTRIBUTE_PREFIXES: [&str; 2] = ["@", "_"];

/// Key under which xml2js-style converters nest attributes.
const ATTRIBUTE_GROUP: &str = "$";

/// Keys used for element text content.
const TEXT_KEYS: [&str; 3] = ["#text", "__text", "_"];

/// Views a container field as a sequence.
///
/// An array yields its items, an object yields itself, and anything else
/// (absent, `null`, a stray scalar) yields nothing.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use umlmap_parser::normalize::as_sequence;
///
/// let many = json!([{ "name": "a" }, { "name": "b" }]);
/// let one = json!({ "name": "a" });
/// assert_eq!(as_sequence(Some(&many)).len(), 2);
/// assert_eq!(as_sequence(Some(&one)).len(), 1);
/// assert!(as_sequence(Some(&json!("oops"))).is_empty());
/// assert!(as_sequence(None).is_empty());
/// ```
pub fn as_sequence(value: Option<&Value>) -> Vec<&Value> {
    match value {
        Some(Value::Array(items)) => items.iter().filter(|item| item.is_object()).collect(),
        Some(item @ Value::Object(_)) => vec![item],
        _ => Vec::new(),
    }
}

/// Returns the child elements named `key`, normalized to a sequence.
pub fn children<'a>(element: &'a Value, key: &str) -> Vec<&'a Value> {
    as_sequence(element.get(key))
}

/// Returns the first child element named `key`.
pub fn first_child<'a>(element: &'a Value, key: &str) -> Option<&'a Value> {
    children(element, key).into_iter().next()
}

/// Looks up an attribute under any of the supported spellings.
///
/// Scalars are rendered as text, so `"isAbstract": true` and
/// `"isAbstract": "true"` read the same.
pub fn attr<'a>(element: &'a Value, key: &str) -> Option<Cow<'a, str>> {
    let direct = element.get(key);
    let prefixed = || {
        ATTRIBUTE_PREFIXES
            .iter()
            .find_map(|prefix| element.get(format!("{prefix}{key}")))
    };
    let grouped = || element.get(ATTRIBUTE_GROUP).and_then(|group| group.get(key));

    direct
        .or_else(prefixed)
        .or_else(grouped)
        .and_then(scalar_text)
}

/// Looks up an attribute and drops it if blank.
pub fn non_empty_attr<'a>(element: &'a Value, key: &str) -> Option<Cow<'a, str>> {
    attr(element, key).filter(|value| !value.trim().is_empty())
}

/// Reads an id reference that is either an attribute or a nested
/// `{ "xmi:idref": ... }` element.
pub fn idref<'a>(element: &'a Value, key: &str) -> Option<Cow<'a, str>> {
    non_empty_attr(element, key)
        .or_else(|| first_child(element, key).and_then(|child| non_empty_attr(child, "xmi:idref")))
}

/// Text content of an element, whether stored as a bare string or under a text key.
pub fn text(element: &Value) -> Option<Cow<'_, str>> {
    match element {
        Value::String(s) => Some(Cow::Borrowed(s)),
        Value::Object(_) => TEXT_KEYS
            .iter()
            .find_map(|key| element.get(*key))
            .and_then(scalar_text),
        _ => None,
    }
}

fn scalar_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s)),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_single_and_array_read_the_same() {
        let single = json!({ "ownedAttribute": { "name": "navn" } });
        let array = json!({ "ownedAttribute": [{ "name": "navn" }] });

        let names = |doc: &Value| -> Vec<String> {
            children(doc, "ownedAttribute")
                .into_iter()
                .filter_map(|a| attr(a, "name").map(Cow::into_owned))
                .collect()
        };
        assert_eq!(names(&single), names(&array));
        assert_eq!(names(&single), vec!["navn"]);
    }

    #[test]
    fn test_scalars_in_arrays_are_dropped() {
        let doc = json!({ "packagedElement": [{ "name": "a" }, "junk", 3, null] });
        assert_eq!(children(&doc, "packagedElement").len(), 1);
    }

    #[test]
    fn test_attribute_spellings() {
        let plain = json!({ "xmi:id": "A" });
        let at = json!({ "@xmi:id": "A" });
        let underscore = json!({ "_xmi:id": "A" });
        let grouped = json!({ "$": { "xmi:id": "A" } });

        for element in [plain, at, underscore, grouped] {
            assert_eq!(attr(&element, "xmi:id").as_deref(), Some("A"));
        }
    }

    #[test]
    fn test_attr_renders_scalars() {
        let element = json!({ "isAbstract": true, "lower": 0 });
        assert_eq!(attr(&element, "isAbstract").as_deref(), Some("true"));
        assert_eq!(attr(&element, "lower").as_deref(), Some("0"));
        assert!(attr(&element, "missing").is_none());
    }

    #[test]
    fn test_idref_attribute_or_child() {
        let as_attr = json!({ "type": "EAID_T" });
        let as_child = json!({ "type": { "xmi:idref": "EAID_T" } });
        let blank = json!({ "type": "" });

        assert_eq!(idref(&as_attr, "type").as_deref(), Some("EAID_T"));
        assert_eq!(idref(&as_child, "type").as_deref(), Some("EAID_T"));
        assert!(idref(&blank, "type").is_none());
    }

    #[test]
    fn test_text_content() {
        assert_eq!(text(&json!("hei")).as_deref(), Some("hei"));
        assert_eq!(text(&json!({ "#text": "hei" })).as_deref(), Some("hei"));
        assert_eq!(text(&json!({ "__text": "hei" })).as_deref(), Some("hei"));
        assert!(text(&json!(null)).is_none());
    }
}
