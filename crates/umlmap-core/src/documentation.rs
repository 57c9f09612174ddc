//! Cleaning of Enterprise Architect notes.
//!
//! EA stores element notes with inline formatting markup (`<b>`, `<i>`,
//! `<font color=...>`), XML entities and Windows line endings. [`clean`]
//! reduces a note to plain text with `\n` line breaks; [`header`] and
//! [`body`] split the cleaned text at its first line break.

use std::{borrow::Cow, sync::OnceLock};

use regex::Regex;

/// Reduces an EA note to plain text.
///
/// # Examples
///
/// ```
/// use umlmap_core::documentation::clean;
///
/// assert_eq!(clean("<b>Elev</b> i skolen\r\nMer tekst"), "Elev i skolen\nMer tekst");
/// assert_eq!(clean("a &lt; b &amp;&amp; c"), "a < b && c");
/// ```
pub fn clean(raw: &str) -> String {
    let text = raw.replace("\r\n", "\n").replace('\r', "\n");
    htmlize::unescape(strip_markup(&text)).trim().to_string()
}

/// First line of a cleaned note.
pub fn header(doc: &str) -> &str {
    match doc.split_once('\n') {
        Some((first, _)) if !first.is_empty() => first,
        _ => doc,
    }
}

/// Everything after the first line of a cleaned note; empty for single-line notes.
pub fn body(doc: &str) -> &str {
    match doc.split_once('\n') {
        Some((first, rest)) if !first.is_empty() => rest,
        _ => "",
    }
}

/// Removes `<tag ...>` and `</tag>` sequences, leaving other `<` untouched.
fn strip_markup(text: &str) -> Cow<'_, str> {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"</?[A-Za-z][^>]*>").expect("valid regex"))
        .replace_all(text, "")
}
