//! Identifier management using string interning.
//!
//! XMI documents reference every element by an opaque `xmi:id` string such as
//! `EAID_6F3B0C9A_...`. Those strings are compared constantly while resolving
//! generalizations and associations, so they are interned into the [`XmiId`]
//! handle, which is `Copy` and hashes as an integer.
//!
//! The module also provides [`derive_class_id`], the human-readable id used
//! for anchors in the documentation view.

use std::{
    fmt,
    sync::{Mutex, OnceLock},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner for identifier storage.
///
/// # Thread Safety
///
/// This uses `Mutex` for thread-safe access to the string interner.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn with_interner<R>(f: impl FnOnce(&mut DefaultStringInterner) -> R) -> R {
    let mut interner = INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    f(&mut interner)
}

/// Interned `xmi:id` of a model entity.
///
/// # Examples
///
/// ```
/// use umlmap_core::identifier::XmiId;
///
/// let a = XmiId::new("EAID_0001");
/// let b: XmiId = "EAID_0001".into();
/// assert_eq!(a, b);
/// assert_eq!(a, "EAID_0001");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct XmiId(DefaultSymbol);

impl XmiId {
    /// Creates an `XmiId` from a raw identifier string.
    pub fn new(raw: &str) -> Self {
        Self(with_interner(|interner| interner.get_or_intern(raw)))
    }

    /// Creates an identifier for an element that carries no `xmi:id` of its own.
    ///
    /// The generated value cannot collide with Enterprise Architect ids, which
    /// never start with a double underscore.
    pub fn from_anonymous(idx: usize) -> Self {
        Self::new(&format!("__anon{idx}"))
    }

    /// Returns the identifier as an owned string.
    pub fn as_string(&self) -> String {
        with_interner(|interner| interner.resolve(self.0).unwrap_or_default().to_string())
    }
}

impl fmt::Display for XmiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

impl From<&str> for XmiId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl PartialEq<str> for XmiId {
    fn eq(&self, other: &str) -> bool {
        with_interner(|interner| interner.resolve(self.0) == Some(other))
    }
}

impl PartialEq<&str> for XmiId {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

/// Derives the stable, human-readable id of a class from its package and name.
///
/// The id is `"{package}_{name}"` lower-cased, with the Norwegian letters
/// folded (`æ`→`a`, `ø`→`o`, `å`→`a`) and all whitespace removed. Uniqueness
/// holds only as far as the model keeps `(package, name)` pairs unique.
///
/// # Examples
///
/// ```
/// use umlmap_core::identifier::derive_class_id;
///
/// assert_eq!(derive_class_id("Felles", "Kontaktinformasjon"), "felles_kontaktinformasjon");
/// assert_eq!(derive_class_id("Utdanning", "Fag Gruppe"), "utdanning_faggruppe");
/// assert_eq!(derive_class_id("Økonomi", "Bærekraft"), "okonomi_barekraft");
/// ```
pub fn derive_class_id(package_name: &str, name: &str) -> String {
    clean_id(&format!("{package_name}_{name}"))
}

/// Lower-cases and folds a free-form name into an anchor-safe id.
pub fn clean_id(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            'æ' | 'å' => 'a',
            'ø' => 'o',
            other => other,
        })
        .collect()
}
