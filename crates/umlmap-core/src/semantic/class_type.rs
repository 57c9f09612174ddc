//! Classification type tags.

use std::fmt;

/// Rendering/sorting category of a classification.
///
/// Derived once, when the classification is constructed, from the
/// Enterprise Architect element extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClassType {
    /// Stereotype `hovedklasse`: a main class of the information model.
    MainClass,
    Abstract,
    /// A plain class without stereotype ("complex datatype").
    Class,
    DataType,
    Enumeration,
    CodeList,
    Reference,
    /// No extension information at all.
    Table,
    Other(String),
}

impl ClassType {
    /// Derives the type tag from the element's extension properties.
    ///
    /// Precedence: abstract flag, the `hovedklasse` stereotype, the stereotype
    /// name, the EA `sType`, then the `xmi:type` without its `uml:` prefix.
    /// Elements without any extension are tables.
    ///
    /// # Examples
    ///
    /// ```
    /// use umlmap_core::semantic::ClassType;
    ///
    /// assert_eq!(ClassType::derive(true, Some("hovedklasse"), None, "uml:Class", true), ClassType::Abstract);
    /// assert_eq!(ClassType::derive(false, Some("hovedklasse"), None, "uml:Class", true), ClassType::MainClass);
    /// assert_eq!(ClassType::derive(false, None, None, "uml:Enumeration", true), ClassType::Enumeration);
    /// assert_eq!(ClassType::derive(false, None, None, "uml:Class", false), ClassType::Table);
    /// ```
    pub fn derive(
        is_abstract: bool,
        stereotype: Option<&str>,
        s_type: Option<&str>,
        xmi_type: &str,
        has_extension: bool,
    ) -> Self {
        if is_abstract {
            return Self::Abstract;
        }
        if stereotype.is_some_and(|s| s.eq_ignore_ascii_case("hovedklasse")) {
            return Self::MainClass;
        }
        if !has_extension {
            return Self::Table;
        }
        let tag = stereotype
            .filter(|s| !s.is_empty())
            .or(s_type.filter(|s| !s.is_empty()))
            .unwrap_or_else(|| xmi_type.strip_prefix("uml:").unwrap_or(xmi_type));
        Self::from_tag(tag)
    }

    /// Maps a free-form tag onto a known variant, case-insensitively.
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_lowercase().as_str() {
            "mainclass" | "hovedklasse" => Self::MainClass,
            "abstract" => Self::Abstract,
            "class" => Self::Class,
            "datatype" => Self::DataType,
            "enumeration" => Self::Enumeration,
            "codelist" => Self::CodeList,
            "referanse" => Self::Reference,
            "table" => Self::Table,
            _ => Self::Other(tag.to_string()),
        }
    }

    /// The lower-case tag used for rendering classes and for search.
    pub fn as_str(&self) -> &str {
        match self {
            Self::MainClass => "mainclass",
            Self::Abstract => "abstract",
            Self::Class => "class",
            Self::DataType => "datatype",
            Self::Enumeration => "enumeration",
            Self::CodeList => "codelist",
            Self::Reference => "referanse",
            Self::Table => "table",
            Self::Other(tag) => tag,
        }
    }

    /// The type description shown in the documentation view.
    pub fn description(&self) -> &'static str {
        match self {
            Self::MainClass => "Hovedklasse",
            Self::Class => "Kompleks datatype",
            Self::CodeList => "Utlisting",
            Self::DataType => "Datatype",
            Self::Enumeration => "Enumerering",
            Self::Abstract => "Abstrakt",
            Self::Reference => "Referanse",
            Self::Table | Self::Other(_) => "",
        }
    }
}

impl fmt::Display for ClassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
