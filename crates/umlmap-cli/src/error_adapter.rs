//! Error adapter for converting UmlmapError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI. Malformed input
//! documents are reported with a label pointing into the source when the
//! source text is available.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use umlmap::{UmlmapError, semantic::ModelError};
use umlmap_parser::error::MapError;

/// Adapter for a syntax error in the input document.
pub struct SourceAdapter<'a> {
    err: &'a MapError,
    src: &'a str,
    offset: usize,
}

impl<'a> SourceAdapter<'a> {
    /// Wraps `err` if it carries a position inside `src`.
    pub fn new(err: &'a MapError, src: &'a str) -> Option<Self> {
        let (line, column) = match err {
            MapError::Json(e) => (e.line(), e.column()),
            MapError::Xml(e) => {
                let pos = e.pos();
                (pos.row as usize, pos.col as usize)
            }
            _ => return None,
        };
        let offset = offset_of(src, line, column)?;
        Some(Self { err, src, offset })
    }
}

impl fmt::Debug for SourceAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceAdapter")
            .field("err", &self.err)
            .field("offset", &self.offset)
            .finish()
    }
}

impl fmt::Display for SourceAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.err, f)
    }
}

impl std::error::Error for SourceAdapter<'_> {}

impl MietteDiagnostic for SourceAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.err.code()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        help_for_map(self.err).map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = SourceSpan::new(self.offset.into(), 0);
        Some(Box::new(std::iter::once(
            LabeledSpan::new_primary_with_span(Some("here".to_string()), span),
        )))
    }
}

/// Adapter for errors without a source position.
pub struct ErrorAdapter<'a>(pub &'a UmlmapError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            UmlmapError::Io(_) => "umlmap::io",
            UmlmapError::Map(err) => err.code(),
            UmlmapError::Model(_) => "umlmap::model",
            UmlmapError::Config(_) => "umlmap::config",
            UmlmapError::Layout(_) => "umlmap::layout",
            UmlmapError::Export(_) => "umlmap::export",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            err if err.is_not_found() => Some("check that the input file exists"),
            UmlmapError::Map(err) => help_for_map(err),
            UmlmapError::Model(err) => help_for_model(err),
            _ => None,
        };
        help.map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        None
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A syntax error with its location in the input.
    Source(SourceAdapter<'a>),
    /// A simple error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Source(s) => fmt::Display::fmt(s, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Source(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Source(s) => s.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Source(s) => s.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Source(s) => s.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Source(s) => s.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Convert an [`UmlmapError`] into a reportable error.
///
/// Syntax errors in the input document point into `src` when it is given.
pub fn to_reportable<'a>(err: &'a UmlmapError, src: Option<&'a str>) -> Reportable<'a> {
    if let (UmlmapError::Map(map_err), Some(src)) = (err, src) {
        if let Some(adapter) = SourceAdapter::new(map_err, src) {
            return Reportable::Source(adapter);
        }
    }
    Reportable::Error(ErrorAdapter(err))
}

fn help_for_map(err: &MapError) -> Option<&'static str> {
    match err {
        MapError::Json(_) => Some("files ending in anything but .xml or .xmi are read as JSON"),
        MapError::Xml(_) => Some("the input must be a well-formed XMI export"),
        MapError::MissingModel => Some("export the model from Enterprise Architect as XMI 2.1"),
        MapError::Model(err) => help_for_model(err),
    }
}

fn help_for_model(err: &ModelError) -> Option<&'static str> {
    match err {
        ModelError::MultipleSupertypes { .. } => Some("a class may specialize at most one class"),
        ModelError::MissingRoot(_) | ModelError::Orphan(_) => {
            Some("every package and class must sit below the root package")
        }
        ModelError::ParentCycle(_) => None,
    }
}

/// Byte offset of the 1-based `line` and `column` in `src`.
///
/// Columns past the end of the line are clamped to its end.
fn offset_of(src: &str, line: usize, column: usize) -> Option<usize> {
    let line = line.checked_sub(1)?;
    let mut start = 0;
    for (i, text) in src.split_inclusive('\n').enumerate() {
        if i == line {
            let column = column.saturating_sub(1);
            let within = text
                .char_indices()
                .nth(column)
                .map_or(text.trim_end_matches('\n').len(), |(byte, _)| byte);
            return Some(start + within);
        }
        start += text.len();
    }
    (line == 0 && src.is_empty()).then_some(0)
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn test_offset_of() {
        let src = "ab\ncdé\nf";
        assert_eq!(offset_of(src, 1, 1), Some(0));
        assert_eq!(offset_of(src, 2, 2), Some(4));
        assert_eq!(offset_of(src, 2, 9), Some(7));
        assert_eq!(offset_of(src, 3, 1), Some(8));
        assert_eq!(offset_of(src, 4, 1), None);
        assert_eq!(offset_of(src, 0, 1), None);
        assert_eq!(offset_of("", 1, 1), Some(0));
    }

    #[test]
    fn test_json_error_points_into_source() {
        let src = "{\n  \"a\": ,\n}";
        let err = UmlmapError::from(umlmap_parser::map_json_str(src).unwrap_err());

        let reportable = to_reportable(&err, Some(src));
        let Reportable::Source(adapter) = &reportable else {
            panic!("Expected Source");
        };
        assert_eq!(adapter.code().unwrap().to_string(), "E001");

        let labels: Vec<_> = reportable.labels().unwrap().collect();
        assert_eq!(labels.len(), 1);
        assert!(labels[0].primary());
        // Somewhere on the second line.
        assert!((2..=10).contains(&labels[0].offset()));
    }

    #[test]
    fn test_without_source() {
        let src = "{";
        let err = UmlmapError::from(umlmap_parser::map_json_str(src).unwrap_err());
        assert!(matches!(to_reportable(&err, None), Reportable::Error(_)));
    }

    #[test]
    fn test_non_parse_error() {
        let err = UmlmapError::Config("bad palette".to_string());

        let reportable = to_reportable(&err, Some(""));
        match &reportable {
            Reportable::Error(e) => {
                assert_eq!(e.to_string(), "Configuration error: bad palette");
                assert_eq!(e.code().unwrap().to_string(), "umlmap::config");
            }
            Reportable::Source(_) => panic!("Expected Error"),
        }
    }

    #[test]
    fn test_not_found_help() {
        let err = UmlmapError::Io(io::Error::new(io::ErrorKind::NotFound, "gone"));
        let adapter = ErrorAdapter(&err);
        assert_eq!(adapter.code().unwrap().to_string(), "umlmap::io");
        assert!(adapter.help().is_some());
    }

    #[test]
    fn test_missing_model_code() {
        let err = UmlmapError::from(umlmap_parser::map_json_str("{}").unwrap_err());
        let reportable = to_reportable(&err, Some("{}"));
        assert!(matches!(reportable, Reportable::Error(_)));
        assert_eq!(reportable.code().unwrap().to_string(), "E100");
    }
}
