//! Error types for umlmap operations.
//!
//! [`UmlmapError`] wraps the conditions that can occur between reading an
//! export and writing a rendered diagram.

use std::io;

use thiserror::Error;

use umlmap_core::semantic::ModelError;
use umlmap_parser::error::MapError;

/// The main error type for umlmap operations.
#[derive(Debug, Error)]
pub enum UmlmapError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Map(#[from] MapError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Layout error: {0}")]
    Layout(String),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error>),
}

impl From<serde_json::Error> for UmlmapError {
    fn from(error: serde_json::Error) -> Self {
        Self::Export(Box::new(error))
    }
}

impl UmlmapError {
    /// Returns `true` when the error means the requested input does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io(err) if err.kind() == io::ErrorKind::NotFound)
    }
}
