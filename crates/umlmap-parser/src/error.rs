//! Errors produced while mapping a document into a model.

use thiserror::Error;

use umlmap_core::semantic::ModelError;

/// A document could not be mapped.
///
/// Only failures that leave no usable model are errors. Dangling references
/// and oddly shaped containers are tolerated and logged.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid XML: {0}")]
    Xml(#[from] roxmltree::Error),

    /// No `uml:Model` element was found in the document.
    #[error("document contains no `uml:Model` element")]
    MissingModel,

    /// The mapped entities violate a structural invariant.
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl MapError {
    /// Stable code for this error, used in diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Json(_) => "E001",
            Self::Xml(_) => "E002",
            Self::MissingModel => "E100",
            Self::Model(ModelError::MultipleSupertypes { .. }) => "E200",
            Self::Model(ModelError::MissingRoot(_)) => "E201",
            Self::Model(ModelError::ParentCycle(_)) => "E202",
            Self::Model(ModelError::Orphan(_)) => "E203",
        }
    }
}
