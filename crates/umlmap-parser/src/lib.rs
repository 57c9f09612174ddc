//! Mapper from Enterprise Architect XMI exports to the umlmap model.
//!
//! This crate turns a raw XMI document, either as JSON produced by an
//! XML-to-JSON converter or as the XMI XML itself, into the typed
//! [`Model`] arena of `umlmap-core`.
//!
//! # Pipeline
//!
//! ```text
//! XMI XML ──xml_to_value──▶ JSON tree ──map_document──▶ Model
//! ```
//!
//! Repeated elements may appear as a single object or an array depending on
//! their cardinality; every container field goes through
//! [`normalize::as_sequence`]. Dangling references are kept as raw ids and
//! resolve to `None` on access.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//!
//! let doc = json!({
//!     "xmi:XMI": {
//!         "uml:Model": {
//!             "packagedElement": {
//!                 "xmi:type": "uml:Package", "xmi:id": "ROOT", "name": "FINT",
//!                 "packagedElement": {
//!                     "xmi:type": "uml:Package", "xmi:id": "S1", "name": "Felles",
//!                     "packagedElement": { "xmi:type": "uml:Class", "xmi:id": "C1", "name": "Person" }
//!                 }
//!             }
//!         }
//!     }
//! });
//!
//! let model = umlmap_parser::map_document(&doc).unwrap();
//! assert_eq!(model.stereotypes().len(), 1);
//! assert_eq!(model.find_by_id("felles_person").unwrap().name(), "Person");
//! ```

pub mod error;
mod mapper;
pub mod normalize;
pub mod xml;

use log::info;
use serde_json::Value;
use umlmap_core::semantic::Model;

use crate::{error::MapError, mapper::Mapper};

/// Maps a parsed XMI JSON document into a model.
///
/// # Errors
///
/// Returns [`MapError::MissingModel`] if the document has no `uml:Model`,
/// or [`MapError::Model`] if the package tree is structurally invalid.
pub fn map_document(doc: &Value) -> Result<Model, MapError> {
    info!("Mapping XMI document");
    Mapper::map(doc)
}

/// Parses JSON text and maps it into a model.
///
/// # Errors
///
/// Returns [`MapError::Json`] for malformed JSON, otherwise as [`map_document`].
pub fn map_json_str(text: &str) -> Result<Model, MapError> {
    let doc: Value = serde_json::from_str(text)?;
    map_document(&doc)
}

/// Parses XMI XML and maps it into a model.
///
/// # Errors
///
/// Returns [`MapError::Xml`] for malformed XML, otherwise as [`map_document`].
pub fn map_xml_str(text: &str) -> Result<Model, MapError> {
    let doc = xml::xml_to_value(text)?;
    map_document(&doc)
}
