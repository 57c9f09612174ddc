//! Rendering of a laid out working set.
//!
//! A [`Diagram`] borrows the model and the positioned nodes of a
//! simulation; an [`Exporter`] turns it into a document.

pub mod json;
pub mod svg;

use std::{fs::File, io::Write, path::Path};

use log::{debug, error, info};

use umlmap_core::{geometry::Size, semantic::Model};

use crate::{
    error::UmlmapError,
    layout::{Simulation, WorkingSet},
};

pub use json::JsonExporter;
pub use svg::SvgExporter;

/// A snapshot of positioned nodes together with the model they came from.
#[derive(Debug, Clone, Copy)]
pub struct Diagram<'a> {
    model: &'a Model,
    set: &'a WorkingSet,
    canvas: Size,
}

impl<'a> Diagram<'a> {
    pub fn new(model: &'a Model, set: &'a WorkingSet, canvas: Size) -> Self {
        Self { model, set, canvas }
    }

    /// Captures the current state of a running simulation.
    pub fn from_simulation(model: &'a Model, simulation: &'a Simulation) -> Self {
        Self::new(model, simulation.working_set(), simulation.canvas())
    }

    pub fn model(&self) -> &'a Model {
        self.model
    }

    pub fn working_set(&self) -> &'a WorkingSet {
        self.set
    }

    pub fn canvas(&self) -> Size {
        self.canvas
    }
}

/// Turns a [`Diagram`] into a document.
pub trait Exporter {
    /// Renders the diagram to a string.
    ///
    /// # Errors
    ///
    /// Returns [`UmlmapError::Export`] when the document cannot be produced.
    fn render(&self, diagram: &Diagram<'_>) -> Result<String, UmlmapError>;

    /// Renders the diagram and writes it to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`UmlmapError::Io`] when the file cannot be created or written,
    /// or any error of [`render`](Self::render).
    fn write_to(&self, diagram: &Diagram<'_>, path: &Path) -> Result<(), UmlmapError> {
        let document = self.render(diagram)?;
        debug!(bytes = document.len(); "Document rendered");
        write_document(path, &document)
    }
}

fn write_document(path: &Path, document: &str) -> Result<(), UmlmapError> {
    let file_name = path.display().to_string();
    info!(file_name = file_name.as_str(); "Creating output file");
    let mut f = match File::create(path) {
        Ok(file) => file,
        Err(err) => {
            error!(file_name = file_name.as_str(), err:% = err; "Failed to create output file");
            return Err(err.into());
        }
    };

    if let Err(err) = f.write_all(document.as_bytes()) {
        error!(file_name = file_name.as_str(), err:% = err; "Failed to write output file");
        return Err(err.into());
    }

    Ok(())
}
