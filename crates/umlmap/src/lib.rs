//! Umlmap - searchable, force-directed diagrams of Enterprise Architect UML models.
//!
//! Loading, filtering, layout and rendering for XMI exports. A model is read
//! with [`umlmap_parser`], narrowed down by a free-text search and hidden
//! stereotypes, laid out by a force simulation, and rendered as SVG or JSON.
//!
//! Interactive front ends drive a [`controller::DiagramController`] instead;
//! [`DiagramBuilder`] runs the same pipeline in one shot.

pub mod config;
pub mod controller;
pub mod error;
pub mod export;
pub mod filter;
pub mod layout;
pub mod session;

pub use umlmap_core::{color, geometry, identifier, semantic};

pub use error::UmlmapError;

use std::{collections::HashSet, fs, path::Path};

use log::{debug, info, trace};

use config::AppConfig;
use export::{Diagram, Exporter, JsonExporter, SvgExporter};
use filter::SearchContext;
use identifier::XmiId;
use layout::{NodeSizer, Simulation, WorkingSet};
use semantic::Model;

/// Serialization of an XMI export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// The XMI document after XML-to-JSON conversion.
    Json,
    /// The XMI XML as exported.
    Xml,
}

impl InputFormat {
    /// Guesses the format from a file extension; anything but `.xml` and
    /// `.xmi` is taken to be JSON.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use umlmap::InputFormat;
    ///
    /// assert_eq!(InputFormat::from_path(Path::new("fint.xmi")), InputFormat::Xml);
    /// assert_eq!(InputFormat::from_path(Path::new("fint.json")), InputFormat::Json);
    /// ```
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("xml") || ext.eq_ignore_ascii_case("xmi") => {
                Self::Xml
            }
            _ => Self::Json,
        }
    }
}

/// Builder for loading, laying out and rendering UML models.
///
/// # Examples
///
/// ```rust,no_run
/// use std::{collections::HashSet, path::Path};
/// use umlmap::{DiagramBuilder, config::AppConfig};
///
/// let builder = DiagramBuilder::new(AppConfig::default());
///
/// // Load a model from an export
/// let model = builder.load(Path::new("fint.xmi"))
///     .expect("Failed to load");
///
/// // Lay out everything matching "person"
/// let simulation = builder.layout(&model, "person", &HashSet::new(), 300)
///     .expect("Failed to lay out");
///
/// // Render the result
/// let svg = builder.render_svg(&model, &simulation)
///     .expect("Failed to render");
/// ```
#[derive(Debug, Default)]
pub struct DiagramBuilder {
    config: AppConfig,
}

impl DiagramBuilder {
    /// Create a new diagram builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Maps an export held in memory.
    ///
    /// # Errors
    ///
    /// Returns [`UmlmapError::Map`] for malformed input or an invalid
    /// package tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use umlmap::{DiagramBuilder, InputFormat};
    ///
    /// let source = r#"{"uml:Model": {"packagedElement": {
    ///     "xmi:type": "uml:Package", "xmi:id": "ROOT", "name": "Root"}}}"#;
    /// let model = DiagramBuilder::default()
    ///     .parse(source, InputFormat::Json)
    ///     .unwrap();
    /// assert_eq!(model.root().unwrap().name(), "Root");
    /// ```
    pub fn parse(&self, source: &str, format: InputFormat) -> Result<Model, UmlmapError> {
        info!(format:? = format; "Parsing model");
        let model = match format {
            InputFormat::Json => umlmap_parser::map_json_str(source)?,
            InputFormat::Xml => umlmap_parser::map_xml_str(source)?,
        };
        debug!(
            entities = model.len(),
            stereotypes = model.stereotypes().len();
            "Model parsed successfully"
        );
        Ok(model)
    }

    /// Reads and maps an export file; the format follows the extension.
    ///
    /// # Errors
    ///
    /// Returns [`UmlmapError::Io`] if the file cannot be read, otherwise as
    /// [`parse`](Self::parse).
    pub fn load(&self, path: &Path) -> Result<Model, UmlmapError> {
        let file_name = path.display().to_string();
        info!(file_name = file_name.as_str(); "Loading model");
        let source = fs::read_to_string(path)?;
        self.parse(&source, InputFormat::from_path(path))
    }

    /// Lays out the nodes visible under `search`, minus `hidden`
    /// stereotypes, for at most `max_ticks` ticks.
    ///
    /// # Errors
    ///
    /// Returns [`UmlmapError::Model`] when visibility cannot be evaluated,
    /// e.g. for a class with several supertypes.
    pub fn layout(
        &self,
        model: &Model,
        search: &str,
        hidden: &HashSet<XmiId>,
        max_ticks: usize,
    ) -> Result<Simulation, UmlmapError> {
        let ctx = SearchContext::new(search);
        let sizer = NodeSizer::new(self.config.style());
        let set = WorkingSet::build(model, &ctx, hidden, &sizer, self.config.layout())?;
        info!(nodes = set.len(), links = set.links().len(); "Working set built");

        let mut simulation = Simulation::new(set, self.config.layout());
        let ticks = simulation.run(max_ticks);
        info!(ticks = ticks, settled = simulation.is_settled(); "Layout calculated");
        trace!(overlap = simulation.total_overlap_area(); "Remaining overlap");
        Ok(simulation)
    }

    /// Renders a laid out model to an SVG string.
    ///
    /// # Errors
    ///
    /// Returns [`UmlmapError::Config`] for invalid style colors.
    pub fn render_svg(&self, model: &Model, simulation: &Simulation) -> Result<String, UmlmapError> {
        let exporter = SvgExporter::new(self.config.style())?;
        let svg = exporter.render(&Diagram::from_simulation(model, simulation))?;
        info!("SVG rendered successfully");
        Ok(svg)
    }

    /// Renders node positions and relation links as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`UmlmapError::Export`] if serialization fails.
    pub fn render_json(&self, model: &Model, simulation: &Simulation) -> Result<String, UmlmapError> {
        JsonExporter::new()
            .with_pretty(true)
            .render(&Diagram::from_simulation(model, simulation))
    }
}
