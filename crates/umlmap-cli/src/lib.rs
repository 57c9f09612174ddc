//! Umlmap CLI library
//!
//! This module contains the core CLI logic for the umlmap layout tool.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, OutputFormat};

use std::{collections::HashSet, path::Path};

use log::{info, warn};

use umlmap::{
    DiagramBuilder, UmlmapError,
    export::{Diagram, Exporter, JsonExporter, SvgExporter},
    identifier::XmiId,
    semantic::Model,
};

/// Run the umlmap CLI application
///
/// This function loads the input export, lays out the part of the model
/// selected by the search and hidden stereotypes, and writes the result to
/// the output file.
///
/// # Errors
///
/// Returns `UmlmapError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed or structurally invalid exports
/// - Rendering errors
pub fn run(args: &Args) -> Result<(), UmlmapError> {
    info!(
        input_path = args.input.as_str(),
        output_path = args.output.as_str();
        "Processing model"
    );

    let app_config = config::load_config(args.config.as_ref())?;
    let builder = DiagramBuilder::new(app_config);

    let model = builder.load(Path::new(&args.input))?;
    let hidden = resolve_stereotypes(&model, &args.hide);
    let simulation = builder.layout(&model, &args.search, &hidden, args.ticks)?;

    let diagram = Diagram::from_simulation(&model, &simulation);
    let exporter: Box<dyn Exporter> = match args.format {
        OutputFormat::Svg => Box::new(SvgExporter::new(builder.config().style())?),
        OutputFormat::Json => Box::new(JsonExporter::new().with_pretty(true)),
    };
    exporter.write_to(&diagram, Path::new(&args.output))?;

    info!(
        output_file = args.output.as_str(),
        format:? = args.format;
        "Diagram exported successfully"
    );

    Ok(())
}

/// Maps stereotype names to ids, case-insensitively; unknown names are skipped.
fn resolve_stereotypes(model: &Model, names: &[String]) -> HashSet<XmiId> {
    let mut hidden = HashSet::new();
    for name in names {
        let found = model.stereotypes().iter().copied().find(|&id| {
            model
                .package(id)
                .is_some_and(|s| s.name().eq_ignore_ascii_case(name))
        });
        match found {
            Some(id) => {
                hidden.insert(id);
            }
            None => warn!(stereotype = name.as_str(); "Unknown stereotype, not hiding"),
        }
    }
    hidden
}
