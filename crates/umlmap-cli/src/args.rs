//! Command-line argument definitions for the umlmap CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, configuration file
//! selection, what part of the model is shown, and logging verbosity.

use clap::{Parser, ValueEnum};

/// Output document kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Standalone SVG drawing
    Svg,
    /// Node positions and relation links as JSON
    Json,
}

/// Command-line arguments for the umlmap layout tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input XMI export (.xml/.xmi, or .json after conversion)
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Path to the output file
    #[arg(short, long, default_value = "out.svg")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Free-text search; only matching classes and their packages are shown
    #[arg(short, long, default_value = "")]
    pub search: String,

    /// Stereotype to hide, by name; may be repeated
    #[arg(long = "hide", value_name = "STEREOTYPE")]
    pub hide: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Svg)]
    pub format: OutputFormat,

    /// Upper bound on simulation ticks before the layout is written
    #[arg(long, default_value_t = 1000)]
    pub ticks: usize,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["umlmap", "model.xmi"]);
        assert_eq!(args.input, "model.xmi");
        assert_eq!(args.output, "out.svg");
        assert_eq!(args.format, OutputFormat::Svg);
        assert!(args.search.is_empty());
        assert!(args.hide.is_empty());
        assert_eq!(args.ticks, 1000);
    }

    #[test]
    fn test_repeated_hide() {
        let args = Args::parse_from([
            "umlmap", "model.xmi", "--hide", "Felles", "--hide", "Utdanning", "-f", "json",
            "-s", "person",
        ]);
        assert_eq!(args.hide, vec!["Felles", "Utdanning"]);
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.search, "person");
    }
}
