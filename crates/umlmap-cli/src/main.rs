//! Umlmap CLI entry point.

use std::{fs, process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use umlmap_cli::{Args, error_adapter::to_reportable};

fn main() {
    // Install miette's pretty panic hook early for better panic reports
    miette::set_panic_hook();

    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:? = log_level; "Starting umlmap");
    debug!(args:? = args; "Parsed arguments");

    if let Err(err) = umlmap_cli::run(&args) {
        let reporter = miette::GraphicalReportHandler::new();
        // Syntax errors are labelled in the input text.
        let source = fs::read_to_string(&args.input).ok();

        let mut writer = String::new();
        reporter
            .render_report(&mut writer, &to_reportable(&err, source.as_deref()))
            .expect("Writing to String buffer is infallible");
        error!("{writer}");

        process::exit(1);
    }

    info!("Completed successfully");
}
