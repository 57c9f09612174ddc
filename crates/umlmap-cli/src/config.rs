//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory).

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use umlmap::{UmlmapError, config::AppConfig};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<ConfigError> for UmlmapError {
    fn from(err: ConfigError) -> Self {
        UmlmapError::Config(err.to_string())
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (umlmap/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed or names invalid colors
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, UmlmapError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("umlmap/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "umlmap", "umlmap") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Load configuration from a TOML file
///
/// # Errors
///
/// Returns error if:
/// - File doesn't exist
/// - File cannot be read
/// - TOML parsing fails
/// - The layout constants are out of range or a color is invalid
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, UmlmapError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    let config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
    validate(&config)?;

    Ok(config)
}

fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    let layout = config.layout();
    let canvas = layout.canvas();
    if canvas.width() <= 0.0 || canvas.height() <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "canvas must be positive, got {}x{}",
            canvas.width(),
            canvas.height()
        )));
    }
    if !(0.0..1.0).contains(&layout.alpha_min()) {
        return Err(ConfigError::Validation(format!(
            "alpha_min must lie in [0, 1), got {}",
            layout.alpha_min()
        )));
    }
    if !(0.0..=1.0).contains(&layout.velocity_decay()) {
        return Err(ConfigError::Validation(format!(
            "velocity_decay must lie in [0, 1], got {}",
            layout.velocity_decay()
        )));
    }

    let style = config.style();
    style.background_color().map_err(ConfigError::Validation)?;
    style.palette().map_err(ConfigError::Validation)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_explicit_partial_config() {
        let file = write_config(
            r#"
            [layout]
            width = 640
            sticky = false

            [style]
            palette = ["red", "blue"]
            "#,
        );
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.layout().canvas().width(), 640.0);
        assert_eq!(config.layout().canvas().height(), 800.0);
        assert!(!config.layout().sticky());
        assert_eq!(config.style().palette().unwrap().len(), 2);
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = load_config(Some("does/not/exist.toml")).unwrap_err();
        assert!(matches!(err, UmlmapError::Config(msg) if msg.contains("Missing configuration file")));
    }

    #[test]
    fn test_invalid_toml() {
        let file = write_config("[layout\nwidth = ");
        let err = load_config(Some(file.path())).unwrap_err();
        assert!(matches!(err, UmlmapError::Config(msg) if msg.starts_with("Failed to parse")));
    }

    #[test]
    fn test_validation() {
        let file = write_config("[style]\nbackground_color = \"not-a-color\"\n");
        let err = load_config(Some(file.path())).unwrap_err();
        assert!(matches!(err, UmlmapError::Config(msg) if msg.starts_with("Validation error")));

        let file = write_config("[layout]\nwidth = 0\n");
        assert!(load_config(Some(file.path())).is_err());
    }
}
