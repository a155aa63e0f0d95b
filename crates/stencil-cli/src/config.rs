//! Configuration loading for the CLI
//!
//! This module finds and loads the TOML configuration file from the usual
//! locations (explicit path, local directory, system directory) and then
//! applies environment variable overrides on top of it.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info, warn};
use thiserror::Error;

use stencil::{
    StencilError,
    config::{AppConfig, OutputFormat},
};

/// Overrides the OCR API key.
pub const ENV_API_KEY: &str = "MISTRAL_API_KEY";
/// Overrides the OCR API base URL.
pub const ENV_API_URL: &str = "MISTRAL_API_URL";
/// Overrides the output format (`drawio`, `mermaid` or `both`).
pub const ENV_OUTPUT_FORMAT: &str = "DEFAULT_OUTPUT_FORMAT";
/// Overrides the output directory.
pub const ENV_OUTPUT_DIRECTORY: &str = "OUTPUT_DIRECTORY";
/// Overrides the OCR confidence threshold (0.0 to 1.0).
pub const ENV_CONFIDENCE_THRESHOLD: &str = "OCR_CONFIDENCE_THRESHOLD";

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

impl From<ConfigError> for StencilError {
    fn from(err: ConfigError) -> Self {
        StencilError::Config(err.to_string())
    }
}

/// Find and load configuration, then apply environment overrides
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (stencil/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
/// - The resulting configuration is invalid
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, StencilError> {
    let mut config = find_config(explicit_path)?;
    apply_env_overrides(&mut config, |name| env::var(name).ok());
    validate(&config)?;
    Ok(config)
}

fn find_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, StencilError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("stencil/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "stencil", "stencil") {
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
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, StencilError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;

    let config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    Ok(config)
}

/// Apply overrides from the environment.
///
/// `lookup` returns the value of a variable, if set. Values that cannot be
/// parsed are skipped with a warning.
pub fn apply_env_overrides(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(api_key) = lookup(ENV_API_KEY) {
        debug!(variable = ENV_API_KEY; "Overriding OCR API key");
        config.ocr_mut().set_api_key(api_key);
    }

    if let Some(api_url) = lookup(ENV_API_URL) {
        debug!(variable = ENV_API_URL, value = api_url.as_str(); "Overriding OCR API URL");
        config.ocr_mut().set_api_url(api_url);
    }

    if let Some(value) = lookup(ENV_OUTPUT_FORMAT) {
        match value.parse::<OutputFormat>() {
            Ok(format) => config.output_mut().set_format(format),
            Err(reason) => warn!(variable = ENV_OUTPUT_FORMAT, reason; "Ignoring invalid override"),
        }
    }

    if let Some(directory) = lookup(ENV_OUTPUT_DIRECTORY).filter(|dir| !dir.trim().is_empty()) {
        debug!(variable = ENV_OUTPUT_DIRECTORY, value = directory.as_str(); "Overriding output directory");
        config.output_mut().set_directory(directory);
    }

    if let Some(value) = lookup(ENV_CONFIDENCE_THRESHOLD) {
        match parse_threshold(&value) {
            Some(threshold) => config.ocr_mut().set_confidence_threshold(threshold),
            None => warn!(
                variable = ENV_CONFIDENCE_THRESHOLD,
                value;
                "Ignoring invalid override, expected a number between 0 and 1"
            ),
        }
    }
}

fn parse_threshold(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|threshold| (0.0..=1.0).contains(threshold))
}

fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    let threshold = config.ocr().confidence_threshold();
    if !(0.0..=1.0).contains(&threshold) {
        return Err(ConfigError::Validation(format!(
            "ocr.confidence_threshold must be between 0 and 1, got {threshold}"
        )));
    }

    if config.mermaid().max_label_length() == 0 {
        return Err(ConfigError::Validation(
            "mermaid.max_label_length must be at least 1".to_string(),
        ));
    }

    if config.ocr().max_image_size() == 0 {
        return Err(ConfigError::Validation(
            "ocr.max_image_size must be at least 1".to_string(),
        ));
    }

    Ok(())
}
