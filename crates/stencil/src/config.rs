//! Configuration types for Stencil conversions.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from a
//! TOML file. Every field has a default, so an empty file (or no file at
//! all) yields a working configuration.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration.
//! - [`OutputConfig`] - Output format and directory.
//! - [`MermaidConfig`] - Mermaid projection options.
//! - [`OcrConfig`] - Text extraction service settings.
//!
//! # Example
//!
//! ```
//! # use stencil::config::{AppConfig, OutputFormat};
//! let config = AppConfig::default();
//! assert_eq!(config.output().format(), OutputFormat::Drawio);
//! assert_eq!(config.mermaid().max_label_length(), 50);
//! assert!(!config.ocr().is_configured());
//! ```

use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use serde::Deserialize;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Output configuration section.
    #[serde(default)]
    output: OutputConfig,

    /// Mermaid configuration section.
    #[serde(default)]
    mermaid: MermaidConfig,

    /// OCR configuration section.
    #[serde(default)]
    ocr: OcrConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(output: OutputConfig, mermaid: MermaidConfig, ocr: OcrConfig) -> Self {
        Self {
            output,
            mermaid,
            ocr,
        }
    }

    /// Returns the output configuration.
    pub fn output(&self) -> &OutputConfig {
        &self.output
    }

    /// Returns the output configuration for modification.
    pub fn output_mut(&mut self) -> &mut OutputConfig {
        &mut self.output
    }

    /// Returns the Mermaid configuration.
    pub fn mermaid(&self) -> &MermaidConfig {
        &self.mermaid
    }

    /// Returns the OCR configuration.
    pub fn ocr(&self) -> &OcrConfig {
        &self.ocr
    }

    /// Returns the OCR configuration for modification.
    pub fn ocr_mut(&mut self) -> &mut OcrConfig {
        &mut self.ocr
    }
}

/// Target representation of a conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// draw.io `mxfile` XML.
    #[default]
    Drawio,
    /// Mermaid flowchart text.
    Mermaid,
    /// Both of the above, from a single decode.
    Both,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Drawio => "drawio",
            Self::Mermaid => "mermaid",
            Self::Both => "both",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drawio" => Ok(Self::Drawio),
            "mermaid" => Ok(Self::Mermaid),
            "both" => Ok(Self::Both),
            other => Err(format!(
                "unknown output format `{other}` (expected drawio, mermaid or both)"
            )),
        }
    }
}

/// Output format and location.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    format: OutputFormat,

    /// Directory for generated files when no explicit output path is given.
    #[serde(default = "default_output_directory")]
    directory: PathBuf,
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("output")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            directory: default_output_directory(),
        }
    }
}

impl OutputConfig {
    pub fn new(format: OutputFormat, directory: impl Into<PathBuf>) -> Self {
        Self {
            format,
            directory: directory.into(),
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn set_format(&mut self, format: OutputFormat) {
        self.format = format;
    }

    pub fn set_directory(&mut self, directory: impl Into<PathBuf>) {
        self.directory = directory.into();
    }
}

/// Mermaid projection options.
#[derive(Debug, Clone, Deserialize)]
pub struct MermaidConfig {
    /// Labels longer than this many characters are truncated.
    #[serde(default = "default_max_label_length")]
    max_label_length: usize,
}

fn default_max_label_length() -> usize {
    50
}

impl Default for MermaidConfig {
    fn default() -> Self {
        Self {
            max_label_length: default_max_label_length(),
        }
    }
}

impl MermaidConfig {
    pub fn new(max_label_length: usize) -> Self {
        Self { max_label_length }
    }

    pub fn max_label_length(&self) -> usize {
        self.max_label_length
    }
}

/// Text extraction (OCR) service settings.
///
/// OCR only runs when it is enabled and an API key is present.
#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    #[serde(default = "default_true")]
    enabled: bool,

    #[serde(default)]
    api_key: Option<String>,

    #[serde(default = "default_api_url")]
    api_url: String,

    #[serde(default = "default_model")]
    model: String,

    /// Results below this confidence are reported, but still used.
    #[serde(default = "default_confidence_threshold")]
    confidence_threshold: f64,

    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,

    /// Extra attempts after a transport error or a server error.
    #[serde(default = "default_retries")]
    retries: u32,

    /// Images are downscaled so their longer side is at most this many pixels.
    #[serde(default = "default_max_image_size")]
    max_image_size: u32,
}

fn default_true() -> bool {
    true
}

fn default_api_url() -> String {
    "https://api.mistral.ai/v1".to_string()
}

fn default_model() -> String {
    "pixtral-12b-2409".to_string()
}

fn default_confidence_threshold() -> f64 {
    0.8
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retries() -> u32 {
    2
}

fn default_max_image_size() -> u32 {
    1024
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            api_key: None,
            api_url: default_api_url(),
            model: default_model(),
            confidence_threshold: default_confidence_threshold(),
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
            max_image_size: default_max_image_size(),
        }
    }
}

impl OcrConfig {
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// The API key, if one is set and non-empty.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.is_empty())
    }

    /// The API base URL, without a trailing slash.
    pub fn api_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn confidence_threshold(&self) -> f64 {
        self.confidence_threshold
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn max_image_size(&self) -> u32 {
        self.max_image_size
    }

    /// Returns `true` if OCR is enabled and has credentials.
    pub fn is_configured(&self) -> bool {
        self.enabled && self.api_key().is_some()
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        self.api_key = Some(api_key.into());
    }

    pub fn set_api_url(&mut self, api_url: impl Into<String>) {
        self.api_url = api_url.into();
    }

    pub fn set_confidence_threshold(&mut self, threshold: f64) {
        self.confidence_threshold = threshold;
    }

    pub fn set_max_image_size(&mut self, max_image_size: u32) {
        self.max_image_size = max_image_size;
    }
}
