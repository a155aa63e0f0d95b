//! Stencil - convert Visio diagrams to draw.io XML and Mermaid flowcharts.
//!
//! A `.vsdx` package is decoded into a page/shape/connection graph, image
//! text is optionally recognized through an OCR service, and the graph is
//! then projected into one or both output grammars.

pub mod config;
pub mod export;
pub mod ocr;

mod error;

pub use stencil_parser::error::{Diagnostic, ErrorCode, Severity};

pub use error::StencilError;

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info, trace, warn};

use stencil_core::DocumentGraph;

use config::{AppConfig, OutputFormat};
use export::{Exporter, drawio::DrawioExporter, mermaid::MermaidExporter};
use ocr::{MistralClient, TextExtractor, augment_with_ocr};

/// File extension of draw.io output.
pub const DRAWIO_EXTENSION: &str = "drawio";

/// File extension of Mermaid output.
pub const MERMAID_EXTENSION: &str = "md";

const SUPPORTED_EXTENSIONS: [&str; 2] = ["vsdx", "vsdm"];
const LEGACY_EXTENSION: &str = "vsd";

/// A decoded, possibly OCR-augmented document.
#[derive(Debug)]
pub struct Diagram {
    document: DocumentGraph,
    warnings: Vec<Diagnostic>,
}

impl Diagram {
    pub fn document(&self) -> &DocumentGraph {
        &self.document
    }

    /// Recoverable problems from decoding and OCR, in the order they occurred.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }
}

/// What a conversion wrote.
#[derive(Debug)]
pub struct ConversionReport {
    outputs: Vec<PathBuf>,
    pages: usize,
    warnings: Vec<Diagnostic>,
}

impl ConversionReport {
    /// Files written, in the order they were written.
    pub fn outputs(&self) -> &[PathBuf] {
        &self.outputs
    }

    pub fn pages(&self) -> usize {
        self.pages
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }
}

/// Facade for decoding and converting Visio packages.
///
/// # Examples
///
/// ```rust,no_run
/// use stencil::{Converter, config::{AppConfig, OutputFormat}};
///
/// let converter = Converter::new(AppConfig::default());
///
/// // Decode once, project as needed
/// let diagram = converter.decode("flow.vsdx").expect("Failed to decode");
/// let xml = converter.render_drawio(&diagram).expect("Failed to render");
/// let markup = converter.render_mermaid(&diagram).expect("Failed to render");
///
/// // Or convert straight to files
/// let report = converter
///     .convert("flow.vsdx", OutputFormat::Both, None)
///     .expect("Failed to convert");
/// println!("wrote {:?}", report.outputs());
/// ```
pub struct Converter {
    config: AppConfig,
    extractor: Option<Box<dyn TextExtractor>>,
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl Converter {
    /// Create a new converter with the given configuration.
    ///
    /// When OCR is enabled and an API key is configured, a
    /// [`MistralClient`] is set up as the text extractor.
    pub fn new(config: AppConfig) -> Self {
        let extractor: Option<Box<dyn TextExtractor>> = if config.ocr().is_configured() {
            match MistralClient::new(config.ocr()) {
                Ok(client) => Some(Box::new(client)),
                Err(err) => {
                    warn!(err:%; "Text extraction disabled");
                    None
                }
            }
        } else {
            debug!("Text extraction not configured");
            None
        };

        Self { config, extractor }
    }

    /// Replaces the text extractor.
    pub fn with_extractor(mut self, extractor: impl TextExtractor + 'static) -> Self {
        self.extractor = Some(Box::new(extractor));
        self
    }

    /// Disables text extraction.
    pub fn without_ocr(mut self) -> Self {
        self.extractor = None;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Returns `true` if a text extractor is set.
    pub fn has_ocr(&self) -> bool {
        self.extractor.is_some()
    }

    /// Returns `true` if a text extractor is set and reachable.
    pub fn is_ocr_available(&self) -> bool {
        self.extractor
            .as_ref()
            .is_some_and(|extractor| extractor.is_available())
    }

    /// Decode a package and run text extraction over its images.
    ///
    /// # Errors
    ///
    /// Returns `StencilError` if the input does not exist, is not a `.vsdx`
    /// or `.vsdm` file, cannot be decoded, or yields no pages.
    pub fn decode(&self, input: impl AsRef<Path>) -> Result<Diagram, StencilError> {
        let input = input.as_ref();
        check_input(input)?;

        let (mut document, mut warnings) = stencil_parser::decode_file(input)?.into_parts();
        if document.is_empty() {
            return Err(StencilError::NoPages(input.display().to_string()));
        }

        if let Some(extractor) = &self.extractor {
            let report = augment_with_ocr(&mut document, &**extractor, self.config.ocr());
            warnings.extend(report.into_warnings());
        }

        for warning in &warnings {
            debug!(warning:%; "Recovered during conversion");
        }

        let warning_count = warnings
            .iter()
            .filter(|warning| warning.severity().is_warning())
            .count();
        info!(
            pages = document.len(),
            warnings = warning_count,
            advice = warnings.len() - warning_count;
            "Diagram decoded"
        );
        trace!(document:?; "Decoded document");

        Ok(Diagram { document, warnings })
    }

    /// Render a diagram as draw.io XML.
    ///
    /// Cell ids start at 2 for every call.
    ///
    /// # Errors
    ///
    /// Returns `StencilError::Export` if the XML cannot be written.
    pub fn render_drawio(&self, diagram: &Diagram) -> Result<String, StencilError> {
        Ok(DrawioExporter::new().export(&diagram.document)?)
    }

    /// Render a diagram as Mermaid flowchart text.
    ///
    /// # Errors
    ///
    /// Returns `StencilError::Export` if rendering fails.
    pub fn render_mermaid(&self, diagram: &Diagram) -> Result<String, StencilError> {
        let mut exporter = MermaidExporter::new(self.config.mermaid().max_label_length());
        Ok(exporter.export(&diagram.document)?)
    }

    /// Lists the decoded pages as `(id, name)` pairs.
    ///
    /// Text extraction is skipped.
    ///
    /// # Errors
    ///
    /// See [`Converter::decode`].
    pub fn list_pages(&self, input: impl AsRef<Path>) -> Result<Vec<(String, String)>, StencilError> {
        let input = input.as_ref();
        check_input(input)?;

        let decoded = stencil_parser::decode_file(input)?;
        let pages: Vec<_> = decoded
            .document()
            .pages()
            .iter()
            .map(|page| (page.id().to_string(), page.name().to_string()))
            .collect();

        if pages.is_empty() {
            return Err(StencilError::NoPages(input.display().to_string()));
        }
        Ok(pages)
    }

    /// Convert a package and write the result to disk.
    ///
    /// With [`OutputFormat::Both`] the package is decoded once and written
    /// to `<directory>/<stem>.drawio` and `<directory>/<stem>.md`, where
    /// `directory` is the configured output directory. For a single format,
    /// `output` overrides the default path. Missing parent directories are
    /// created.
    ///
    /// # Errors
    ///
    /// Returns `StencilError` if decoding, rendering or writing fails.
    pub fn convert(
        &self,
        input: impl AsRef<Path>,
        format: OutputFormat,
        output: Option<&Path>,
    ) -> Result<ConversionReport, StencilError> {
        let input = input.as_ref();
        info!(input:? = input, format:%; "Converting diagram");

        let diagram = self.decode(input)?;
        let directory = self.config.output().directory();

        let mut outputs = Vec::new();
        if matches!(format, OutputFormat::Drawio | OutputFormat::Both) {
            let path = match (format, output) {
                (OutputFormat::Drawio, Some(output)) => output.to_path_buf(),
                _ => default_output_path(input, directory, DRAWIO_EXTENSION),
            };
            write_output(&path, &self.render_drawio(&diagram)?)?;
            outputs.push(path);
        }
        if matches!(format, OutputFormat::Mermaid | OutputFormat::Both) {
            let path = match (format, output) {
                (OutputFormat::Mermaid, Some(output)) => output.to_path_buf(),
                _ => default_output_path(input, directory, MERMAID_EXTENSION),
            };
            write_output(&path, &self.render_mermaid(&diagram)?)?;
            outputs.push(path);
        }

        Ok(ConversionReport {
            outputs,
            pages: diagram.document.len(),
            warnings: diagram.warnings,
        })
    }
}

/// `<directory>/<input stem>.<extension>`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
///
/// let path = stencil::default_output_path(Path::new("in/flow.vsdx"), Path::new("out"), "md");
/// assert_eq!(path, Path::new("out/flow.md"));
/// ```
pub fn default_output_path(input: &Path, directory: &Path, extension: &str) -> PathBuf {
    let mut file_name = input
        .file_stem()
        .unwrap_or(input.as_os_str())
        .to_os_string();
    file_name.push(".");
    file_name.push(extension);
    directory.join(file_name)
}

/// Returns `true` if `path` has an extension this crate decodes.
pub fn is_supported_input(path: &Path) -> bool {
    extension_of(path).is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Returns `true` if `path` looks like a legacy binary Visio file.
pub fn is_legacy_input(path: &Path) -> bool {
    extension_of(path).is_some_and(|ext| ext == LEGACY_EXTENSION)
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

fn check_input(input: &Path) -> Result<(), StencilError> {
    if !input.exists() {
        return Err(StencilError::InputNotFound(input.display().to_string()));
    }

    if is_legacy_input(input) {
        return Err(StencilError::UnsupportedInput {
            path: input.display().to_string(),
            reason: "legacy binary .vsd files are not supported; save as .vsdx".to_string(),
        });
    }

    if !is_supported_input(input) {
        return Err(StencilError::UnsupportedInput {
            path: input.display().to_string(),
            reason: "expected a .vsdx or .vsdm file".to_string(),
        });
    }

    Ok(())
}

fn write_output(path: &Path, content: &str) -> Result<(), StencilError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    info!(path:? = path; "Output written");
    Ok(())
}
