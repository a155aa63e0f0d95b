//! Stencil CLI library
//!
//! This module contains the command dispatch for the Stencil converter.
//! Results meant for the user (written files, page listings, status) go to
//! the supplied writer; progress and problems go through the logger.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, Command, Format};
pub use config::{ConfigError, apply_env_overrides, load_config};

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use log::{debug, error, info, warn};

use stencil::{
    Converter, Diagnostic, StencilError, config::OutputFormat, is_legacy_input,
    is_supported_input,
};

use error_adapter::{render, to_reportable, to_reportables};

/// Outcome of a batch run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub converted: usize,
    pub failed: usize,
}

/// Run the Stencil CLI application, writing results to stdout.
///
/// # Errors
///
/// Returns `StencilError` for:
/// - Configuration loading errors
/// - Missing or unsupported input files
/// - Decoding errors
/// - Output write errors
pub fn run(args: &Args) -> Result<(), StencilError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(args, &mut out)
}

/// Run a command, writing results to `out`.
///
/// # Errors
///
/// See [`run`].
pub fn execute(args: &Args, out: &mut impl Write) -> Result<(), StencilError> {
    let app_config = load_config(args.config.as_ref())?;

    match &args.command {
        Command::Convert {
            input,
            format,
            output,
            no_ocr,
        } => {
            let format = format.map_or(app_config.output().format(), OutputFormat::from);
            let converter = Converter::new(app_config);
            let converter = if *no_ocr {
                converter.without_ocr()
            } else {
                if !converter.is_ocr_available() {
                    warn!(
                        "Text extraction is not available; set MISTRAL_API_KEY to extract text from images"
                    );
                }
                converter
            };
            convert(&converter, input, format, output.as_deref(), out)
        }
        Command::Info { input } => info(&Converter::new(app_config).without_ocr(), input, out),
        Command::Check => check(&Converter::new(app_config), out),
        Command::Batch {
            directory,
            format,
            recursive,
        } => {
            let format = format.map_or(app_config.output().format(), OutputFormat::from);
            let converter = Converter::new(app_config);
            batch(&converter, directory, format, *recursive, out).map(|_| ())
        }
    }
}

fn convert(
    converter: &Converter,
    input: &Path,
    format: OutputFormat,
    output: Option<&Path>,
    out: &mut impl Write,
) -> Result<(), StencilError> {
    if output.is_some() && format == OutputFormat::Both {
        warn!("Ignoring --output when converting to both formats");
    }

    let report = converter.convert(input, format, output)?;
    report_warnings(report.warnings());

    for path in report.outputs() {
        writeln!(out, "{}", path.display())?;
    }

    info!(
        pages = report.pages(),
        outputs = report.outputs().len();
        "Conversion completed"
    );
    Ok(())
}

fn info(converter: &Converter, input: &Path, out: &mut impl Write) -> Result<(), StencilError> {
    let pages = converter.list_pages(input)?;

    for (id, name) in &pages {
        writeln!(out, "{id}: {name}")?;
    }

    info!(pages = pages.len(); "Listed pages");
    Ok(())
}

fn check(converter: &Converter, out: &mut impl Write) -> Result<(), StencilError> {
    let config = converter.config();
    let directory = config.output().directory();

    let directory_status = if directory.is_dir() {
        "exists"
    } else {
        "created on first write"
    };
    let ocr_status = if converter.is_ocr_available() {
        "available"
    } else if config.ocr().is_configured() {
        "configured but unreachable"
    } else {
        "not configured (set MISTRAL_API_KEY)"
    };

    writeln!(out, "output format:    {}", config.output().format())?;
    writeln!(
        out,
        "output directory: {} ({directory_status})",
        directory.display()
    )?;
    writeln!(out, "label length:     {}", config.mermaid().max_label_length())?;
    writeln!(out, "OCR:              {ocr_status}")?;
    writeln!(out, "OCR model:        {}", config.ocr().model())?;
    writeln!(out, "OCR threshold:    {}", config.ocr().confidence_threshold())?;
    Ok(())
}

/// Convert every Visio file in `directory`.
///
/// Each file is converted on its own; a failure is reported and the batch
/// moves on. Legacy `.vsd` files are counted as failures.
///
/// # Errors
///
/// Returns `StencilError` only if the directory cannot be read or the
/// summary cannot be written.
pub fn batch(
    converter: &Converter,
    directory: &Path,
    format: OutputFormat,
    recursive: bool,
    out: &mut impl Write,
) -> Result<BatchSummary, StencilError> {
    let files = find_visio_files(directory, recursive)?;
    info!(directory:? = directory, files = files.len(); "Starting batch conversion");

    let mut summary = BatchSummary::default();
    if files.is_empty() {
        writeln!(out, "no Visio files found in {}", directory.display())?;
        return Ok(summary);
    }

    for file in &files {
        match converter.convert(file, format, None) {
            Ok(report) => {
                report_warnings(report.warnings());
                let outputs: Vec<_> = report
                    .outputs()
                    .iter()
                    .map(|path| path.display().to_string())
                    .collect();
                writeln!(out, "ok     {} -> {}", file.display(), outputs.join(", "))?;
                summary.converted += 1;
            }
            Err(err) => {
                error!("{}", render(&to_reportable(&err)));
                writeln!(out, "failed {}: {err}", file.display())?;
                summary.failed += 1;
            }
        }
    }

    writeln!(
        out,
        "{} converted, {} failed",
        summary.converted, summary.failed
    )?;
    Ok(summary)
}

/// Collect `.vsdx`, `.vsdm` and legacy `.vsd` files, sorted by path.
fn find_visio_files(directory: &Path, recursive: bool) -> Result<Vec<PathBuf>, StencilError> {
    let mut files = Vec::new();
    let mut pending = vec![directory.to_path_buf()];

    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                if recursive {
                    pending.push(path);
                }
            } else if is_supported_input(&path) || is_legacy_input(&path) {
                files.push(path);
            } else {
                debug!(path:? = path; "Skipping non-Visio file");
            }
        }
    }

    files.sort();
    Ok(files)
}

fn report_warnings(warnings: &[Diagnostic]) {
    for reportable in to_reportables(warnings) {
        warn!("{}", render(&reportable));
    }
}
