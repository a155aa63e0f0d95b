//! Command-line argument definitions for the Stencil CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Global flags select the configuration file and logging
//! verbosity; the [`Command`] picks what to do.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use stencil::config::OutputFormat;

/// Command-line arguments for the Stencil converter
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert a Visio file to draw.io XML and/or Mermaid
    Convert {
        /// Path to the input .vsdx or .vsdm file
        input: PathBuf,

        /// Output format (defaults to the configured format)
        #[arg(short, long, value_enum)]
        format: Option<Format>,

        /// Output file path (ignored when the format is `both`)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip text extraction from images
        #[arg(long)]
        no_ocr: bool,
    },

    /// List the pages of a Visio file
    Info {
        /// Path to the input .vsdx or .vsdm file
        input: PathBuf,
    },

    /// Report the effective configuration and OCR availability
    Check,

    /// Convert every Visio file in a directory
    Batch {
        /// Directory to scan
        directory: PathBuf,

        /// Output format (defaults to the configured format)
        #[arg(short, long, value_enum)]
        format: Option<Format>,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,
    },
}

/// Output format as accepted on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
#[value(rename_all = "lowercase")]
pub enum Format {
    Drawio,
    Mermaid,
    Both,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Drawio => OutputFormat::Drawio,
            Format::Mermaid => OutputFormat::Mermaid,
            Format::Both => OutputFormat::Both,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_convert() {
        let args = Args::parse_from([
            "stencil",
            "--log-level",
            "debug",
            "convert",
            "flow.vsdx",
            "-f",
            "both",
            "--no-ocr",
        ]);

        assert_eq!(args.log_level, "debug");
        match args.command {
            Command::Convert {
                input,
                format,
                output,
                no_ocr,
            } => {
                assert_eq!(input, PathBuf::from("flow.vsdx"));
                assert_eq!(format, Some(Format::Both));
                assert_eq!(output, None);
                assert!(no_ocr);
            }
            other => panic!("Expected convert, got {other:?}"),
        }
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let args = Args::parse_from(["stencil", "check", "--config", "custom.toml"]);

        assert_eq!(args.config.as_deref(), Some("custom.toml"));
        assert!(matches!(args.command, Command::Check));
    }

    #[test]
    fn test_parse_batch() {
        let args = Args::parse_from(["stencil", "batch", "diagrams", "-r"]);

        match args.command {
            Command::Batch {
                directory,
                format,
                recursive,
            } => {
                assert_eq!(directory, PathBuf::from("diagrams"));
                assert_eq!(format, None);
                assert!(recursive);
            }
            other => panic!("Expected batch, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_unknown_format() {
        let result = Args::try_parse_from(["stencil", "convert", "a.vsdx", "-f", "svg"]);

        assert!(result.is_err());
    }

    #[test]
    fn test_format_conversion() {
        assert_eq!(OutputFormat::from(Format::Mermaid), OutputFormat::Mermaid);
        assert_eq!(OutputFormat::from(Format::Both), OutputFormat::Both);
    }
}
