//! Error types for Stencil operations.
//!
//! This module provides the main error type [`StencilError`], covering
//! everything that stops a conversion. Problems that only degrade the
//! result are [`Diagnostic`](stencil_parser::error::Diagnostic) warnings
//! instead and never surface here.

use std::io;

use thiserror::Error;

use stencil_parser::error::{DecodeError, ErrorCode};

use crate::export::ExportError;

/// The main error type for Stencil operations.
#[derive(Debug, Error)]
pub enum StencilError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("input file `{0}` does not exist")]
    InputNotFound(String),

    #[error("unsupported input `{path}`: {reason}")]
    UnsupportedInput { path: String, reason: String },

    #[error("{0}")]
    Decode(#[from] DecodeError),

    #[error("no pages could be decoded from `{0}`")]
    NoPages(String),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl StencilError {
    /// The diagnostic code of a decode failure, if this is one.
    pub fn decode_code(&self) -> Option<ErrorCode> {
        match self {
            Self::Decode(err) => Some(err.code()),
            _ => None,
        }
    }
}
