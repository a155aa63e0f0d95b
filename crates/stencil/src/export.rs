//! Projections of a decoded document into output grammars.

pub mod drawio;
pub mod mermaid;

use std::string::FromUtf8Error;

use stencil_core::DocumentGraph;
use thiserror::Error;

/// A projection of a [`DocumentGraph`] into text.
///
/// Exporters only borrow the graph. They take `&mut self` because an
/// exporter may carry state across calls, such as the cell-id counters of
/// [`drawio::DrawioExporter`].
pub trait Exporter {
    /// Projects every page of `document` into one output text.
    fn export(&mut self, document: &DocumentGraph) -> Result<String, ExportError>;
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("XML write error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("output is not valid UTF-8: {0}")]
    Encoding(#[from] FromUtf8Error),
}
