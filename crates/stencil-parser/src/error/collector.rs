//! Collector for accumulating diagnostics during decoding.
//!
//! The [`DiagnosticCollector`] lets every decoding unit report problems
//! without failing the whole document.

use crate::error::Diagnostic;

/// A collector for accumulating diagnostics during decoding.
///
/// # Example
///
/// ```
/// # use stencil_parser::error::{Diagnostic, DiagnosticCollector, ErrorCode};
///
/// let mut collector = DiagnosticCollector::new();
///
/// collector.emit(
///     Diagnostic::warning("page `Flow` could not be decoded")
///         .with_code(ErrorCode::E102)
///         .with_part("visio/pages/page2.xml"),
/// );
///
/// assert_eq!(collector.len(), 1);
/// let diagnostics = collector.finish();
/// assert_eq!(diagnostics.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a diagnostic to this collector.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Number of diagnostics emitted so far.
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Returns `true` if nothing has been emitted.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Finish collection and return the diagnostics in emission order.
    pub fn finish(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
