//! How much a recovered problem affects the converted document.
//!
//! Fatal conditions never become diagnostics; they are
//! [`DecodeError`](crate::error::DecodeError)s. A diagnostic always
//! describes a document that was still converted.

use std::fmt;

/// Impact of a recovered problem on the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    /// Nothing was lost, but the result deserves a second look.
    ///
    /// Used for OCR text accepted below the confidence threshold.
    Advice,

    /// A page, shape image or OCR result is missing from the output.
    Warning,
}

impl Severity {
    /// Returns `true` if content was dropped or degraded.
    pub fn is_warning(&self) -> bool {
        matches!(self, Severity::Warning)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Advice => "advice",
            Severity::Warning => "warning",
        })
    }
}
