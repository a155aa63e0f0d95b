//! Error codes for the Stencil diagnostic system.
//!
//! Error codes are organized by the unit they concern:
//! - `E0xx` - Package and document errors
//! - `E1xx` - Page errors
//! - `E2xx` - Shape and media errors
//! - `E3xx` - Text extraction (OCR) errors

use std::fmt;

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Package Errors (E0xx)
    // =========================================================================
    /// Package cannot be opened.
    ///
    /// The file does not exist, cannot be read, or is not a ZIP archive.
    E001,

    /// Missing document descriptor.
    ///
    /// The package has no `visio/document.xml` part.
    E002,

    /// Malformed document descriptor.
    ///
    /// `visio/document.xml` exists but is not well-formed UTF-8 XML.
    E003,

    /// Malformed page index.
    ///
    /// `visio/pages/pages.xml` exists but cannot be read. Pages are
    /// discovered by scanning the package instead.
    E004,

    // =========================================================================
    // Page Errors (E1xx)
    // =========================================================================
    /// Missing page part.
    ///
    /// The page index lists a page whose part is not in the package.
    E100,

    /// Unreadable page part.
    ///
    /// The page part exists but its compressed data cannot be read.
    E101,

    /// Malformed page part.
    ///
    /// The page part is not well-formed UTF-8 XML.
    E102,

    // =========================================================================
    // Shape Errors (E2xx)
    // =========================================================================
    /// Unresolved image payload.
    ///
    /// A shape embeds foreign data, but neither a media part nor an inline
    /// payload could be found. The shape is kept without image bytes.
    E200,

    /// Invalid inline image payload.
    ///
    /// The inline foreign data is not valid base64.
    E201,

    // =========================================================================
    // Text Extraction Errors (E3xx)
    // =========================================================================
    /// Text extraction failed.
    ///
    /// The OCR service could not process a shape's image. The shape text is
    /// left as decoded.
    E300,

    /// Low-confidence text extraction.
    ///
    /// The OCR result is below the configured confidence threshold. The text
    /// is still used.
    E301,

    /// Image not usable for text extraction.
    ///
    /// The payload is not a raster format that can be decoded (for example
    /// an EMF or WMF metafile). The shape is skipped by the OCR pass.
    E302,
}

impl ErrorCode {
    /// Returns the string representation of this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            // Package errors
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            // Page errors
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            // Shape errors
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            // Text extraction errors
            ErrorCode::E300 => "E300",
            ErrorCode::E301 => "E301",
            ErrorCode::E302 => "E302",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            // Package errors
            ErrorCode::E001 => "package cannot be opened",
            ErrorCode::E002 => "missing document descriptor",
            ErrorCode::E003 => "malformed document descriptor",
            ErrorCode::E004 => "malformed page index",
            // Page errors
            ErrorCode::E100 => "missing page part",
            ErrorCode::E101 => "unreadable page part",
            ErrorCode::E102 => "malformed page part",
            // Shape errors
            ErrorCode::E200 => "unresolved image payload",
            ErrorCode::E201 => "invalid inline image payload",
            // Text extraction errors
            ErrorCode::E300 => "text extraction failed",
            ErrorCode::E301 => "low-confidence text extraction",
            ErrorCode::E302 => "image not usable for text extraction",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
