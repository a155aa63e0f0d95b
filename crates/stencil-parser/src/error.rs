//! Error and diagnostic system for the Stencil decoder.
//!
//! Decoding distinguishes two kinds of problems:
//!
//! - [`DecodeError`] is fatal. The package could not be opened or its
//!   document descriptor is missing or malformed, so there is nothing to
//!   decode.
//! - [`Diagnostic`] is local. A page, an image or another unit could not be
//!   decoded; the unit is skipped or degraded and decoding continues. These
//!   are gathered by a [`DiagnosticCollector`] and handed back to the caller.
//!
//! # Example
//!
//! ```
//! # use stencil_parser::error::{Diagnostic, ErrorCode};
//!
//! let diag = Diagnostic::warning("page `Overview` could not be decoded")
//!     .with_code(ErrorCode::E102)
//!     .with_part("visio/pages/page1.xml")
//!     .with_help("the page part is not well-formed XML");
//! ```

mod collector;
mod decode_error;
mod diagnostic;
mod error_code;
mod severity;

pub use collector::DiagnosticCollector;
pub use decode_error::DecodeError;
pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use severity::Severity;
