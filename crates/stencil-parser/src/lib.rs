//! Visio package decoder for Stencil.
//!
//! This crate turns a `.vsdx` package into a [`stencil_core::DocumentGraph`]:
//! the pages of the document, each with its shapes and the connections
//! between them.
//!
//! # Pipeline
//!
//! ```text
//! .vsdx (ZIP)
//!     ↓ package    - part lookup
//!     ↓ document   - descriptor check, page enumeration
//!     ↓ page       - per-page XML
//!     ↓ shape      - text, cells, image payloads
//! DocumentGraph + warnings
//! ```
//!
//! # Example
//!
//! ```no_run
//! let decoded = stencil_parser::decode_file("diagram.vsdx")?;
//!
//! for warning in decoded.warnings() {
//!     eprintln!("{warning}");
//! }
//! for page in decoded.document() {
//!     println!("{}: {} shapes", page.name(), page.shapes().len());
//! }
//! # Ok::<(), stencil_parser::error::DecodeError>(())
//! ```

pub mod document;
pub mod error;
pub mod package;

mod cells;
mod media;
mod page;
mod shape;
mod text;
mod xml;

pub use cells::geometry_from_cells;
pub use document::{Decoded, PageDescriptor, decode_bytes, decode_file, decode_package};
pub use media::media_candidates;
