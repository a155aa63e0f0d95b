//! Decoded diagram graph types.
//!
//! This module contains the representation of a diagram after decoding and
//! before projection into an output grammar.
//!
//! # Pipeline Position
//!
//! ```text
//! Package bytes
//!     ↓ decode (stencil-parser)
//! DocumentGraph (these types)
//!     ↓ OCR augmentation (optional, appends shape text)
//! DocumentGraph
//!     ↓ export (draw.io / Mermaid)
//! Output text
//! ```
//!
//! All types are built once by the decoder and only read afterwards. The
//! one exception is [`ShapeRecord::append_ocr_text`], which must run before
//! any exporter sees the graph.

use std::fmt;

use crate::{geometry::Geometry, kind::ShapeKind};

/// One decoded shape.
///
/// The identity is the shape id from the source page. It is expected to be
/// unique within its page and is the key connections refer to.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeRecord {
    id: String,
    text: String,
    geometry: Geometry,
    shape_type: String,
    has_image: bool,
    image_data: Option<Vec<u8>>,
}

impl ShapeRecord {
    /// Creates a shape without image data.
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        geometry: Geometry,
        shape_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            geometry,
            shape_type: shape_type.into(),
            has_image: false,
            image_data: None,
        }
    }

    /// Marks the shape as image-bearing.
    ///
    /// The flag and the payload are independent: a shape can reference an
    /// image whose bytes could not be resolved, in which case `data` is
    /// `None` but [`ShapeRecord::has_image`] still returns `true`.
    pub fn with_image(mut self, data: Option<Vec<u8>>) -> Self {
        self.has_image = true;
        self.image_data = data;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// The raw classification tag, e.g. `process`, `decision` or `connector`.
    pub fn shape_type(&self) -> &str {
        &self.shape_type
    }

    pub fn has_image(&self) -> bool {
        self.has_image
    }

    pub fn image_data(&self) -> Option<&[u8]> {
        self.image_data.as_deref()
    }

    /// The style bucket for this shape.
    pub fn kind(&self) -> ShapeKind {
        ShapeKind::classify(&self.shape_type, self.has_image)
    }

    /// Whether text markup should draw this shape as a diamond.
    pub fn is_decision_like(&self) -> bool {
        ShapeKind::is_decision_like(&self.shape_type)
    }

    /// Appends recognized image text to the display text.
    ///
    /// The result is `"<existing> [OCR: <text>]"`, or `"[OCR: <text>]"` when
    /// the shape had no text. Empty `ocr_text` leaves the shape unchanged.
    pub fn append_ocr_text(&mut self, ocr_text: &str) {
        if ocr_text.is_empty() {
            return;
        }

        if self.text.is_empty() {
            self.text = format!("[OCR: {ocr_text}]");
        } else {
            self.text = format!("{} [OCR: {ocr_text}]", self.text);
        }
    }
}

/// The kind of a connection record.
///
/// Only explicit connector elements produce connections today, so there is
/// a single variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConnectionKind {
    #[default]
    Connector,
}

impl fmt::Display for ConnectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connector => write!(f, "connector"),
        }
    }
}

/// A directed connection between two shapes of the same page.
///
/// Endpoints are shape identities. They are not checked during decoding;
/// exporters drop connections whose endpoints do not resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRecord {
    from: String,
    to: String,
    kind: ConnectionKind,
}

impl ConnectionRecord {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind: ConnectionKind::Connector,
        }
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn kind(&self) -> ConnectionKind {
        self.kind
    }
}

/// The decoded content of one page.
///
/// Shape order is decode order. Exporters assign output identities in this
/// order, so it must be kept stable for deterministic output.
#[derive(Debug, Clone, PartialEq)]
pub struct PageGraph {
    id: String,
    name: String,
    shapes: Vec<ShapeRecord>,
    connections: Vec<ConnectionRecord>,
}

impl PageGraph {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        shapes: Vec<ShapeRecord>,
        connections: Vec<ConnectionRecord>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            shapes,
            connections,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shapes(&self) -> &[ShapeRecord] {
        &self.shapes
    }

    /// Mutable access to shapes, for OCR text augmentation.
    pub fn shapes_mut(&mut self) -> &mut [ShapeRecord] {
        &mut self.shapes
    }

    pub fn connections(&self) -> &[ConnectionRecord] {
        &self.connections
    }

    /// Looks up a shape by its identity.
    ///
    /// When several shapes share an identity the last one is returned,
    /// matching how exporters resolve connection endpoints.
    pub fn shape(&self, id: &str) -> Option<&ShapeRecord> {
        self.shapes.iter().rev().find(|shape| shape.id == id)
    }
}

/// The ordered pages of one decoded document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentGraph {
    pages: Vec<PageGraph>,
}

impl DocumentGraph {
    pub fn new(pages: Vec<PageGraph>) -> Self {
        Self { pages }
    }

    pub fn pages(&self) -> &[PageGraph] {
        &self.pages
    }

    pub fn pages_mut(&mut self) -> &mut [PageGraph] {
        &mut self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Iterates over every shape of every page, in page then decode order.
    pub fn shapes(&self) -> impl Iterator<Item = &ShapeRecord> {
        self.pages.iter().flat_map(|page| page.shapes.iter())
    }

    /// Iterates mutably over every shape of every page.
    pub fn shapes_mut(&mut self) -> impl Iterator<Item = &mut ShapeRecord> {
        self.pages.iter_mut().flat_map(|page| page.shapes.iter_mut())
    }
}

impl From<Vec<PageGraph>> for DocumentGraph {
    fn from(pages: Vec<PageGraph>) -> Self {
        Self::new(pages)
    }
}

impl IntoIterator for DocumentGraph {
    type Item = PageGraph;
    type IntoIter = std::vec::IntoIter<PageGraph>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages.into_iter()
    }
}

impl<'a> IntoIterator for &'a DocumentGraph {
    type Item = &'a PageGraph;
    type IntoIter = std::slice::Iter<'a, PageGraph>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages.iter()
    }
}
