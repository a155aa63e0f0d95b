//! draw.io (`mxfile`) projection.
//!
//! Each page becomes a `diagram` element holding an `mxGraphModel`. Inside
//! the model, cells `0` and `1` are the root and the default layer; every
//! shape becomes a vertex cell and every resolvable connection an edge cell,
//! both parented to the layer.
//!
//! Cell ids come from an [`IdAllocator`] owned by the exporter. For each
//! page, ids are handed out to all shapes first, in page order, and then to
//! all resolved connections. The allocator is never reset, so ids are unique
//! across every page and every export made with the same exporter.

use std::{borrow::Cow, collections::HashMap};

use log::{debug, info};
use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, Event, attributes::Attribute},
    name::QName,
};
use stencil_core::{DocumentGraph, Geometry, PageGraph, ShapeKind};

use crate::export::{ExportError, Exporter};

const MXFILE_ATTRIBUTES: [(&str, &str); 5] = [
    ("host", "app.diagrams.net"),
    ("modified", "2024-01-01T00:00:00.000Z"),
    ("agent", "stencil"),
    ("version", "1.0"),
    ("etag", "generated"),
];

const GRAPH_MODEL_ATTRIBUTES: [(&str, &str); 15] = [
    ("dx", "1422"),
    ("dy", "794"),
    ("grid", "1"),
    ("gridSize", "10"),
    ("guides", "1"),
    ("tooltips", "1"),
    ("connect", "1"),
    ("arrows", "1"),
    ("fold", "1"),
    ("page", "1"),
    ("pageScale", "1"),
    ("pageWidth", "827"),
    ("pageHeight", "1169"),
    ("math", "0"),
    ("shadow", "0"),
];

const BASE_STYLE: &str = "rounded=0;whiteSpace=wrap;html=1;";

const EDGE_STYLE: &str =
    "edgeStyle=orthogonalEdgeStyle;rounded=0;orthogonalLoop=1;jettySize=auto;html=1;";

/// Id of the default layer every cell is parented to.
const LAYER_ID: &str = "1";

/// Hands out draw.io cell ids.
///
/// Ids `0` and `1` are reserved for the root cell and the default layer, so
/// allocation starts at [`IdAllocator::FIRST`] and only ever increases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    /// The first id handed out.
    pub const FIRST: u64 = 2;

    pub fn new() -> Self {
        Self { next: Self::FIRST }
    }

    /// Returns a fresh id.
    pub fn allocate(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// The id the next call to [`IdAllocator::allocate`] returns.
    pub fn peek(&self) -> u64 {
        self.next
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Style string for a shape bucket.
///
/// # Examples
///
/// ```
/// use stencil::export::drawio::style_for;
/// use stencil_core::ShapeKind;
///
/// assert_eq!(
///     style_for(ShapeKind::Decision),
///     "rounded=0;whiteSpace=wrap;html=1;rhombus;fillColor=#fff2cc;strokeColor=#d6b656;"
/// );
/// ```
pub fn style_for(kind: ShapeKind) -> String {
    let suffix = match kind {
        ShapeKind::Process => "fillColor=#dae8fc;strokeColor=#6c8ebf;",
        ShapeKind::Decision => "rhombus;fillColor=#fff2cc;strokeColor=#d6b656;",
        ShapeKind::Terminal => "ellipse;fillColor=#d5e8d4;strokeColor=#82b366;",
        ShapeKind::Image => "shape=image;imageAspect=0;aspect=fixed;",
        ShapeKind::Generic => "fillColor=#f8cecc;strokeColor=#b85450;",
    };
    format!("{BASE_STYLE}{suffix}")
}

/// Projects documents into draw.io XML.
///
/// The exporter is a session: its id allocator and page counter carry over
/// from one [`Exporter::export`] call to the next. Use a fresh exporter to
/// start numbering from scratch.
#[derive(Debug, Default)]
pub struct DrawioExporter {
    ids: IdAllocator,
    pages: u64,
}

impl DrawioExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id allocator of this session.
    pub fn ids(&self) -> &IdAllocator {
        &self.ids
    }

    /// Number of pages written so far.
    pub fn pages_written(&self) -> u64 {
        self.pages
    }

    fn write_page(
        &mut self,
        writer: &mut Writer<Vec<u8>>,
        page: &PageGraph,
    ) -> Result<(), ExportError> {
        let diagram_id = format!("page_{}", self.pages);
        self.pages += 1;

        let diagram = BytesStart::new("diagram")
            .with_attributes([("id", diagram_id.as_str())])
            .with_attributes([escaped("name", page.name())]);
        writer.write_event(Event::Start(diagram))?;

        let model = BytesStart::new("mxGraphModel").with_attributes(GRAPH_MODEL_ATTRIBUTES);
        writer.write_event(Event::Start(model))?;
        writer.write_event(Event::Start(BytesStart::new("root")))?;

        writer.write_event(Event::Empty(
            BytesStart::new("mxCell").with_attributes([("id", "0")]),
        ))?;
        writer.write_event(Event::Empty(
            BytesStart::new("mxCell").with_attributes([("id", LAYER_ID), ("parent", "0")]),
        ))?;

        let mut cell_ids: HashMap<&str, u64> = HashMap::with_capacity(page.shapes().len());
        for shape in page.shapes() {
            let id = self.ids.allocate();
            cell_ids.insert(shape.id(), id);
            write_vertex(writer, id, shape.text(), &style_for(shape.kind()), shape.geometry())?;
        }

        let mut edges = 0usize;
        for connection in page.connections() {
            let (Some(&source), Some(&target)) = (
                cell_ids.get(connection.from()),
                cell_ids.get(connection.to()),
            ) else {
                continue;
            };

            let id = self.ids.allocate();
            write_edge(writer, id, source, target)?;
            edges += 1;
        }

        writer.write_event(Event::End(BytesEnd::new("root")))?;
        writer.write_event(Event::End(BytesEnd::new("mxGraphModel")))?;
        writer.write_event(Event::End(BytesEnd::new("diagram")))?;

        debug!(
            page = page.name(),
            vertices = page.shapes().len(),
            edges,
            dropped = page.connections().len() - edges;
            "Projected page to draw.io"
        );
        Ok(())
    }
}

impl Exporter for DrawioExporter {
    fn export(&mut self, document: &DocumentGraph) -> Result<String, ExportError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::Start(
            BytesStart::new("mxfile").with_attributes(MXFILE_ATTRIBUTES),
        ))?;

        for page in document {
            self.write_page(&mut writer, page)?;
        }

        writer.write_event(Event::End(BytesEnd::new("mxfile")))?;

        info!(pages = document.len(), next_id = self.ids.peek(); "draw.io export complete");
        Ok(String::from_utf8(writer.into_inner())?)
    }
}

fn write_vertex(
    writer: &mut Writer<Vec<u8>>,
    id: u64,
    text: &str,
    style: &str,
    geometry: Geometry,
) -> Result<(), ExportError> {
    let id = id.to_string();
    let cell = BytesStart::new("mxCell")
        .with_attributes([("id", id.as_str())])
        .with_attributes([escaped("value", text), escaped("style", style)])
        .with_attributes([("vertex", "1"), ("parent", LAYER_ID)]);
    writer.write_event(Event::Start(cell))?;

    let (x, y, width, height) = (
        format_number(geometry.x()),
        format_number(geometry.y()),
        format_number(geometry.width()),
        format_number(geometry.height()),
    );
    writer.write_event(Event::Empty(BytesStart::new("mxGeometry").with_attributes([
        ("x", x.as_str()),
        ("y", y.as_str()),
        ("width", width.as_str()),
        ("height", height.as_str()),
        ("as", "geometry"),
    ])))?;

    writer.write_event(Event::End(BytesEnd::new("mxCell")))?;
    Ok(())
}

fn write_edge(
    writer: &mut Writer<Vec<u8>>,
    id: u64,
    source: u64,
    target: u64,
) -> Result<(), ExportError> {
    let (id, source, target) = (id.to_string(), source.to_string(), target.to_string());
    let cell = BytesStart::new("mxCell").with_attributes([
        ("id", id.as_str()),
        ("style", EDGE_STYLE),
        ("edge", "1"),
        ("parent", LAYER_ID),
        ("source", source.as_str()),
        ("target", target.as_str()),
    ]);
    writer.write_event(Event::Start(cell))?;
    writer.write_event(Event::Empty(
        BytesStart::new("mxGeometry").with_attributes([("relative", "1"), ("as", "geometry")]),
    ))?;
    writer.write_event(Event::End(BytesEnd::new("mxCell")))?;
    Ok(())
}

/// An attribute whose value is escaped here rather than by the writer.
///
/// Free text may hold line breaks and tabs, which must survive as character
/// references; attribute-value normalization would turn them into spaces.
fn escaped<'a>(key: &'a str, value: &str) -> Attribute<'a> {
    Attribute {
        key: QName(key.as_bytes()),
        value: Cow::Owned(escape_attribute(value).into_bytes()),
    }
}

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\n' => escaped.push_str("&#10;"),
            '\r' => escaped.push_str("&#13;"),
            '\t' => escaped.push_str("&#9;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Shortest round-trip form, with integral values keeping one decimal.
fn format_number(value: f64) -> String {
    let formatted = value.to_string();
    if value.is_finite() && !formatted.contains('.') {
        format!("{formatted}.0")
    } else {
        formatted
    }
}
