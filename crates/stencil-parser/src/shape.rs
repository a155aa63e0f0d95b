//! Shape and connection decoding.

use std::io::{Read, Seek};

use roxmltree::Node;
use stencil_core::{ConnectionRecord, ShapeRecord};

use crate::{
    cells::geometry_from_cells,
    error::DiagnosticCollector,
    media::resolve_image,
    package::Package,
    text::collect_text,
    xml::{first_visio_descendant, visio_descendants},
};

/// Master id Visio reserves for the dynamic connector.
const RESERVED_CONNECTOR_MASTER: &str = "2";

const DEFAULT_SHAPE_TYPE: &str = "shape";
const CONNECTOR_SHAPE_TYPE: &str = "connector";

/// Decodes one `Shape` element.
///
/// Every attribute is optional, so this always yields a record. Problems with
/// embedded images are recorded in `collector` and the shape is kept.
pub(crate) fn decode_shape<R: Read + Seek>(
    shape: Node<'_, '_>,
    package: &mut Package<R>,
    part: &str,
    collector: &mut DiagnosticCollector,
) -> ShapeRecord {
    let id = shape.attribute("ID").unwrap_or_default();

    let text = first_visio_descendant(shape, "Text")
        .map(collect_text)
        .unwrap_or_default();

    let geometry = geometry_from_cells(
        visio_descendants(shape, "Cell")
            .filter_map(|cell| Some((cell.attribute("N")?, cell.attribute("V")?))),
    );

    let record = ShapeRecord::new(id, text, geometry, shape_type(shape));

    match first_visio_descendant(shape, "ForeignData") {
        Some(foreign_data) => {
            record.with_image(resolve_image(foreign_data, package, part, collector))
        }
        None => record,
    }
}

/// The classification tag of a shape.
///
/// Connector shapes are tagged `connector`. The tag is informational only;
/// connections come from `Connect` elements.
fn shape_type<'a>(shape: Node<'a, '_>) -> &'a str {
    let shape_type = shape.attribute("Type").unwrap_or(DEFAULT_SHAPE_TYPE);

    if shape.attribute("Master") == Some(RESERVED_CONNECTOR_MASTER) || shape_type.contains("Connect")
    {
        CONNECTOR_SHAPE_TYPE
    } else {
        shape_type
    }
}

/// Decodes one `Connect` element.
///
/// Returns `None` unless both `FromSheet` and `ToSheet` are present.
pub(crate) fn decode_connection(connect: Node<'_, '_>) -> Option<ConnectionRecord> {
    let from = connect.attribute("FromSheet")?;
    let to = connect.attribute("ToSheet")?;
    Some(ConnectionRecord::new(from, to))
}
