//! Page decoding.

use std::{
    io::{Read, Seek},
    str,
};

use log::debug;
use roxmltree::Document;
use stencil_core::PageGraph;

use crate::{
    document::PageDescriptor,
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    package::Package,
    shape::{decode_connection, decode_shape},
    xml::visio_descendants,
};

/// Decodes the page described by `descriptor`.
///
/// Shapes and connections are collected from anywhere below the page root,
/// each in document order. Shape-level problems go to `collector`; a
/// problem with the page part itself is returned as the error and the page
/// should be skipped.
pub(crate) fn decode_page<R: Read + Seek>(
    package: &mut Package<R>,
    descriptor: &PageDescriptor,
    collector: &mut DiagnosticCollector,
) -> Result<PageGraph, Diagnostic> {
    let part = descriptor.path();
    let page_error = |code: ErrorCode, message: String| {
        Diagnostic::warning(format!(
            "page `{}` could not be decoded: {message}",
            descriptor.name()
        ))
        .with_code(code)
        .with_part(part)
    };

    let bytes = match package.read_part(part) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            return Err(page_error(
                ErrorCode::E100,
                "part is missing from the package".to_string(),
            ));
        }
        Err(err) => return Err(page_error(ErrorCode::E101, err.to_string())),
    };

    let xml = str::from_utf8(&bytes)
        .map_err(|err| page_error(ErrorCode::E102, format!("part is not UTF-8: {err}")))?;
    let doc = Document::parse(xml)
        .map_err(|err| page_error(ErrorCode::E102, format!("malformed XML: {err}")))?;

    let root = doc.root_element();
    let shapes: Vec<_> = visio_descendants(root, "Shape")
        .map(|shape| decode_shape(shape, package, part, collector))
        .collect();
    let connections: Vec<_> = visio_descendants(root, "Connect")
        .filter_map(decode_connection)
        .collect();

    debug!(
        page = descriptor.name(),
        shapes = shapes.len(),
        connections = connections.len();
        "Decoded page"
    );

    Ok(PageGraph::new(
        descriptor.id(),
        descriptor.name(),
        shapes,
        connections,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{package::test_support::package, xml::VISIO_NS};

    const PART: &str = "visio/pages/page1.xml";

    fn descriptor() -> PageDescriptor {
        PageDescriptor::new("0", "Overview", PART)
    }

    fn decode(parts: &[(&str, &[u8])]) -> (Result<PageGraph, Diagnostic>, Vec<Diagnostic>) {
        let mut pkg = package(parts);
        let mut collector = DiagnosticCollector::new();
        let result = decode_page(&mut pkg, &descriptor(), &mut collector);
        (result, collector.finish())
    }

    #[test]
    fn test_nested_shapes_and_connections_in_order() {
        let xml = format!(
            r#"<PageContents xmlns="{VISIO_NS}">
                 <Shapes>
                   <Shape ID="1"><Text>Group</Text>
                     <Shapes><Shape ID="2"/><Shape ID="3"/></Shapes>
                   </Shape>
                   <Shape ID="4"/>
                 </Shapes>
                 <Connects>
                   <Connect FromSheet="2" ToSheet="3"/>
                   <Connect FromSheet="9"/>
                   <Connect FromSheet="3" ToSheet="4"/>
                 </Connects>
               </PageContents>"#
        );
        let (result, warnings) = decode(&[(PART, xml.as_bytes())]);
        let page = result.unwrap();

        let ids: Vec<_> = page.shapes().iter().map(|shape| shape.id()).collect();
        assert_eq!(ids, ["1", "2", "3", "4"]);
        assert_eq!(page.connections().len(), 2);
        assert_eq!(page.connections()[1].from(), "3");
        assert_eq!(page.id(), "0");
        assert_eq!(page.name(), "Overview");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_missing_part() {
        let (result, _) = decode(&[]);
        let diagnostic = result.unwrap_err();

        assert_eq!(diagnostic.code(), Some(ErrorCode::E100));
        assert!(diagnostic.message().contains("Overview"));
        assert_eq!(diagnostic.part(), Some(PART));
    }

    #[test]
    fn test_not_utf8() {
        let (result, _) = decode(&[(PART, &[0xff, 0xfe, 0x00])]);

        assert_eq!(result.unwrap_err().code(), Some(ErrorCode::E102));
    }

    #[test]
    fn test_malformed_xml() {
        let (result, _) = decode(&[(PART, b"<PageContents><Shapes>")]);

        assert_eq!(result.unwrap_err().code(), Some(ErrorCode::E102));
    }

    #[test]
    fn test_empty_page() {
        let (result, _) = decode(&[(PART, b"<PageContents/>")]);
        let page = result.unwrap();

        assert!(page.shapes().is_empty());
        assert!(page.connections().is_empty());
    }
}
