//! Document decoding: the entry point of the decoder.
//!
//! Decoding is best-effort. Only a package that cannot be opened or that
//! lacks a well-formed document descriptor fails outright. Everything else
//! (a broken page index, an unreadable page, an unresolved image) becomes a
//! warning in [`Decoded::warnings`] and the rest of the document is kept.

use std::{
    io::{Cursor, Read, Seek},
    path::Path,
    str,
};

use log::{debug, info, trace};
use roxmltree::Document;
use stencil_core::{DocumentGraph, PageGraph};

use crate::{
    error::{DecodeError, Diagnostic, DiagnosticCollector, ErrorCode},
    package::{DOCUMENT_PART, PAGE_INDEX_PART, PAGE_PART_PREFIX, Package, page_part},
    page::decode_page,
    xml::visio_descendants,
};

/// Where a page lives in the package and how it is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDescriptor {
    id: String,
    name: String,
    path: String,
}

impl PageDescriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The package part holding the page contents.
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// The result of a successful decode.
#[derive(Debug)]
pub struct Decoded {
    document: DocumentGraph,
    warnings: Vec<Diagnostic>,
}

impl Decoded {
    pub fn document(&self) -> &DocumentGraph {
        &self.document
    }

    /// Problems that were recovered from, in the order they occurred.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn into_parts(self) -> (DocumentGraph, Vec<Diagnostic>) {
        (self.document, self.warnings)
    }
}

/// Decodes the package at `path`.
///
/// # Errors
///
/// Returns a [`DecodeError`] if the package cannot be opened or its document
/// descriptor is missing or malformed.
pub fn decode_file(path: impl AsRef<Path>) -> Result<Decoded, DecodeError> {
    let path = path.as_ref();
    info!(path:? = path; "Decoding package");

    let mut package = Package::open(path)?;
    decode_package(&mut package)
}

/// Decodes a package held in memory.
///
/// # Errors
///
/// See [`decode_file`].
pub fn decode_bytes(bytes: impl AsRef<[u8]>) -> Result<Decoded, DecodeError> {
    let mut package = Package::from_reader(Cursor::new(bytes.as_ref()))?;
    decode_package(&mut package)
}

/// Decodes an already opened package.
///
/// # Errors
///
/// See [`decode_file`].
pub fn decode_package<R: Read + Seek>(package: &mut Package<R>) -> Result<Decoded, DecodeError> {
    check_descriptor(package)?;

    let mut collector = DiagnosticCollector::new();
    let descriptors = page_descriptors(package, &mut collector);
    debug!(pages = descriptors.len(); "Enumerated pages");

    let mut pages: Vec<PageGraph> = Vec::with_capacity(descriptors.len());
    for descriptor in &descriptors {
        match decode_page(package, descriptor, &mut collector) {
            Ok(page) => pages.push(page),
            Err(diagnostic) => collector.emit(diagnostic),
        }
    }

    let warnings = collector.finish();
    info!(
        pages = pages.len(),
        skipped = descriptors.len() - pages.len(),
        warnings = warnings.len();
        "Package decoded"
    );

    Ok(Decoded {
        document: DocumentGraph::new(pages),
        warnings,
    })
}

/// Ensures the document descriptor exists and is well-formed XML.
fn check_descriptor<R: Read + Seek>(package: &mut Package<R>) -> Result<(), DecodeError> {
    let bytes = package
        .read_part(DOCUMENT_PART)?
        .ok_or_else(|| DecodeError::MissingDescriptor(DOCUMENT_PART.to_string()))?;

    let malformed = |reason: String| DecodeError::MalformedDescriptor {
        part: DOCUMENT_PART.to_string(),
        reason,
    };

    let xml = str::from_utf8(&bytes).map_err(|err| malformed(err.to_string()))?;
    Document::parse(xml).map_err(|err| malformed(err.to_string()))?;
    trace!("Document descriptor is well-formed");
    Ok(())
}

/// Lists the pages of the package.
///
/// The page index is used when present and readable. Otherwise page parts
/// are discovered by name; a broken index also records a warning.
fn page_descriptors<R: Read + Seek>(
    package: &mut Package<R>,
    collector: &mut DiagnosticCollector,
) -> Vec<PageDescriptor> {
    match read_page_index(package) {
        Ok(Some(descriptors)) => descriptors,
        Ok(None) => {
            debug!("No page index, scanning page parts");
            scan_page_parts(package)
        }
        Err(reason) => {
            collector.emit(
                Diagnostic::warning(format!("page index could not be read: {reason}"))
                    .with_code(ErrorCode::E004)
                    .with_part(PAGE_INDEX_PART)
                    .with_help("pages were discovered by scanning the package instead"),
            );
            scan_page_parts(package)
        }
    }
}

/// Reads `visio/pages/pages.xml`.
///
/// Returns `Ok(None)` if the index does not exist. An index without any
/// `Page` element is still a valid, empty index.
fn read_page_index<R: Read + Seek>(
    package: &mut Package<R>,
) -> Result<Option<Vec<PageDescriptor>>, String> {
    let Some(bytes) = package
        .read_part(PAGE_INDEX_PART)
        .map_err(|err| err.to_string())?
    else {
        return Ok(None);
    };

    let xml = str::from_utf8(&bytes).map_err(|err| err.to_string())?;
    let doc = Document::parse(xml).map_err(|err| err.to_string())?;

    let descriptors = visio_descendants(doc.root_element(), "Page")
        .enumerate()
        .map(|(index, page)| {
            let id = page
                .attribute("ID")
                .map_or_else(|| format!("page_{index}"), str::to_string);
            let name = page
                .attribute("Name")
                .map_or_else(|| format!("Page {}", index + 1), str::to_string);
            PageDescriptor::new(id, name, page_part(index))
        })
        .collect();

    Ok(Some(descriptors))
}

/// Discovers page parts by name, sorted lexicographically.
fn scan_page_parts<R: Read + Seek>(package: &Package<R>) -> Vec<PageDescriptor> {
    let mut paths: Vec<&str> = package
        .part_names()
        .filter(|name| {
            name.starts_with(PAGE_PART_PREFIX) && name.ends_with(".xml") && *name != PAGE_INDEX_PART
        })
        .collect();
    paths.sort_unstable();

    paths
        .into_iter()
        .enumerate()
        .map(|(index, path)| PageDescriptor::new(index.to_string(), format!("Page {}", index + 1), path))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::test_support::package;

    const DOCUMENT: (&str, &[u8]) = (DOCUMENT_PART, b"<VisioDocument/>");

    fn descriptors(parts: &[(&str, &[u8])]) -> (Vec<PageDescriptor>, Vec<Diagnostic>) {
        let mut pkg = package(parts);
        let mut collector = DiagnosticCollector::new();
        let descriptors = page_descriptors(&mut pkg, &mut collector);
        (descriptors, collector.finish())
    }

    #[test]
    fn test_index_with_defaults() {
        let index = br#"<Pages><Page ID="5" Name="Main"/><Page/></Pages>"#;
        let (pages, warnings) = descriptors(&[DOCUMENT, (PAGE_INDEX_PART, index)]);

        assert_eq!(
            pages,
            [
                PageDescriptor::new("5", "Main", "visio/pages/page1.xml"),
                PageDescriptor::new("page_1", "Page 2", "visio/pages/page2.xml"),
            ]
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_empty_index_wins_over_scan() {
        let (pages, _) = descriptors(&[
            DOCUMENT,
            (PAGE_INDEX_PART, b"<Pages/>"),
            ("visio/pages/page1.xml", b"<PageContents/>"),
        ]);

        assert!(pages.is_empty());
    }

    #[test]
    fn test_scan_without_index() {
        let (pages, warnings) = descriptors(&[
            DOCUMENT,
            ("visio/pages/page2.xml", b""),
            ("visio/pages/page10.xml", b""),
            ("visio/pages/page1.xml", b""),
            ("visio/pages/_rels/page1.xml.rels", b""),
            ("visio/masters/master1.xml", b""),
        ]);

        let paths: Vec<_> = pages.iter().map(PageDescriptor::path).collect();
        assert_eq!(
            paths,
            [
                "visio/pages/page1.xml",
                "visio/pages/page10.xml",
                "visio/pages/page2.xml",
            ]
        );
        assert_eq!(pages[2].id(), "2");
        assert_eq!(pages[2].name(), "Page 3");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_malformed_index_falls_back_to_scan() {
        let (pages, warnings) = descriptors(&[
            DOCUMENT,
            (PAGE_INDEX_PART, b"<Pages><Page"),
            ("visio/pages/page1.xml", b""),
        ]);

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].path(), "visio/pages/page1.xml");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code(), Some(ErrorCode::E004));
    }

    #[test]
    fn test_missing_descriptor_is_fatal() {
        let mut pkg = package(&[("visio/pages/page1.xml", b"<PageContents/>")]);

        let err = decode_package(&mut pkg).unwrap_err();
        assert!(matches!(err, DecodeError::MissingDescriptor(_)));
        assert_eq!(err.code(), ErrorCode::E002);
    }

    #[test]
    fn test_malformed_descriptor_is_fatal() {
        let mut pkg = package(&[(DOCUMENT_PART, b"<VisioDocument>")]);

        let err = decode_package(&mut pkg).unwrap_err();
        assert_eq!(err.code(), ErrorCode::E003);
    }

    #[test]
    fn test_failed_page_is_skipped() {
        let mut pkg = package(&[
            DOCUMENT,
            (
                PAGE_INDEX_PART,
                br#"<Pages><Page Name="Good"/><Page Name="Broken"/><Page Name="Gone"/></Pages>"#,
            ),
            ("visio/pages/page1.xml", br#"<PageContents><Shapes><Shape ID="1"/></Shapes></PageContents>"#),
            ("visio/pages/page2.xml", b"<PageContents>"),
        ]);

        let decoded = decode_package(&mut pkg).unwrap();
        let names: Vec<_> = decoded.document().pages().iter().map(PageGraph::name).collect();
        assert_eq!(names, ["Good"]);

        let codes: Vec<_> = decoded.warnings().iter().filter_map(Diagnostic::code).collect();
        assert_eq!(codes, [ErrorCode::E102, ErrorCode::E100]);
    }

    #[test]
    fn test_decode_bytes_rejects_garbage() {
        let err = decode_bytes(b"PK but not really").unwrap_err();

        assert_eq!(err.code(), ErrorCode::E001);
    }
}
