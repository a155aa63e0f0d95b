//! Integration tests for the Converter API
//!
//! These tests write small `.vsdx` packages to a temporary directory and run
//! them through the public conversion pipeline.

use std::{
    cell::Cell,
    fs,
    io::{Cursor, Write},
    path::{Path, PathBuf},
};

use stencil::{
    Converter, ErrorCode, StencilError,
    config::{AppConfig, OutputFormat},
    ocr::{OcrError, TextExtractor},
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use tempfile::TempDir;
use zip::{ZipWriter, write::SimpleFileOptions};

const VISIO_NS: &str = "http://schemas.microsoft.com/office/visio/2012/main";

fn write_package(dir: &Path, name: &str, pages: &[(&str, String)]) -> PathBuf {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    writer.start_file("visio/document.xml", options).unwrap();
    write!(writer, r#"<VisioDocument xmlns="{VISIO_NS}"/>"#).unwrap();

    writer.start_file("visio/pages/pages.xml", options).unwrap();
    write!(writer, r#"<Pages xmlns="{VISIO_NS}">"#).unwrap();
    for (index, (page_name, _)) in pages.iter().enumerate() {
        write!(writer, r#"<Page ID="{index}" Name="{page_name}"/>"#).unwrap();
    }
    write!(writer, "</Pages>").unwrap();

    for (index, (_, contents)) in pages.iter().enumerate() {
        writer
            .start_file(format!("visio/pages/page{}.xml", index + 1), options)
            .unwrap();
        writer.write_all(contents.as_bytes()).unwrap();
    }

    writer.start_file("visio/media/image1.png", options).unwrap();
    writer.write_all(&logo_png()).unwrap();

    let bytes = writer.finish().unwrap().into_inner();
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

fn logo_png() -> Vec<u8> {
    let mut bytes = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(RgbImage::from_pixel(48, 24, Rgb([255, 255, 255])))
        .write_to(&mut bytes, ImageFormat::Png)
        .unwrap();
    bytes.into_inner()
}

fn page(shapes: &str, connects: &str) -> String {
    format!(
        r#"<PageContents xmlns="{VISIO_NS}"><Shapes>{shapes}</Shapes><Connects>{connects}</Connects></PageContents>"#
    )
}

fn start_end_page() -> String {
    page(
        r#"<Shape ID="1" Type="start"><Text>Start</Text></Shape>
           <Shape ID="2" Type="end"><Text>End</Text></Shape>"#,
        r#"<Connect FromSheet="1" ToSheet="2"/>"#,
    )
}

fn converter_in(dir: &TempDir) -> Converter {
    let config: AppConfig = toml::from_str(&format!(
        "[output]\ndirectory = {:?}\n[ocr]\nenabled = false\n",
        dir.path().join("out")
    ))
    .expect("Failed to parse config");
    Converter::new(config)
}

/// Returns the same text for every image and counts the calls.
struct FixedExtractor {
    text: &'static str,
    calls: Cell<usize>,
}

impl TextExtractor for FixedExtractor {
    fn extract_text(&self, _image: &[u8]) -> Result<Option<String>, OcrError> {
        self.calls.set(self.calls.get() + 1);
        Ok(Some(self.text.to_string()))
    }

    fn is_available(&self) -> bool {
        true
    }
}

#[test]
fn test_convert_both_formats() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_package(dir.path(), "flow.vsdx", &[("Flow", start_end_page())]);

    let report = converter_in(&dir)
        .convert(&input, OutputFormat::Both, None)
        .expect("Conversion should succeed");

    let out = dir.path().join("out");
    assert_eq!(report.outputs(), [out.join("flow.drawio"), out.join("flow.md")]);
    assert_eq!(report.pages(), 1);
    assert!(report.warnings().is_empty());

    let xml = fs::read_to_string(out.join("flow.drawio")).unwrap();
    assert_eq!(xml.matches(r#"vertex="1""#).count(), 2);
    assert_eq!(xml.matches(r#"edge="1""#).count(), 1);

    let markup = fs::read_to_string(out.join("flow.md")).unwrap();
    assert_eq!(markup.lines().filter(|line| line.contains("-->")).count(), 1);
    assert_eq!(markup.lines().filter(|line| line.contains("[\"")).count(), 2);
}

#[test]
fn test_explicit_output_path() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_package(dir.path(), "flow.vsdx", &[("Flow", start_end_page())]);
    let output = dir.path().join("nested/dir/custom.mmd");

    let report = converter_in(&dir)
        .convert(&input, OutputFormat::Mermaid, Some(&output))
        .expect("Conversion should succeed");

    assert_eq!(report.outputs(), [output.clone()]);
    assert!(output.exists());
}

#[test]
fn test_projection_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_package(
        dir.path(),
        "multi.vsdx",
        &[("One", start_end_page()), ("Two", start_end_page())],
    );
    let converter = converter_in(&dir);

    let first = converter.decode(&input).unwrap();
    let second = converter.decode(&input).unwrap();
    assert_eq!(first.document(), second.document());

    assert_eq!(
        converter.render_drawio(&first).unwrap(),
        converter.render_drawio(&second).unwrap()
    );
    assert_eq!(
        converter.render_mermaid(&first).unwrap(),
        converter.render_mermaid(&second).unwrap()
    );
}

#[test]
fn test_multi_page_ids_and_tokens() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_package(
        dir.path(),
        "multi.vsdx",
        &[("One", start_end_page()), ("Two", start_end_page())],
    );
    let converter = converter_in(&dir);
    let diagram = converter.decode(&input).unwrap();

    let xml = converter.render_drawio(&diagram).unwrap();
    for id in 2..=7 {
        assert_eq!(xml.matches(&format!(r#"<mxCell id="{id}""#)).count(), 1);
    }
    assert!(xml.contains(r#"source="5" target="6""#));

    let markup = converter.render_mermaid(&diagram).unwrap();
    assert_eq!(markup.matches("node1[\"Start\"]").count(), 2);
    assert!(markup.contains("## One"));
    assert!(markup.contains("\n---\n"));
}

#[test]
fn test_ocr_augments_image_shapes() {
    let dir = tempfile::tempdir().unwrap();
    let image_page = page(
        r#"<Shape ID="1"><Text>Logo</Text><ForeignData><Rel id="rId1"/></ForeignData></Shape>
           <Shape ID="2"><Text>Plain</Text></Shape>"#,
        "",
    );
    let input = write_package(dir.path(), "logo.vsdx", &[("Brand", image_page)]);
    let extractor = FixedExtractor {
        text: "ACME",
        calls: Cell::new(0),
    };

    let converter = converter_in(&dir).with_extractor(extractor);
    assert!(converter.has_ocr());
    let diagram = converter.decode(&input).unwrap();

    let texts: Vec<_> = diagram.document().shapes().map(|shape| shape.text()).collect();
    assert_eq!(texts, ["Logo [OCR: ACME]", "Plain"]);
    assert!(diagram.warnings().is_empty());

    let xml = converter.render_drawio(&diagram).unwrap();
    assert!(xml.contains("shape=image;imageAspect=0;aspect=fixed;"));
}

#[test]
fn test_without_ocr_leaves_text() {
    let dir = tempfile::tempdir().unwrap();
    let image_page = page(
        r#"<Shape ID="1"><Text>Logo</Text><ForeignData><Rel id="rId1"/></ForeignData></Shape>"#,
        "",
    );
    let input = write_package(dir.path(), "logo.vsdx", &[("Brand", image_page)]);
    let extractor = FixedExtractor {
        text: "ACME",
        calls: Cell::new(0),
    };

    let converter = converter_in(&dir).with_extractor(extractor).without_ocr();
    let diagram = converter.decode(&input).unwrap();

    assert_eq!(diagram.document().pages()[0].shapes()[0].text(), "Logo");
    assert!(!converter.is_ocr_available());
}

#[test]
fn test_list_pages() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_package(
        dir.path(),
        "multi.vsdx",
        &[("One", start_end_page()), ("Two", page("", ""))],
    );

    let pages = converter_in(&dir).list_pages(&input).unwrap();
    assert_eq!(
        pages,
        [
            ("0".to_string(), "One".to_string()),
            ("1".to_string(), "Two".to_string())
        ]
    );
}

#[test]
fn test_broken_page_is_a_warning() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_package(
        dir.path(),
        "partial.vsdx",
        &[("Good", start_end_page()), ("Bad", "<PageContents>".to_string())],
    );

    let diagram = converter_in(&dir).decode(&input).unwrap();
    assert_eq!(diagram.document().len(), 1);
    assert_eq!(diagram.warnings().len(), 1);
    assert_eq!(diagram.warnings()[0].code(), Some(ErrorCode::E102));
}

#[test]
fn test_no_pages_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_package(dir.path(), "empty.vsdx", &[]);

    let err = converter_in(&dir).decode(&input).unwrap_err();
    assert!(matches!(err, StencilError::NoPages(_)));
}

#[test]
fn test_unsupported_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let legacy = dir.path().join("old.vsd");
    let text = dir.path().join("notes.txt");
    fs::write(&legacy, b"\xd0\xcf\x11\xe0").unwrap();
    fs::write(&text, b"hello").unwrap();
    let converter = converter_in(&dir);

    assert!(matches!(
        converter.decode(&legacy),
        Err(StencilError::UnsupportedInput { .. })
    ));
    assert!(matches!(
        converter.decode(&text),
        Err(StencilError::UnsupportedInput { .. })
    ));
    assert!(matches!(
        converter.decode(dir.path().join("missing.vsdx")),
        Err(StencilError::InputNotFound(_))
    ));
}

#[test]
fn test_corrupt_package_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("corrupt.vsdx");
    fs::write(&input, b"not a zip archive").unwrap();

    let err = converter_in(&dir).decode(&input).unwrap_err();
    assert_eq!(err.decode_code(), Some(ErrorCode::E001));
}
