//! Text extraction from embedded images.
//!
//! Shapes that embed an image often carry their real label inside the
//! bitmap. When a [`TextExtractor`] is available, the converter runs it over
//! every image-bearing shape that has a payload and appends the recognized
//! text to the shape text. This happens after decoding and before any
//! projection.
//!
//! Payloads are normalized to PNG by [`prepare_image`] first. Payloads that
//! are not decodable rasters are skipped with an
//! [`E302`](ErrorCode::E302) warning.

pub mod mistral;
pub mod preprocess;

use log::{debug, info};
use stencil_core::DocumentGraph;
use stencil_parser::error::{Diagnostic, ErrorCode};
use thiserror::Error;

use crate::config::OcrConfig;

pub use mistral::MistralClient;
pub use preprocess::prepare_image;

/// Errors raised by a text extraction service.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("no API key configured for the text extraction service")]
    MissingApiKey,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service responded with {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response: {0}")]
    Response(String),
}

/// A service that reads text out of images.
pub trait TextExtractor {
    /// Extracts the text shown in `image`, a PNG.
    ///
    /// Returns `Ok(None)` when the image holds no recognizable text.
    ///
    /// # Errors
    ///
    /// Returns an [`OcrError`] when the service cannot process the image.
    fn extract_text(&self, image: &[u8]) -> Result<Option<String>, OcrError>;

    /// Checks whether the service can be reached.
    fn is_available(&self) -> bool;

    /// Confidence the service assigns to its results, in `0.0..=1.0`.
    fn confidence(&self) -> f64 {
        1.0
    }
}

/// Outcome of an OCR pass over a document.
#[derive(Debug, Default)]
pub struct OcrReport {
    processed: usize,
    augmented: usize,
    failed: usize,
    skipped: usize,
    warnings: Vec<Diagnostic>,
}

impl OcrReport {
    /// Number of shapes whose image was sent to the extractor.
    pub fn processed(&self) -> usize {
        self.processed
    }

    /// Number of shapes whose text was extended.
    pub fn augmented(&self) -> usize {
        self.augmented
    }

    /// Number of shapes for which extraction failed.
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Number of shapes whose image could not be prepared for extraction.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<Diagnostic> {
        self.warnings
    }
}

/// Appends extracted image text to every image-bearing shape of `document`.
///
/// Shapes are processed one at a time, in page then shape order. A failure
/// on one shape is recorded in the report and the pass continues. Results
/// from an extractor whose [`TextExtractor::confidence`] is below the
/// configured threshold are still applied, with an advice.
pub fn augment_with_ocr(
    document: &mut DocumentGraph,
    extractor: &dyn TextExtractor,
    config: &OcrConfig,
) -> OcrReport {
    let mut report = OcrReport::default();
    let confidence = extractor.confidence();
    let confidence_threshold = config.confidence_threshold();

    for page in document.pages_mut() {
        let page_name = page.name().to_string();

        for shape in page.shapes_mut() {
            let prepared = match shape.image_data() {
                Some(payload) if shape.has_image() => {
                    prepare_image(payload, config.max_image_size())
                }
                _ => continue,
            };

            let image = match prepared {
                Ok(image) => image,
                Err(err) => {
                    debug!(page = page_name, shape = shape.id(), err:%; "Skipping image");
                    report.skipped += 1;
                    report.warnings.push(
                        Diagnostic::warning(format!(
                            "image of shape `{}` on page `{page_name}` cannot be read for text extraction: {err}",
                            shape.id()
                        ))
                        .with_code(ErrorCode::E302),
                    );
                    continue;
                }
            };

            let result = extractor.extract_text(&image);
            report.processed += 1;

            match result {
                Ok(Some(text)) if !text.trim().is_empty() => {
                    let text = text.trim();
                    debug!(page = page_name, shape = shape.id(), text; "Extracted image text");

                    if confidence < confidence_threshold {
                        report.warnings.push(
                            Diagnostic::advice(format!(
                                "text for shape `{}` on page `{page_name}` has confidence {confidence}, below threshold {confidence_threshold}",
                                shape.id()
                            ))
                            .with_code(ErrorCode::E301)
                            .with_help("the text was used anyway"),
                        );
                    }

                    shape.append_ocr_text(text);
                    report.augmented += 1;
                }
                Ok(_) => debug!(page = page_name, shape = shape.id(); "No text found in image"),
                Err(err) => {
                    report.failed += 1;
                    report.warnings.push(
                        Diagnostic::warning(format!(
                            "text extraction failed for shape `{}` on page `{page_name}`: {err}",
                            shape.id()
                        ))
                        .with_code(ErrorCode::E300),
                    );
                }
            }
        }
    }

    info!(
        processed = report.processed,
        augmented = report.augmented,
        failed = report.failed,
        skipped = report.skipped;
        "OCR pass complete"
    );
    report
}
