//! Style classification of decoded shapes.
//!
//! Decoded shapes carry a free-form classification tag taken from the
//! source document. Exporters never match on that tag directly; they ask
//! [`ShapeKind::classify`] for one of a closed set of buckets instead.

use std::fmt;

/// The visual bucket a shape falls into.
///
/// Buckets are tested in declaration order and the first match wins:
///
/// 1. [`ShapeKind::Process`] - tag contains `process`
/// 2. [`ShapeKind::Decision`] - tag contains `decision`
/// 3. [`ShapeKind::Terminal`] - tag contains `start` or `end`
/// 4. [`ShapeKind::Image`] - the shape carries embedded image data
/// 5. [`ShapeKind::Generic`] - everything else
///
/// All tag comparisons ignore ASCII case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Process,
    Decision,
    Terminal,
    Image,
    Generic,
}

impl ShapeKind {
    /// Classifies a shape from its tag and image flag.
    ///
    /// # Examples
    ///
    /// ```
    /// use stencil_core::ShapeKind;
    ///
    /// assert_eq!(ShapeKind::classify("Decision", false), ShapeKind::Decision);
    /// assert_eq!(ShapeKind::classify("shape", true), ShapeKind::Image);
    /// assert_eq!(ShapeKind::classify("start", true), ShapeKind::Terminal);
    /// ```
    pub fn classify(tag: &str, has_image: bool) -> Self {
        let tag = tag.to_ascii_lowercase();

        if tag.contains("process") {
            Self::Process
        } else if tag.contains("decision") {
            Self::Decision
        } else if tag.contains("start") || tag.contains("end") {
            Self::Terminal
        } else if has_image {
            Self::Image
        } else {
            Self::Generic
        }
    }

    /// Returns `true` for tags that text markup renders as a diamond.
    ///
    /// This is wider than [`ShapeKind::Decision`]: it also accepts `diamond`
    /// and ignores the bucket priority, so a `process decision` tag is
    /// decision-like even though it classifies as [`ShapeKind::Process`].
    pub fn is_decision_like(tag: &str) -> bool {
        let tag = tag.to_ascii_lowercase();
        tag.contains("decision") || tag.contains("diamond")
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Process => "process",
            Self::Decision => "decision",
            Self::Terminal => "terminal",
            Self::Image => "image",
            Self::Generic => "generic",
        };
        write!(f, "{name}")
    }
}
