//! Image payload resolution for `ForeignData` elements.
//!
//! A shape that embeds an image points at a media part through a
//! relationship id. Resolving the relationship properly requires the page's
//! `.rels` part; instead, a fixed list of conventional media paths is tried
//! in order. When none of them exist the inline payload of the element, if
//! any, is decoded as base64.

use std::io::{Read, Seek};

use base64::{Engine, engine::general_purpose::STANDARD};
use log::{debug, trace};
use roxmltree::Node;

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    package::{MEDIA_DIR, Package},
    xml::REL_NS,
};

/// Builds one candidate media path from a relationship id.
type Candidate = fn(&str) -> Option<String>;

/// Candidate generators, in lookup order.
const CANDIDATES: &[Candidate] = &[by_rel_id, png_by_index, jpg_by_index, jpeg_by_index];

fn by_rel_id(rel_id: &str) -> Option<String> {
    Some(format!("{MEDIA_DIR}{rel_id}"))
}

fn png_by_index(rel_id: &str) -> Option<String> {
    numeric_suffix(rel_id).map(|n| format!("{MEDIA_DIR}image{n}.png"))
}

fn jpg_by_index(rel_id: &str) -> Option<String> {
    numeric_suffix(rel_id).map(|n| format!("{MEDIA_DIR}image{n}.jpg"))
}

fn jpeg_by_index(rel_id: &str) -> Option<String> {
    numeric_suffix(rel_id).map(|n| format!("{MEDIA_DIR}image{n}.jpeg"))
}

/// The trailing ASCII digits of `rel_id`, e.g. `"12"` for `"rId12"`.
fn numeric_suffix(rel_id: &str) -> Option<&str> {
    let digits = rel_id.len() - rel_id.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    (digits > 0).then(|| &rel_id[rel_id.len() - digits..])
}

/// Lists the media part paths tried for a relationship id, in order.
///
/// # Examples
///
/// ```
/// use stencil_parser::media_candidates;
///
/// assert_eq!(
///     media_candidates("rId3"),
///     [
///         "visio/media/rId3",
///         "visio/media/image3.png",
///         "visio/media/image3.jpg",
///         "visio/media/image3.jpeg",
///     ]
/// );
/// assert_eq!(media_candidates("logo"), ["visio/media/logo"]);
/// ```
pub fn media_candidates(rel_id: &str) -> Vec<String> {
    CANDIDATES
        .iter()
        .filter_map(|candidate| candidate(rel_id))
        .collect()
}

/// Reads the relationship id of the first `Rel` element below `foreign_data`.
///
/// `Rel` is matched in any namespace. The id is taken from `r:id`, falling
/// back to an unqualified `id` attribute.
fn rel_id<'a>(foreign_data: Node<'a, '_>) -> Option<&'a str> {
    foreign_data
        .descendants()
        .skip(1)
        .find(|node| node.is_element() && node.tag_name().name() == "Rel")
        .and_then(|rel| {
            rel.attribute((REL_NS, "id"))
                .or_else(|| rel.attribute("id"))
        })
        .filter(|id| !id.is_empty())
}

/// Resolves the image bytes of a `ForeignData` element.
///
/// Returns `None` and records a warning when no payload can be found or the
/// inline payload is not valid base64.
pub(crate) fn resolve_image<R: Read + Seek>(
    foreign_data: Node<'_, '_>,
    package: &mut Package<R>,
    part: &str,
    collector: &mut DiagnosticCollector,
) -> Option<Vec<u8>> {
    let rel_id = rel_id(foreign_data);

    if let Some(rel_id) = rel_id {
        for path in media_candidates(rel_id) {
            match package.read_part(&path) {
                Ok(Some(bytes)) => {
                    trace!(rel_id, path; "Resolved image from media part");
                    return Some(bytes);
                }
                Ok(None) => {}
                Err(err) => debug!(path, err:%; "Skipping unreadable media part"),
            }
        }
    }

    let inline: String = foreign_data
        .text()
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if inline.is_empty() {
        let message = match rel_id {
            Some(rel_id) => format!("image `{rel_id}` not found in package media"),
            None => "image data has no relationship id and no inline payload".to_string(),
        };
        collector.emit(
            Diagnostic::warning(message)
                .with_code(ErrorCode::E200)
                .with_part(part)
                .with_help("the shape is kept without image bytes"),
        );
        return None;
    }

    match STANDARD.decode(inline.as_bytes()) {
        Ok(bytes) => {
            trace!(len = bytes.len(); "Decoded inline image payload");
            Some(bytes)
        }
        Err(err) => {
            collector.emit(
                Diagnostic::warning(format!("inline image payload is not valid base64: {err}"))
                    .with_code(ErrorCode::E201)
                    .with_part(part),
            );
            None
        }
    }
}
