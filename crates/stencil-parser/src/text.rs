//! Shape text collection.

use roxmltree::Node;

/// Collects the display text of a `Text` element.
///
/// Visio splits shape text around run markers (`<cp/>`, `<pp/>`, `<tp/>`),
/// so the text is gathered from every text node below the element in
/// document order, followed by the text directly after the element. Each
/// fragment is trimmed, empty fragments are dropped, and the rest are joined
/// with single spaces.
pub(crate) fn collect_text(text: Node<'_, '_>) -> String {
    let inner = text
        .descendants()
        .filter(Node::is_text)
        .filter_map(|node| node.text());

    let tail = text
        .next_sibling()
        .filter(Node::is_text)
        .and_then(|node| node.text());

    let fragments: Vec<&str> = inner
        .chain(tail)
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect();

    collapse_whitespace(&fragments.join(" "))
}

/// Replaces every run of whitespace with one space and trims both ends.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
