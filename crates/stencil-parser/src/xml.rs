//! Element matching helpers over `roxmltree` documents.

use roxmltree::Node;

/// The Visio 2012 main namespace.
pub(crate) const VISIO_NS: &str = "http://schemas.microsoft.com/office/visio/2012/main";

/// The Office relationships namespace (`r:` prefix).
pub(crate) const REL_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Returns `true` if `node` is a Visio element with local name `name`.
///
/// Elements without a namespace are accepted as well; some producers write
/// page parts without the default namespace declaration.
pub(crate) fn is_visio(node: Node<'_, '_>, name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == name
        && matches!(node.tag_name().namespace(), None | Some(VISIO_NS))
}

/// All Visio elements named `name` below `node`, in document order.
///
/// `node` itself is never yielded.
pub(crate) fn visio_descendants<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.descendants()
        .skip(1)
        .filter(move |child| is_visio(*child, name))
}

/// The first Visio element named `name` below `node`, in document order.
pub(crate) fn first_visio_descendant<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> Option<Node<'a, 'input>> {
    visio_descendants(node, name).next()
}

#[cfg(test)]
mod tests {
    use roxmltree::Document;

    use super::*;

    #[test]
    fn test_is_visio_accepts_namespaced_and_bare() {
        let xml = format!(
            r#"<Root xmlns="{VISIO_NS}"><Shape/><x:Shape xmlns:x="urn:other"/></Root>"#
        );
        let doc = Document::parse(&xml).unwrap();
        let shapes: Vec<_> = visio_descendants(doc.root_element(), "Shape").collect();
        assert_eq!(shapes.len(), 1);

        let bare = Document::parse("<Root><Shape/></Root>").unwrap();
        assert_eq!(visio_descendants(bare.root_element(), "Shape").count(), 1);
    }

    #[test]
    fn test_descendants_exclude_self_and_keep_order() {
        let doc = Document::parse(
            r#"<Shape ID="1"><Shapes><Shape ID="2"/><Shape ID="3"/></Shapes></Shape>"#,
        )
        .unwrap();

        let ids: Vec<_> = visio_descendants(doc.root_element(), "Shape")
            .filter_map(|node| node.attribute("ID"))
            .collect();
        assert_eq!(ids, ["2", "3"]);
    }

    #[test]
    fn test_first_descendant() {
        let doc = Document::parse("<Shape><Text>a</Text><Text>b</Text></Shape>").unwrap();

        let text = first_visio_descendant(doc.root_element(), "Text").unwrap();
        assert_eq!(text.text(), Some("a"));
        assert!(first_visio_descendant(doc.root_element(), "Cell").is_none());
    }
}
