//! Mind-map loader
//!
//! Reads the FreeMind/Freeplane `.mm` dialect: a `<map>` element holding one
//! root `<node TEXT="...">`, with nested `<node>` elements as children.
//! Anything else inside a node (icons, fonts, rich content) is ignored.

use std::path::Path;

use crate::config::ChildOrder;
use crate::tree::{NodeId, Tree, TreeError};

/// Load and parse a mind-map file
pub fn load<P: AsRef<Path>>(path: P, order: ChildOrder) -> Result<Tree, TreeError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| TreeError::DocumentLoad {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let tree = parse(&content, order).map_err(|e| match e {
        TreeError::DocumentLoad { reason, .. } => TreeError::DocumentLoad {
            path: path.display().to_string(),
            reason,
        },
        other => other,
    })?;

    tracing::info!(path = %path.display(), nodes = tree.len(), "Mind map loaded");
    Ok(tree)
}

/// Parse mind-map XML text
pub fn parse(content: &str, order: ChildOrder) -> Result<Tree, TreeError> {
    let doc = roxmltree::Document::parse(content).map_err(|e| TreeError::DocumentLoad {
        path: "<memory>".to_string(),
        reason: e.to_string(),
    })?;

    let map = doc.root_element();
    if !map.has_tag_name("map") {
        return Err(TreeError::DocumentLoad {
            path: "<memory>".to_string(),
            reason: format!("expected <map>, found <{}>", map.tag_name().name()),
        });
    }

    let root_elem = child_nodes(map).next().ok_or(TreeError::EmptyTree)?;
    let mut tree = Tree::new(label(root_elem));
    let root = tree.root().ok_or(TreeError::EmptyTree)?;
    add_children(&mut tree, root, root_elem, order);
    Ok(tree)
}

fn add_children(tree: &mut Tree, parent: NodeId, elem: roxmltree::Node<'_, '_>, order: ChildOrder) {
    for child_elem in child_nodes(elem) {
        let child = match order {
            ChildOrder::Append => tree.push_child(parent, label(child_elem)),
            ChildOrder::Prepend => tree.prepend_child(parent, label(child_elem)),
        };
        add_children(tree, child, child_elem, order);
    }
}

fn child_nodes<'a, 'input>(
    elem: roxmltree::Node<'a, 'input>,
) -> impl Iterator<Item = roxmltree::Node<'a, 'input>> {
    elem.children().filter(|n| n.is_element() && n.has_tag_name("node"))
}

fn label(elem: roxmltree::Node<'_, '_>) -> String {
    elem.attribute("TEXT").unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = include_str!("../maps/sample.mm");

    fn labels(tree: &Tree, id: NodeId) -> Vec<&str> {
        tree.children(id)
            .iter()
            .map(|&c| tree.node(c).text.as_str())
            .collect()
    }

    #[test]
    fn test_sample_in_document_order() {
        let tree = parse(SAMPLE, ChildOrder::Append).unwrap();
        let root = tree.root().unwrap();

        assert_eq!(tree.node(root).text, "Cone Trees");
        assert_eq!(labels(&tree, root), ["Layout", "Animation", "Rendering", "Camera"]);
        assert_eq!(tree.len(), 16);
        assert_eq!(tree.cone_count(), 5);
    }

    #[test]
    fn test_prepend_reverses_siblings() {
        let tree = parse(SAMPLE, ChildOrder::Prepend).unwrap();
        let root = tree.root().unwrap();
        assert_eq!(labels(&tree, root), ["Camera", "Rendering", "Animation", "Layout"]);
    }

    #[test]
    fn test_missing_text_is_empty_label() {
        let tree = parse(SAMPLE, ChildOrder::Append).unwrap();
        assert!(tree.nodes().any(|n| n.text.is_empty()));
    }

    #[test]
    fn test_non_node_elements_are_ignored() {
        let xml = r#"<map><node TEXT="r"><icon BUILTIN="idea"/><font SIZE="12"/><node TEXT="c"/></node></map>"#;
        let tree = parse(xml, ChildOrder::Append).unwrap();
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_map_without_node_is_empty() {
        let err = parse("<map version=\"1.0\"></map>", ChildOrder::Append).unwrap_err();
        assert!(matches!(err, TreeError::EmptyTree));
    }

    #[test]
    fn test_malformed_xml_fails_to_load() {
        let err = parse("<map><node TEXT=\"x\"></map>", ChildOrder::Append).unwrap_err();
        assert!(matches!(err, TreeError::DocumentLoad { .. }));

        let err = parse("<mindmap/>", ChildOrder::Append).unwrap_err();
        assert!(matches!(err, TreeError::DocumentLoad { .. }));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = load("does/not/exist.mm", ChildOrder::Append).unwrap_err();
        assert!(err.to_string().contains("does/not/exist.mm"));
    }
}
