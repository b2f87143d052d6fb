//! Plain-text extraction from document trees.

use crate::tree::{Node, NodeKind};

/// Concatenates the textual content of `node` and its descendants.
///
/// Literal values (text, code, html, math) are used as-is, images contribute
/// their alt text, and nothing is inserted between siblings, so
/// `Hello *world*` yields `Hello world`.
pub fn to_string(node: &Node) -> String {
    let mut out = String::new();
    push_string(node, &mut out);
    out
}

fn push_string(node: &Node, out: &mut String) {
    if let NodeKind::Image { alt, .. } = &node.kind {
        out.push_str(alt);
        return;
    }
    if let Some(value) = node.value() {
        out.push_str(value);
        return;
    }
    for child in &node.children {
        push_string(child, out);
    }
}

/// Flattens all text of the tree, separating block-level content with
/// whitespace so words from adjacent blocks never merge.
///
/// Inline content inside a block is concatenated exactly like [`to_string`].
pub fn flatten_text(node: &Node) -> String {
    let mut out = String::new();
    push_flat(node, &mut out);
    out
}

fn push_flat(node: &Node, out: &mut String) {
    let separated = node.is_block() || is_boundary(&node.kind);
    if separated {
        push_separator(out);
    }

    if let NodeKind::Image { alt, .. } = &node.kind {
        out.push_str(alt);
    } else if let Some(value) = node.value() {
        out.push_str(value);
    } else {
        for child in &node.children {
            push_flat(child, out);
        }
    }

    if separated {
        push_separator(out);
    }
}

/// Non-block kinds whose content must not run into its neighbors.
fn is_boundary(kind: &NodeKind) -> bool {
    match kind {
        NodeKind::Break => true,
        NodeKind::Other { name } => matches!(
            name.as_str(),
            "table" | "tableRow" | "tableCell" | "footnoteDefinition"
        ),
        _ => false,
    }
}

fn push_separator(out: &mut String) {
    if out.chars().last().is_some_and(|c| !c.is_whitespace()) {
        out.push(' ');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emphasis(text: &str) -> Node {
        Node::new(NodeKind::Emphasis, vec![Node::text(text)])
    }

    #[test]
    fn to_string_concatenates_inline_content() {
        let para = Node::paragraph(vec![Node::text("Hello "), emphasis("world"), Node::text("!")]);
        assert_eq!(to_string(&para), "Hello world!");
    }

    #[test]
    fn to_string_uses_image_alt_and_code() {
        let para = Node::paragraph(vec![
            Node::new(
                NodeKind::Image {
                    url: "a.png".into(),
                    alt: "diagram".into(),
                    title: None,
                },
                vec![],
            ),
            Node::text(" of "),
            Node::new(
                NodeKind::InlineCode {
                    value: "main()".into(),
                },
                vec![],
            ),
        ]);
        assert_eq!(to_string(&para), "diagram of main()");
    }

    #[test]
    fn flatten_separates_blocks() {
        let tree = Node::root(vec![
            Node::heading(1, vec![Node::text("Title")]),
            Node::paragraph_text("First"),
            Node::paragraph(vec![Node::text("Second"), emphasis("Word")]),
        ]);
        assert_eq!(to_string(&tree), "TitleFirstSecondWord");
        assert_eq!(flatten_text(&tree).trim(), "Title First SecondWord");
    }

    #[test]
    fn flatten_treats_breaks_as_whitespace() {
        let para = Node::paragraph(vec![
            Node::text("line"),
            Node::new(NodeKind::Break, vec![]),
            Node::text("next"),
        ]);
        assert_eq!(flatten_text(&para).trim(), "line next");
    }

    #[test]
    fn flatten_separates_table_cells() {
        let other = |name: &str, children| {
            Node::new(
                NodeKind::Other {
                    name: name.to_string(),
                },
                children,
            )
        };
        let row = |a: &str, b: &str| {
            other(
                "tableRow",
                vec![
                    other("tableCell", vec![Node::text(a)]),
                    other("tableCell", vec![Node::text(b)]),
                ],
            )
        };
        let table = other("table", vec![row("alpha", "beta"), row("gamma", "delta")]);
        let tree = Node::root(vec![table, other("footnoteDefinition", vec![Node::text("note")])]);
        assert_eq!(flatten_text(&tree).split_whitespace().collect::<Vec<_>>(), [
            "alpha", "beta", "gamma", "delta", "note"
        ]);
    }

    #[test]
    fn empty_tree_flattens_to_empty() {
        assert_eq!(flatten_text(&Node::root(vec![])), "");
    }
}
