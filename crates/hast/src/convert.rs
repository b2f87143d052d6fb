//! Document tree to presentation tree.
//!
//! Follows mdast-util-to-hast for standard nodes. Directive nodes become
//! elements with exactly the tag name and properties the resolver attached.

use mdweave_core::{Document, Node, NodeKind, Resolved, target_shape, to_string};

use crate::element::{Element, HastNode, Root};

/// Converts a resolved document.
pub fn to_hast(document: &Document<Resolved>) -> Root {
    Root::new(convert_children(&document.tree().children, false))
}

fn convert_children(nodes: &[Node], tight: bool) -> Vec<HastNode> {
    nodes.iter().flat_map(|node| convert(node, tight)).collect()
}

fn element(tag: &str, node: &Node) -> Element {
    Element::new(tag).with_children(convert_children(&node.children, false))
}

/// `tight` is set for list items of tight lists and their children;
/// paragraphs directly inside such items are unwrapped.
fn convert(node: &Node, tight: bool) -> Vec<HastNode> {
    let element = match &node.kind {
        NodeKind::Root => return convert_children(&node.children, false),
        NodeKind::Paragraph if tight => return convert_children(&node.children, false),
        NodeKind::Paragraph => element("p", node),
        NodeKind::Heading { depth } => element(&format!("h{}", (*depth).clamp(1, 6)), node),
        NodeKind::Text { value } => return vec![HastNode::text(value.as_str())],
        NodeKind::InlineCode { value } => Element::new("code").child(value.as_str()),
        NodeKind::Code { value, lang, .. } => {
            let mut code = Element::new("code");
            if let Some(lang) = lang {
                code = code.with_class(&format!("language-{}", lang));
            }
            Element::new("pre").child(code.child(format!("{}\n", value)))
        }
        NodeKind::Emphasis => element("em", node),
        NodeKind::Strong => element("strong", node),
        NodeKind::Delete => element("del", node),
        NodeKind::Link { url, title } => {
            let mut link = element("a", node).with_property("href", url.as_str());
            if let Some(title) = title {
                link = link.with_property("title", title.as_str());
            }
            link
        }
        NodeKind::Image { url, alt, title } => {
            let mut image = Element::new("img")
                .with_property("src", url.as_str())
                .with_property("alt", alt.as_str());
            if let Some(title) = title {
                image = image.with_property("title", title.as_str());
            }
            image
        }
        NodeKind::Blockquote => element("blockquote", node),
        NodeKind::List {
            ordered,
            start,
            spread,
        } => {
            let items = node.children.iter().flat_map(|item| convert(item, !spread));
            let mut list = Element::new(if *ordered { "ol" } else { "ul" }).with_children(items);
            if let Some(start) = start.filter(|start| *ordered && *start != 1) {
                list = list.with_property("start", start.to_string());
            }
            if node.children.iter().any(is_task_item) {
                list = list.with_class("contains-task-list");
            }
            list
        }
        NodeKind::ListItem { checked } => {
            let mut item = Element::new("li");
            if let Some(checked) = checked {
                item = item.with_class("task-list-item").child(
                    Element::new("input")
                        .with_property("type", "checkbox")
                        .with_property("checked", *checked)
                        .with_property("disabled", true),
                );
                item = item.child(" ");
            }
            item.with_children(
                node.children
                    .iter()
                    .flat_map(|child| convert(child, tight)),
            )
        }
        NodeKind::Break => Element::new("br"),
        NodeKind::ThematicBreak => Element::new("hr"),
        NodeKind::Html { value } => return vec![HastNode::Raw { value: value.clone() }],
        NodeKind::Math { value } => Element::new("pre").child(
            Element::new("code")
                .with_class("language-math math-display")
                .child(value.as_str()),
        ),
        NodeKind::InlineMath { value } => Element::new("code")
            .with_class("language-math math-inline")
            .child(value.as_str()),
        NodeKind::ContainerDirective(directive)
        | NodeKind::LeafDirective(directive)
        | NodeKind::TextDirective(directive) => match target_shape(node) {
            Some((tag_name, properties)) => Element::new(tag_name)
                .with_properties(properties.clone())
                .with_children(convert_children(&node.children, false)),
            None => {
                log::warn!(
                    "directive `{}` reached rendering without a target shape",
                    directive.name
                );
                element("div", node)
            }
        },
        NodeKind::Other { name } => match convert_other(name, node) {
            Some(element) => element,
            None => {
                log::warn!("dropping `{}` node with no presentation form", name);
                return Vec::new();
            }
        },
    };
    vec![HastNode::Element(element)]
}

fn is_task_item(node: &Node) -> bool {
    matches!(node.kind, NodeKind::ListItem { checked: Some(_) })
}

fn convert_other(name: &str, node: &Node) -> Option<Element> {
    let element = match name {
        "table" => {
            let mut rows = node.children.iter();
            let mut table = Element::new("table");
            if let Some(head) = rows.next() {
                table = table.child(Element::new("thead").child(table_row(head, "th")));
            }
            let body: Vec<HastNode> = rows.map(|row| table_row(row, "td").into()).collect();
            if !body.is_empty() {
                table = table.child(Element::new("tbody").with_children(body));
            }
            table
        }
        "tableRow" => table_row(node, "td"),
        "tableCell" => element("td", node),
        "linkReference" => Element::new("span").with_children(convert_children(&node.children, false)),
        "footnoteReference" => {
            let id = to_string(node);
            Element::new("sup").child(
                Element::new("a")
                    .with_property("href", format!("#fn-{}", id))
                    .with_property("id", format!("fnref-{}", id))
                    .with_property("dataFootnoteRef", true)
                    .child(id),
            )
        }
        "footnoteDefinition" => element("div", node).with_class("footnote-definition"),
        _ => return None,
    };
    Some(element)
}

fn table_row(row: &Node, cell_tag: &str) -> Element {
    Element::new("tr").with_children(
        row.children
            .iter()
            .map(|cell| element(cell_tag, cell).into()),
    )
}

/// Depth of an `h1`..`h6` element.
pub fn heading_depth(element: &Element) -> Option<u8> {
    let rest = element.tag_name.strip_prefix('h')?;
    match rest.parse::<u8>() {
        Ok(depth @ 1..=6) => Some(depth),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdweave_core::{DEFAULT_WORDS_PER_MINUTE, MetadataStore, ParseOptions};

    fn hast(source: &str) -> Root {
        let mut store = MetadataStore::new();
        let doc = Document::parse("t.md", source, &ParseOptions::markdown())
            .unwrap()
            .measure(DEFAULT_WORDS_PER_MINUTE, &mut store)
            .convert_alerts()
            .resolve();
        to_hast(&doc)
    }

    fn json(root: &Root) -> String {
        serde_json::to_string(root).unwrap()
    }

    #[test]
    fn standard_nodes() {
        let root = hast("## Hi *there*\n\n```rust\nfn main() {}\n```\n");
        insta::assert_snapshot!(json(&root), @r#"{"type":"root","children":[{"type":"element","tagName":"h2","properties":{},"children":[{"type":"text","value":"Hi "},{"type":"element","tagName":"em","properties":{},"children":[{"type":"text","value":"there"}]}]},{"type":"element","tagName":"pre","properties":{},"children":[{"type":"element","tagName":"code","properties":{"className":["language-rust"]},"children":[{"type":"text","value":"fn main() {}\n"}]}]}]}"#);
    }

    #[test]
    fn directive_uses_its_target_shape() {
        let root = hast(":::note[Title]{.wide}\nBody\n:::");
        let note = root.children[0].as_element().unwrap();
        assert_eq!(note.tag_name, "note");
        assert_eq!(note.classes(), vec!["wide"]);
        assert!(note.properties.is_true("has-directive-label"));
        assert_eq!(note.children.len(), 2);
        assert_eq!(note.children[0].as_element().unwrap().tag_name, "p");
    }

    #[test]
    fn tight_lists_unwrap_paragraphs() {
        let root = hast("- one\n- [x] two\n");
        let list = root.children[0].as_element().unwrap();
        assert_eq!(list.tag_name, "ul");
        assert!(list.has_class("contains-task-list"));
        let first = list.children[0].as_element().unwrap();
        assert_eq!(first.children, vec![HastNode::text("one")]);
        let second = list.children[1].as_element().unwrap();
        assert!(second.has_class("task-list-item"));
        assert_eq!(second.children[0].as_element().unwrap().tag_name, "input");
    }

    #[test]
    fn tables_get_head_and_body() {
        let root = hast("| a | b |\n| - | - |\n| 1 | 2 |\n");
        let table = root.children[0].as_element().unwrap();
        let tags: Vec<_> = table
            .children
            .iter()
            .filter_map(HastNode::as_element)
            .map(|e| e.tag_name.as_str())
            .collect();
        assert_eq!(tags, vec!["thead", "tbody"]);
        assert_eq!(table.text_content(), "ab12");
    }

    #[test]
    fn raw_html_passes_through() {
        let root = hast("<div class=\"x\">hi</div>\n");
        assert_eq!(
            root.children[0],
            HastNode::Raw {
                value: "<div class=\"x\">hi</div>".into()
            }
        );
    }

    #[test]
    fn heading_depth_reads_tag() {
        assert_eq!(heading_depth(&Element::new("h3")), Some(3));
        assert_eq!(heading_depth(&Element::new("h7")), None);
        assert_eq!(heading_depth(&Element::new("hr")), None);
    }
}
