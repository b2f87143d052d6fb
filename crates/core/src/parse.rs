//! markdown-rs adapter.
//!
//! Parses markdown text with the `markdown` crate and converts its mdast into
//! the [`Node`] model. Directive syntax is handled by [`crate::syntax`] before
//! parsing; the placeholder tokens it leaves behind are turned back into
//! directive nodes here.

use std::collections::HashMap;

use markdown::mdast;
use markdown::message::{Message, Place};
use serde_json::Value as JsonValue;

use crate::error::{Diagnostics, SourceLocation, WeaveError};
use crate::frontmatter::extract_frontmatter;
use crate::syntax::{
    DirectiveOpening, Segment, Token, parse_attributes, preprocess_directives, restore_tokens,
    split_tokens,
};
use crate::tree::{Directive, DirectiveKind, Node, NodeKind, Properties};

/// Parser options for building markdown-rs parse options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Enable GitHub Flavored Markdown constructs.
    pub gfm: bool,
    /// Read a leading YAML frontmatter block.
    pub frontmatter: bool,
    /// Recognize `:::container`, `::leaf` and `:text` directives.
    pub directives: bool,
    /// Enable indented code blocks.
    pub code_indented: bool,
    /// Keep raw HTML as `html` nodes.
    pub raw_html: bool,
    /// Enable math constructs ($inline$ and $$block$$).
    pub math: bool,
}

impl ParseOptions {
    /// Blog-friendly defaults: GFM, frontmatter, directives, raw HTML.
    pub const fn markdown() -> Self {
        Self {
            gfm: true,
            frontmatter: true,
            directives: true,
            code_indented: true,
            raw_html: true,
            math: false,
        }
    }

    /// Plain CommonMark with nothing on top.
    pub const fn commonmark() -> Self {
        Self {
            gfm: false,
            frontmatter: false,
            directives: false,
            code_indented: true,
            raw_html: true,
            math: false,
        }
    }

    /// Convert to markdown-rs `ParseOptions`.
    pub fn to_markdown(self) -> markdown::ParseOptions {
        let mut constructs = markdown::Constructs {
            // Frontmatter is cut out before parsing.
            frontmatter: false,
            code_indented: self.code_indented,
            html_flow: self.raw_html,
            html_text: self.raw_html,
            ..Default::default()
        };

        if self.gfm {
            constructs.gfm_autolink_literal = true;
            constructs.gfm_footnote_definition = true;
            constructs.gfm_label_start_footnote = true;
            constructs.gfm_strikethrough = true;
            constructs.gfm_table = true;
            constructs.gfm_task_list_item = true;
        }

        if self.math {
            constructs.math_flow = true;
            constructs.math_text = true;
        }

        markdown::ParseOptions {
            constructs,
            math_text_single_dollar: self.math,
            ..markdown::ParseOptions::default()
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::markdown()
    }
}

/// Trait for mutating the parsed tree before metadata and resolution passes.
pub trait AstTransform: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &str {
        "transform"
    }

    /// Mutate the tree in place.
    fn transform(&self, root: &mut Node) -> Result<(), WeaveError>;
}

impl<F> AstTransform for F
where
    F: Fn(&mut Node) -> Result<(), WeaveError> + Send + Sync,
{
    fn transform(&self, root: &mut Node) -> Result<(), WeaveError> {
        (self)(root)
    }
}

/// Output of [`parse_document`].
#[derive(Debug)]
pub struct ParsedDocument {
    /// Converted tree (a `root` node).
    pub tree: Node,
    /// Frontmatter object; empty when the document has none.
    pub frontmatter: JsonValue,
    /// Recovered problems found while parsing.
    pub diagnostics: Diagnostics,
}

/// Parses markdown text into the node model.
pub fn parse_document(source: &str, options: &ParseOptions) -> Result<ParsedDocument, WeaveError> {
    let mut frontmatter = JsonValue::Object(Default::default());
    let mut text = std::borrow::Cow::Borrowed(source);
    if options.frontmatter {
        let extracted = extract_frontmatter(source)?;
        if extracted.body_start > 0 {
            // Blank the block out so line numbers stay put.
            let blank_lines = source[..extracted.body_start].lines().count();
            text = std::borrow::Cow::Owned(format!(
                "{}{}",
                "\n".repeat(blank_lines),
                &source[extracted.body_start..]
            ));
        }
        frontmatter = extracted.value;
    }

    let mut diagnostics = Diagnostics::new();
    let mut openings = Vec::new();
    if options.directives {
        let preprocessed = preprocess_directives(&text, options.raw_html);
        diagnostics.extend(preprocessed.diagnostics);
        openings = preprocessed.openings;
        text = std::borrow::Cow::Owned(preprocessed.text);
    }

    let md_options = options.to_markdown();
    let mdast = parse_mdast(&text, &md_options)?;

    let mut converter = Converter {
        openings: &openings,
        definitions: HashMap::new(),
        md_options: &md_options,
        diagnostics: &mut diagnostics,
    };
    converter.collect_definitions(&mdast);
    let tree = match converter.convert(mdast).pop() {
        Some(tree) => tree,
        None => return Err(WeaveError::Internal("parser returned no root".into())),
    };

    log::debug!(
        "parsed document: {} top-level node(s), {} directive(s)",
        tree.children.len(),
        openings.len()
    );

    Ok(ParsedDocument {
        tree,
        frontmatter,
        diagnostics,
    })
}

/// Parse markdown into an mdast tree using markdown-rs `ParseOptions`.
pub fn parse_mdast(input: &str, options: &markdown::ParseOptions) -> Result<mdast::Node, WeaveError> {
    markdown::to_mdast(input, options).map_err(|err| {
        let (line, column) = message_point(&err);
        WeaveError::parse_error(err.reason.clone(), line, column)
    })
}

fn message_point(message: &Message) -> (usize, usize) {
    match &message.place {
        Some(place) => match place.as_ref() {
            Place::Point(point) => (point.line, point.column),
            Place::Position(position) => (position.start.line, position.start.column),
        },
        None => (1, 1),
    }
}

fn location(position: Option<&markdown::unist::Position>) -> Option<SourceLocation> {
    position.map(|p| SourceLocation::new(p.start.line, p.start.column))
}

struct Converter<'a> {
    openings: &'a [DirectiveOpening],
    /// Link reference definitions: identifier to (url, title).
    definitions: HashMap<String, (String, Option<String>)>,
    md_options: &'a markdown::ParseOptions,
    diagnostics: &'a mut Diagnostics,
}

/// Container opened in the current child list and not yet closed.
struct OpenContainer {
    opening: usize,
    children: Vec<Node>,
}

impl Converter<'_> {
    fn collect_definitions(&mut self, node: &mdast::Node) {
        if let mdast::Node::Definition(definition) = node {
            self.definitions
                .entry(definition.identifier.to_lowercase())
                .or_insert_with(|| (definition.url.clone(), definition.title.clone()));
        }
        if let Some(children) = node.children() {
            for child in children {
                self.collect_definitions(child);
            }
        }
    }

    /// Converts one mdast node. Most nodes map to exactly one node; text may
    /// split around inline directive tokens and some nodes are dropped.
    fn convert(&mut self, node: mdast::Node) -> Vec<Node> {
        let position = location(node.position());
        let (kind, children) = match node {
            mdast::Node::Root(root) => (NodeKind::Root, root.children),
            mdast::Node::Paragraph(paragraph) => (NodeKind::Paragraph, paragraph.children),
            mdast::Node::Heading(heading) => {
                if let Some(token) = block_token(&heading) {
                    return vec![marker_node(token, position)];
                }
                (
                    NodeKind::Heading {
                        depth: heading.depth,
                    },
                    heading.children,
                )
            }
            mdast::Node::Text(text) => return self.convert_text(&text.value, position),
            mdast::Node::InlineCode(code) => (
                NodeKind::InlineCode {
                    value: self.literal(code.value),
                },
                vec![],
            ),
            mdast::Node::Code(code) => (
                NodeKind::Code {
                    value: self.literal(code.value),
                    lang: code.lang,
                    meta: code.meta,
                },
                vec![],
            ),
            mdast::Node::Emphasis(node) => (NodeKind::Emphasis, node.children),
            mdast::Node::Strong(node) => (NodeKind::Strong, node.children),
            mdast::Node::Delete(node) => (NodeKind::Delete, node.children),
            mdast::Node::Link(link) => (
                NodeKind::Link {
                    url: link.url,
                    title: link.title,
                },
                link.children,
            ),
            mdast::Node::LinkReference(reference) => {
                match self.definitions.get(&reference.identifier.to_lowercase()) {
                    Some((url, title)) => (
                        NodeKind::Link {
                            url: url.clone(),
                            title: title.clone(),
                        },
                        reference.children,
                    ),
                    None => (
                        NodeKind::Other {
                            name: "linkReference".into(),
                        },
                        reference.children,
                    ),
                }
            }
            mdast::Node::Image(image) => (
                NodeKind::Image {
                    url: image.url,
                    alt: image.alt,
                    title: image.title,
                },
                vec![],
            ),
            mdast::Node::ImageReference(reference) => {
                let (url, title) = self
                    .definitions
                    .get(&reference.identifier.to_lowercase())
                    .cloned()
                    .unwrap_or_default();
                (
                    NodeKind::Image {
                        url,
                        alt: reference.alt,
                        title,
                    },
                    vec![],
                )
            }
            mdast::Node::Blockquote(node) => (NodeKind::Blockquote, node.children),
            mdast::Node::List(list) => (
                NodeKind::List {
                    ordered: list.ordered,
                    start: list.start,
                    spread: list.spread,
                },
                list.children,
            ),
            mdast::Node::ListItem(item) => (
                NodeKind::ListItem {
                    checked: item.checked,
                },
                item.children,
            ),
            mdast::Node::Break(_) => (NodeKind::Break, vec![]),
            mdast::Node::ThematicBreak(_) => (NodeKind::ThematicBreak, vec![]),
            mdast::Node::Html(html) => (
                NodeKind::Html {
                    value: self.literal(html.value),
                },
                vec![],
            ),
            mdast::Node::Math(math) => (NodeKind::Math { value: math.value }, vec![]),
            mdast::Node::InlineMath(math) => (NodeKind::InlineMath { value: math.value }, vec![]),
            mdast::Node::Table(table) => (other("table"), table.children),
            mdast::Node::TableRow(row) => (other("tableRow"), row.children),
            mdast::Node::TableCell(cell) => (other("tableCell"), cell.children),
            mdast::Node::FootnoteDefinition(definition) => {
                (other("footnoteDefinition"), definition.children)
            }
            mdast::Node::FootnoteReference(_) => (other("footnoteReference"), vec![]),
            mdast::Node::Definition(_) | mdast::Node::Yaml(_) | mdast::Node::Toml(_) => {
                return Vec::new();
            }
            unsupported => {
                log::warn!("dropping unsupported mdast node: {:?}", unsupported);
                return Vec::new();
            }
        };

        let children = self.convert_children(children);
        vec![Node::new(kind, children).with_position(position)]
    }

    /// Converts a child list and rebuilds block directives from the marker
    /// headings the preprocessor left in it.
    fn convert_children(&mut self, children: Vec<mdast::Node>) -> Vec<Node> {
        let converted: Vec<Node> = children
            .into_iter()
            .flat_map(|child| self.convert(child))
            .collect();
        let openings = self.openings;
        let mut out: Vec<Node> = Vec::with_capacity(converted.len());
        let mut open: Vec<OpenContainer> = Vec::new();

        for node in converted {
            let token = match &node.kind {
                NodeKind::Other { name } if name == MARKER => marker_token(&node),
                _ => None,
            };
            match token {
                None => push_child(&mut open, &mut out, node),
                Some(Token::Open(index)) => match openings.get(index) {
                    Some(opening) if opening.kind == DirectiveKind::Container => {
                        open.push(OpenContainer {
                            opening: index,
                            children: Vec::new(),
                        });
                    }
                    Some(opening) => {
                        let leaf = self.build_directive(opening, Vec::new());
                        push_child(&mut open, &mut out, leaf);
                    }
                    None => log::warn!("unknown directive token {}", index),
                },
                Some(Token::Close) => match open.pop() {
                    Some(container) => {
                        let node = self.close_container(container);
                        push_child(&mut open, &mut out, node);
                    }
                    None => log::debug!("directive closer outside its container; ignored"),
                },
            }
        }

        // Containers whose closer ended up in another block end with this list.
        while let Some(container) = open.pop() {
            let node = self.close_container(container);
            push_child(&mut open, &mut out, node);
        }
        out
    }

    fn close_container(&mut self, container: OpenContainer) -> Node {
        let openings = self.openings;
        match openings.get(container.opening) {
            Some(opening) => self.build_directive(opening, container.children),
            None => Node::root(container.children),
        }
    }

    /// Literal values never carry tokens; put back what was written.
    fn literal(&self, value: String) -> String {
        match restore_tokens(&value, self.openings) {
            std::borrow::Cow::Borrowed(_) => value,
            std::borrow::Cow::Owned(restored) => restored,
        }
    }

    fn convert_text(&mut self, value: &str, position: Option<SourceLocation>) -> Vec<Node> {
        if self.openings.is_empty() || !value.contains(crate::syntax::TOKEN_START) {
            return vec![Node::text(value).with_position(position)];
        }
        let openings = self.openings;
        let mut nodes = Vec::new();
        for segment in split_tokens(value) {
            match segment {
                Segment::Text(text) => nodes.push(Node::text(text).with_position(position.clone())),
                Segment::Token(Token::Open(index)) => match openings.get(index) {
                    Some(opening) => nodes.push(self.build_directive(opening, Vec::new())),
                    None => log::warn!("unknown directive token {}", index),
                },
                Segment::Token(Token::Close) => {}
            }
        }
        nodes
    }

    /// Builds a directive node. The bracket label becomes a label paragraph
    /// for containers and plain phrasing children otherwise.
    fn build_directive(&mut self, opening: &DirectiveOpening, body: Vec<Node>) -> Node {
        let attributes = Properties::from_attributes(parse_attributes(&opening.raw_attrs));
        let directive = Directive {
            name: opening.name.clone(),
            attributes,
        };
        let mut children = Vec::with_capacity(body.len() + 1);
        if let Some(label) = &opening.label {
            let phrasing = self.parse_label(label, &opening.location);
            match opening.kind {
                DirectiveKind::Container => children.push(
                    Node::label(phrasing).with_position(Some(opening.location.clone())),
                ),
                DirectiveKind::Leaf | DirectiveKind::Text => children.extend(phrasing),
            }
        }
        children.extend(body);
        Node::directive(opening.kind, directive, children)
            .with_position(Some(opening.location.clone()))
    }

    /// Parses label text as inline markdown.
    fn parse_label(&mut self, label: &str, at: &SourceLocation) -> Vec<Node> {
        let paragraph = match markdown::to_mdast(label, self.md_options) {
            Ok(mdast::Node::Root(root)) => root
                .children
                .into_iter()
                .find(|child| matches!(child, mdast::Node::Paragraph(_))),
            Ok(_) => None,
            Err(err) => {
                self.diagnostics.add_warning_at(
                    format!("Directive label could not be parsed: {}", err.reason),
                    at.line,
                    at.column,
                );
                None
            }
        };
        match paragraph {
            Some(mdast::Node::Paragraph(paragraph)) => paragraph
                .children
                .into_iter()
                .flat_map(|child| self.convert(child))
                .map(|mut node| {
                    // Positions inside the label string are meaningless here.
                    crate::visit::visit_mut(&mut node, |n| n.position = None);
                    node
                })
                .collect(),
            _ if label.is_empty() => Vec::new(),
            _ => vec![Node::text(label)],
        }
    }
}

fn push_child(open: &mut [OpenContainer], out: &mut Vec<Node>, node: Node) {
    match open.last_mut() {
        Some(container) => container.children.push(node),
        None => out.push(node),
    }
}

/// Internal kind name of block marker nodes between conversion steps.
const MARKER: &str = "\u{E000}marker";

fn other(name: &str) -> NodeKind {
    NodeKind::Other {
        name: name.to_string(),
    }
}

/// Token carried by a `###### <token>` marker heading.
fn block_token(heading: &mdast::Heading) -> Option<Token> {
    if heading.depth != 6 || heading.children.len() != 1 {
        return None;
    }
    match &heading.children[0] {
        mdast::Node::Text(text) => Token::parse(text.value.trim()),
        _ => None,
    }
}

fn marker_node(token: Token, position: Option<SourceLocation>) -> Node {
    let value = match token {
        Token::Open(index) => index.to_string(),
        Token::Close => "/".to_string(),
    };
    Node::new(other(MARKER), vec![Node::text(value)]).with_position(position)
}

fn marker_token(node: &Node) -> Option<Token> {
    match node.children.first().and_then(Node::value)? {
        "/" => Some(Token::Close),
        index => index.parse().ok().map(Token::Open),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::to_string;

    fn parse(source: &str) -> ParsedDocument {
        parse_document(source, &ParseOptions::markdown()).unwrap()
    }

    fn kinds(nodes: &[Node]) -> Vec<&str> {
        nodes.iter().map(Node::kind_name).collect()
    }

    #[test]
    fn converts_basic_markdown() {
        let doc = parse("# Title\n\nHello *world* and [link](https://x.dev).\n\n- a\n- [x] b\n");
        assert_eq!(kinds(&doc.tree.children), vec!["heading", "paragraph", "list"]);
        assert_eq!(to_string(&doc.tree.children[1]), "Hello world and link.");
        let list = &doc.tree.children[2];
        assert!(matches!(
            list.children[1].kind,
            NodeKind::ListItem {
                checked: Some(true)
            }
        ));
        assert_eq!(doc.tree.children[0].position, Some(SourceLocation::new(1, 1)));
    }

    #[test]
    fn frontmatter_is_read_and_kept_out_of_the_tree() {
        let doc = parse("---\ntitle: Post\n---\n\nBody\n");
        assert_eq!(doc.frontmatter["title"], "Post");
        assert_eq!(kinds(&doc.tree.children), vec!["paragraph"]);
        assert_eq!(doc.tree.children[0].position, Some(SourceLocation::new(5, 1)));
    }

    #[test]
    fn container_directive_with_label() {
        let doc = parse(":::note[Custom *Title*]{.wide}\nBody text\n:::\n\nAfter");
        assert_eq!(kinds(&doc.tree.children), vec!["containerDirective", "paragraph"]);

        let note = &doc.tree.children[0];
        let (kind, directive) = note.as_directive().unwrap();
        assert_eq!(kind, DirectiveKind::Container);
        assert_eq!(directive.name, "note");
        assert_eq!(directive.attributes.classes(), vec!["wide"]);
        assert!(note.has_label_child());
        assert_eq!(to_string(&note.children[0]), "Custom Title");
        assert_eq!(to_string(&note.children[1]), "Body text");
    }

    #[test]
    fn nested_containers_and_leaf() {
        let doc = parse(":::note\nOuter\n\n:::tip\nInner\n:::\n\n::github{repo=\"a/b\"}\n:::\n");
        assert_eq!(doc.tree.children.len(), 1);
        let note = &doc.tree.children[0];
        assert_eq!(
            kinds(&note.children),
            vec!["paragraph", "containerDirective", "leafDirective"]
        );
        let (_, leaf) = note.children[2].as_directive().unwrap();
        assert_eq!(leaf.attributes.get_str("repo"), Some("a/b"));
        assert!(!doc.diagnostics.has_any());
    }

    #[test]
    fn container_interrupts_paragraph() {
        let doc = parse("Intro line\n:::tip\nTip body\n:::");
        assert_eq!(kinds(&doc.tree.children), vec!["paragraph", "containerDirective"]);
    }

    #[test]
    fn text_directive_inside_paragraph() {
        let doc = parse("Press :kbd[Ctrl] now.");
        let paragraph = &doc.tree.children[0];
        assert_eq!(kinds(&paragraph.children), vec!["text", "textDirective", "text"]);
        assert_eq!(to_string(&paragraph.children[1]), "Ctrl");
    }

    #[test]
    fn unclosed_container_is_warned() {
        let doc = parse(":::warning\nNever closed");
        assert_eq!(kinds(&doc.tree.children), vec!["containerDirective"]);
        assert_eq!(doc.diagnostics.warnings.len(), 1);
    }

    #[test]
    fn directives_off_leaves_colons_alone() {
        let options = ParseOptions {
            directives: false,
            ..ParseOptions::markdown()
        };
        let doc = parse_document(":::note\nx\n:::", &options).unwrap();
        assert!(kinds(&doc.tree.children).iter().all(|k| *k == "paragraph"));
    }

    #[test]
    fn reference_links_are_resolved() {
        let doc = parse("See [docs][d].\n\n[d]: https://docs.rs \"Docs\"\n");
        assert_eq!(doc.tree.children.len(), 1);
        let link = &doc.tree.children[0].children[1];
        assert_eq!(
            link.kind,
            NodeKind::Link {
                url: "https://docs.rs".into(),
                title: Some("Docs".into()),
            }
        );
    }

    #[test]
    fn plain_angle_brackets_parse() {
        let doc = parse("a < 3 and <span>raw</span>\n");
        assert_eq!(kinds(&doc.tree.children), vec!["paragraph"]);
    }

    #[test]
    fn bad_frontmatter_is_an_error() {
        let err = parse_document("---\ntitle: [x\n---\n", &ParseOptions::markdown()).unwrap_err();
        assert!(matches!(err, WeaveError::Frontmatter(_)));
    }
}
