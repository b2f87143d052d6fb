//! Document tree node model.
//!
//! Nodes follow the mdast shape (`type`, `children`, `data`) but the kind is a
//! closed enum so passes can match exhaustively instead of probing fields.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{SourceLocation, WeaveError};

/// Attribute key set by the directive resolver when a directive carries a label.
pub const DIRECTIVE_LABEL_ATTRIBUTE: &str = "has-directive-label";

/// A presentation property value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Boolean property (`hidden`, `has-directive-label`, ...).
    Bool(bool),
    /// Plain string property.
    String(String),
    /// Space-separated token list (`className`).
    List(Vec<String>),
}

impl PropertyValue {
    /// Returns the value as a string slice when it is a plain string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns true for `Bool(true)` and for the literal string `"true"`.
    pub fn is_truthy(&self) -> bool {
        match self {
            PropertyValue::Bool(value) => *value,
            PropertyValue::String(value) => value == "true",
            PropertyValue::List(values) => !values.is_empty(),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(value: Vec<String>) -> Self {
        PropertyValue::List(value)
    }
}

/// Ordered property map shared by directive attributes and presentation elements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties(BTreeMap<String, PropertyValue>);

impl Properties {
    /// Creates an empty property map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds properties from raw `key=value` attributes, normalizing `class`
    /// into a `className` token list.
    pub fn from_attributes<I, K, V>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut properties = Self::new();
        for (key, value) in attributes {
            properties.insert_attribute(key, value);
        }
        properties
    }

    /// Inserts a raw attribute. `class` values are split on whitespace and
    /// appended to `className`; everything else is stored as a string.
    pub fn insert_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if key == "class" || key == "className" {
            for token in value.split_whitespace() {
                self.push_class(token);
            }
        } else {
            self.0.insert(key, PropertyValue::String(value));
        }
    }

    /// Inserts a property, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Appends a class token to `className` (deduplicated).
    pub fn push_class(&mut self, class: &str) {
        let entry = self
            .0
            .entry("className".to_string())
            .or_insert_with(|| PropertyValue::List(Vec::new()));
        match entry {
            PropertyValue::List(classes) => {
                if !classes.iter().any(|c| c == class) {
                    classes.push(class.to_string());
                }
            }
            other => {
                let mut classes: Vec<String> = match other {
                    PropertyValue::String(value) => {
                        value.split_whitespace().map(str::to_string).collect()
                    }
                    _ => Vec::new(),
                };
                if !classes.iter().any(|c| c == class) {
                    classes.push(class.to_string());
                }
                *other = PropertyValue::List(classes);
            }
        }
    }

    /// Returns the property value for `key`.
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.0.get(key)
    }

    /// Returns the property for `key` when it is a plain string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(PropertyValue::as_str)
    }

    /// Returns true if the property exists and is truthy.
    pub fn is_true(&self, key: &str) -> bool {
        self.0.get(key).is_some_and(PropertyValue::is_truthy)
    }

    /// Removes and returns the property for `key`.
    pub fn remove(&mut self, key: &str) -> Option<PropertyValue> {
        self.0.remove(key)
    }

    /// Returns true if the property exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Class tokens from `className`, in insertion order.
    pub fn classes(&self) -> Vec<&str> {
        match self.0.get("className") {
            Some(PropertyValue::List(classes)) => classes.iter().map(String::as_str).collect(),
            Some(PropertyValue::String(value)) => value.split_whitespace().collect(),
            _ => Vec::new(),
        }
    }

    /// Iterates over properties in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &PropertyValue)> {
        self.0.iter()
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no properties.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<PropertyValue>> FromIterator<(K, V)> for Properties {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut properties = Properties::new();
        for (key, value) in iter {
            properties.insert(key, value);
        }
        properties
    }
}

/// The three directive shapes emitted by directive-syntax parsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    /// `:::name` ... `:::` block wrapping flow content.
    Container,
    /// `::name[label]{attrs}` self-contained block.
    Leaf,
    /// `:name[label]{attrs}` inside phrasing content.
    Text,
}

impl DirectiveKind {
    /// mdast node type string for this shape.
    pub fn as_str(self) -> &'static str {
        match self {
            DirectiveKind::Container => "containerDirective",
            DirectiveKind::Leaf => "leafDirective",
            DirectiveKind::Text => "textDirective",
        }
    }
}

/// Directive payload shared by container, leaf, and text directives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Directive {
    /// Directive identifier (e.g. `note`, `github`).
    pub name: String,
    /// Directive-supplied attributes.
    #[serde(default)]
    pub attributes: Properties,
}

impl Directive {
    /// Creates a directive, validating the name.
    ///
    /// Names must start with an ASCII letter and contain only ASCII
    /// alphanumerics, `-`, or `_`.
    pub fn new(name: impl Into<String>, attributes: Properties) -> Result<Self, WeaveError> {
        let name = name.into();
        if !is_valid_directive_name(&name) {
            return Err(WeaveError::InvalidNode {
                kind: "directive",
                message: format!("invalid directive name `{}`", name),
            });
        }
        Ok(Self { name, attributes })
    }
}

/// Returns true if `name` is usable as a directive identifier.
pub fn is_valid_directive_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        }
        _ => false,
    }
}

/// Node kinds understood by the passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeKind {
    /// Document root.
    Root,
    /// Paragraph block.
    Paragraph,
    /// Heading block.
    Heading {
        /// Heading depth (1-6).
        depth: u8,
    },
    /// Literal text.
    Text {
        /// Text content.
        value: String,
    },
    /// Inline code span.
    InlineCode {
        /// Code content.
        value: String,
    },
    /// Fenced or indented code block.
    Code {
        /// Code content.
        value: String,
        /// Info-string language.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lang: Option<String>,
        /// Info-string remainder.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        meta: Option<String>,
    },
    /// Emphasis (`*a*`).
    Emphasis,
    /// Strong emphasis (`**a**`).
    Strong,
    /// Strikethrough (`~~a~~`).
    Delete,
    /// Hyperlink.
    Link {
        /// Destination.
        url: String,
        /// Optional title.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    /// Image.
    Image {
        /// Source.
        url: String,
        /// Alternative text.
        alt: String,
        /// Optional title.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    /// Block quote.
    Blockquote,
    /// Ordered or unordered list.
    List {
        /// Whether the list is ordered.
        ordered: bool,
        /// Start number for ordered lists.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start: Option<u32>,
        /// Loose list: items are separated by blank lines.
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        spread: bool,
    },
    /// List item.
    ListItem {
        /// Task list state, when the item is a task.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        checked: Option<bool>,
    },
    /// Hard line break.
    Break,
    /// Thematic break (`---`).
    ThematicBreak,
    /// Raw HTML.
    Html {
        /// Raw markup.
        value: String,
    },
    /// Display math.
    Math {
        /// TeX source.
        value: String,
    },
    /// Inline math.
    InlineMath {
        /// TeX source.
        value: String,
    },
    /// `:::name` container directive.
    ContainerDirective(Directive),
    /// `::name` leaf directive.
    LeafDirective(Directive),
    /// `:name` text directive.
    TextDirective(Directive),
    /// Any node kind the passes do not interpret (tables, footnotes, ...).
    Other {
        /// Original mdast type name.
        name: String,
    },
}

/// Typed cross-pass annotations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Data {
    /// Set by the directive-syntax parser on a directive's label paragraph.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub directive_label: bool,
    /// Presentation tag the downstream renderer materializes for this node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_tag_name: Option<String>,
    /// Presentation properties for `target_tag_name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_properties: Option<Properties>,
}

impl Data {
    /// Returns true when no annotation is present.
    pub fn is_empty(&self) -> bool {
        !self.directive_label && self.target_tag_name.is_none() && self.target_properties.is_none()
    }
}

/// A document tree node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Node kind and kind-specific fields.
    #[serde(flatten)]
    pub kind: NodeKind,
    /// Children in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
    /// Cross-pass annotations.
    #[serde(default, skip_serializing_if = "Data::is_empty")]
    pub data: Data,
    /// Start of the node in the source, when parsed from text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<SourceLocation>,
}

impl Node {
    /// Creates a node of `kind` with `children`.
    pub fn new(kind: NodeKind, children: Vec<Node>) -> Self {
        Self {
            kind,
            children,
            data: Data::default(),
            position: None,
        }
    }

    /// Creates a root node.
    pub fn root(children: Vec<Node>) -> Self {
        Self::new(NodeKind::Root, children)
    }

    /// Creates a paragraph node.
    pub fn paragraph(children: Vec<Node>) -> Self {
        Self::new(NodeKind::Paragraph, children)
    }

    /// Creates a paragraph holding a single text node.
    pub fn paragraph_text(value: impl Into<String>) -> Self {
        Self::paragraph(vec![Self::text(value)])
    }

    /// Creates a paragraph marked as a directive label.
    pub fn label(children: Vec<Node>) -> Self {
        let mut node = Self::paragraph(children);
        node.data.directive_label = true;
        node
    }

    /// Creates a heading node.
    pub fn heading(depth: u8, children: Vec<Node>) -> Self {
        Self::new(NodeKind::Heading { depth }, children)
    }

    /// Creates a text leaf.
    pub fn text(value: impl Into<String>) -> Self {
        Self::new(
            NodeKind::Text {
                value: value.into(),
            },
            Vec::new(),
        )
    }

    /// Creates a block quote.
    pub fn blockquote(children: Vec<Node>) -> Self {
        Self::new(NodeKind::Blockquote, children)
    }

    /// Creates a directive node of the given shape.
    pub fn directive(kind: DirectiveKind, directive: Directive, children: Vec<Node>) -> Self {
        let kind = match kind {
            DirectiveKind::Container => NodeKind::ContainerDirective(directive),
            DirectiveKind::Leaf => NodeKind::LeafDirective(directive),
            DirectiveKind::Text => NodeKind::TextDirective(directive),
        };
        Self::new(kind, children)
    }

    /// Attaches a source position.
    pub fn with_position(mut self, position: Option<SourceLocation>) -> Self {
        self.position = position;
        self
    }

    /// mdast type name of this node.
    pub fn kind_name(&self) -> &str {
        match &self.kind {
            NodeKind::Root => "root",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Heading { .. } => "heading",
            NodeKind::Text { .. } => "text",
            NodeKind::InlineCode { .. } => "inlineCode",
            NodeKind::Code { .. } => "code",
            NodeKind::Emphasis => "emphasis",
            NodeKind::Strong => "strong",
            NodeKind::Delete => "delete",
            NodeKind::Link { .. } => "link",
            NodeKind::Image { .. } => "image",
            NodeKind::Blockquote => "blockquote",
            NodeKind::List { .. } => "list",
            NodeKind::ListItem { .. } => "listItem",
            NodeKind::Break => "break",
            NodeKind::ThematicBreak => "thematicBreak",
            NodeKind::Html { .. } => "html",
            NodeKind::Math { .. } => "math",
            NodeKind::InlineMath { .. } => "inlineMath",
            NodeKind::ContainerDirective(_) => DirectiveKind::Container.as_str(),
            NodeKind::LeafDirective(_) => DirectiveKind::Leaf.as_str(),
            NodeKind::TextDirective(_) => DirectiveKind::Text.as_str(),
            NodeKind::Other { name } => name.as_str(),
        }
    }

    /// Returns true for paragraph nodes.
    pub fn is_paragraph(&self) -> bool {
        matches!(self.kind, NodeKind::Paragraph)
    }

    /// Returns the directive payload and shape if this is a directive node.
    pub fn as_directive(&self) -> Option<(DirectiveKind, &Directive)> {
        match &self.kind {
            NodeKind::ContainerDirective(d) => Some((DirectiveKind::Container, d)),
            NodeKind::LeafDirective(d) => Some((DirectiveKind::Leaf, d)),
            NodeKind::TextDirective(d) => Some((DirectiveKind::Text, d)),
            _ => None,
        }
    }

    /// Mutable access to the directive payload.
    pub fn as_directive_mut(&mut self) -> Option<&mut Directive> {
        match &mut self.kind {
            NodeKind::ContainerDirective(d)
            | NodeKind::LeafDirective(d)
            | NodeKind::TextDirective(d) => Some(d),
            _ => None,
        }
    }

    /// Returns true if the first child is marked as a directive label.
    pub fn has_label_child(&self) -> bool {
        self.children
            .first()
            .is_some_and(|child| child.data.directive_label)
    }

    /// Literal value carried by text-like leaves.
    pub fn value(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text { value }
            | NodeKind::InlineCode { value }
            | NodeKind::Code { value, .. }
            | NodeKind::Html { value }
            | NodeKind::Math { value }
            | NodeKind::InlineMath { value } => Some(value),
            _ => None,
        }
    }

    /// Returns true for block-level (flow) kinds.
    pub fn is_block(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Root
                | NodeKind::Paragraph
                | NodeKind::Heading { .. }
                | NodeKind::Code { .. }
                | NodeKind::Blockquote
                | NodeKind::List { .. }
                | NodeKind::ListItem { .. }
                | NodeKind::ThematicBreak
                | NodeKind::Math { .. }
                | NodeKind::ContainerDirective(_)
                | NodeKind::LeafDirective(_)
        )
    }
}
