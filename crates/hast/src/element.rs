//! hast-shaped presentation tree.
//!
//! Serializes to the same JSON shape as hast (`type`, `tagName`,
//! `properties`, `children`) so hosts can hand it to any hast tooling.

use mdweave_core::{Properties, PropertyValue};
use serde::{Deserialize, Serialize};

/// Root of a presentation tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "root")]
pub struct Root {
    /// Top-level nodes in document order.
    pub children: Vec<HastNode>,
}

/// Element with a tag name, properties and children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Tag name (`blockquote`, `span`, or a directive name before rendering).
    pub tag_name: String,
    /// Properties in hast naming (`className`, `href`, ...).
    #[serde(default)]
    pub properties: Properties,
    /// Child nodes.
    #[serde(default)]
    pub children: Vec<HastNode>,
}

/// Any node of the presentation tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HastNode {
    /// An element.
    Element(Element),
    /// Text content.
    Text {
        /// The text.
        value: String,
    },
    /// Raw HTML passed through from the source.
    Raw {
        /// The HTML.
        value: String,
    },
}

impl Element {
    /// Creates an element with no properties or children.
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            properties: Properties::new(),
            children: Vec::new(),
        }
    }

    /// Adds one or more space-separated classes.
    pub fn with_class(mut self, classes: &str) -> Self {
        for class in classes.split_whitespace() {
            self.properties.push_class(class);
        }
        self
    }

    /// Sets a property.
    pub fn with_property(mut self, key: &str, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key, value);
        self
    }

    /// Replaces all properties.
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    /// Appends a child.
    pub fn child(mut self, child: impl Into<HastNode>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Appends children.
    pub fn with_children(mut self, children: impl IntoIterator<Item = HastNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Class list.
    pub fn classes(&self) -> Vec<&str> {
        self.properties.classes()
    }

    /// Returns true if the element carries `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().contains(&class)
    }

    /// Concatenated text of all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.push_text(&mut out);
        }
        out
    }
}

impl HastNode {
    /// Text node.
    pub fn text(value: impl Into<String>) -> Self {
        HastNode::Text {
            value: value.into(),
        }
    }

    /// Returns the element, if this is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            HastNode::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Mutable access to the element, if this is one.
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            HastNode::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        match self {
            HastNode::Element(element) => {
                for child in &element.children {
                    child.push_text(out);
                }
            }
            HastNode::Text { value } => out.push_str(value),
            HastNode::Raw { .. } => {}
        }
    }
}

impl From<Element> for HastNode {
    fn from(element: Element) -> Self {
        HastNode::Element(element)
    }
}

impl From<&str> for HastNode {
    fn from(value: &str) -> Self {
        HastNode::text(value)
    }
}

impl From<String> for HastNode {
    fn from(value: String) -> Self {
        HastNode::text(value)
    }
}

impl Root {
    /// Creates a root.
    pub fn new(children: Vec<HastNode>) -> Self {
        Self { children }
    }

    /// Concatenated text of the whole tree.
    pub fn text_content(&self) -> String {
        self.children.iter().map(HastNode::text_content).collect()
    }
}
