//! Callout blocks.

use std::fmt;
use std::str::FromStr;

use mdweave_core::{DIRECTIVE_LABEL_ATTRIBUTE, Properties};
use serde::{Deserialize, Serialize};

use super::ComponentError;
use crate::element::{Element, HastNode};

/// Visual variant of an admonition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdmonitionVariant {
    /// `note`
    Note,
    /// `tip`
    Tip,
    /// `important`
    Important,
    /// `caution`
    Caution,
    /// `warning`
    Warning,
}

impl AdmonitionVariant {
    /// Every variant, in declaration order.
    pub const ALL: [AdmonitionVariant; 5] = [
        AdmonitionVariant::Note,
        AdmonitionVariant::Tip,
        AdmonitionVariant::Important,
        AdmonitionVariant::Caution,
        AdmonitionVariant::Warning,
    ];

    /// Lower-case name, as used in directive names and class suffixes.
    pub fn as_str(self) -> &'static str {
        match self {
            AdmonitionVariant::Note => "note",
            AdmonitionVariant::Tip => "tip",
            AdmonitionVariant::Important => "important",
            AdmonitionVariant::Caution => "caution",
            AdmonitionVariant::Warning => "warning",
        }
    }

    /// Default title when the directive has no label.
    pub fn title(self) -> String {
        self.as_str().to_uppercase()
    }

    /// Variant class, `bdm-<variant>`.
    pub fn class_name(self) -> String {
        format!("bdm-{}", self.as_str())
    }
}

impl fmt::Display for AdmonitionVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for names that are not an admonition variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown admonition variant `{0}`")]
pub struct UnknownVariant(pub String);

impl FromStr for AdmonitionVariant {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AdmonitionVariant::ALL
            .into_iter()
            .find(|variant| variant.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

/// Renders an admonition, substituting the hidden diagnostic fragment for
/// invalid input.
pub fn render_admonition(
    properties: &Properties,
    children: Vec<HastNode>,
    variant: AdmonitionVariant,
) -> Element {
    try_render_admonition(properties, children, variant).unwrap_or_else(|err| {
        log::warn!("{} admonition: {}", variant, err);
        err.to_element()
    })
}

/// Renders an admonition.
///
/// With `has-directive-label` set, the first child is taken as the title.
/// A label paragraph becomes a `div` so it can sit inside the title span.
pub fn try_render_admonition(
    properties: &Properties,
    children: Vec<HastNode>,
    variant: AdmonitionVariant,
) -> Result<Element, ComponentError> {
    if children.is_empty() {
        return Err(ComponentError::EmptyAdmonition);
    }

    let mut body = children;
    let title = Element::new("span").with_class("bdm-title");
    let title = if properties.is_true(DIRECTIVE_LABEL_ATTRIBUTE) {
        title.child(retag_label(body.remove(0)))
    } else {
        title.child(variant.title())
    };

    Ok(Element::new("blockquote")
        .with_class("admonition")
        .with_class(&variant.class_name())
        .child(title)
        .with_children(body))
}

fn retag_label(label: HastNode) -> HastNode {
    match label {
        HastNode::Element(element) if element.tag_name == "p" => Element::new("div")
            .with_properties(element.properties)
            .with_children(element.children)
            .into(),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Root;

    fn labelled() -> Properties {
        let mut properties = Properties::new();
        properties.insert(DIRECTIVE_LABEL_ATTRIBUTE, true);
        properties
    }

    fn paragraph(text: &str) -> HastNode {
        Element::new("p").child(text).into()
    }

    #[test]
    fn unlabelled_note_uses_variant_title() {
        let out = render_admonition(
            &Properties::new(),
            vec![paragraph("Body text")],
            AdmonitionVariant::Note,
        );
        let json = serde_json::to_string(&Root::new(vec![out.into()])).unwrap();
        insta::assert_snapshot!(json, @r#"{"type":"root","children":[{"type":"element","tagName":"blockquote","properties":{"className":["admonition","bdm-note"]},"children":[{"type":"element","tagName":"span","properties":{"className":["bdm-title"]},"children":[{"type":"text","value":"NOTE"}]},{"type":"element","tagName":"p","properties":{},"children":[{"type":"text","value":"Body text"}]}]}]}"#);
    }

    #[test]
    fn label_becomes_title_and_leaves_body() {
        let out = render_admonition(
            &labelled(),
            vec![paragraph("Custom Title"), paragraph("Body text")],
            AdmonitionVariant::Tip,
        );
        assert_eq!(out.classes(), vec!["admonition", "bdm-tip"]);
        let title = out.children[0].as_element().unwrap();
        assert!(title.has_class("bdm-title"));
        let label = title.children[0].as_element().unwrap();
        assert_eq!(label.tag_name, "div");
        assert_eq!(label.text_content(), "Custom Title");
        assert_eq!(out.children.len(), 2);
        assert_eq!(out.children[1].text_content(), "Body text");
    }

    #[test]
    fn non_paragraph_label_keeps_its_tag() {
        let label: HastNode = Element::new("strong").child("Bold").into();
        let out = render_admonition(&labelled(), vec![label], AdmonitionVariant::Warning);
        let title = out.children[0].as_element().unwrap();
        assert_eq!(title.children[0].as_element().unwrap().tag_name, "strong");
        assert_eq!(out.children.len(), 1);
    }

    #[test]
    fn empty_children_render_hidden_diagnostic() {
        let out = render_admonition(&labelled(), Vec::new(), AdmonitionVariant::Note);
        assert_eq!(out.tag_name, "div");
        assert_eq!(out.classes(), vec!["hidden"]);
        assert_eq!(
            out.text_content(),
            r#"Invalid admonition directive. (Admonition directives must be of block type ":::note{name="name"} <content> :::")"#
        );
        assert_eq!(
            try_render_admonition(&Properties::new(), Vec::new(), AdmonitionVariant::Tip),
            Err(ComponentError::EmptyAdmonition)
        );
    }

    #[test]
    fn variants_get_distinct_classes() {
        let classes: Vec<Vec<String>> = AdmonitionVariant::ALL
            .into_iter()
            .map(|variant| {
                render_admonition(&Properties::new(), vec![paragraph("x")], variant)
                    .classes()
                    .into_iter()
                    .map(str::to_string)
                    .collect()
            })
            .collect();
        for (variant, classes) in AdmonitionVariant::ALL.into_iter().zip(&classes) {
            assert_eq!(classes, &vec!["admonition".to_string(), variant.class_name()]);
        }
        let unique: std::collections::HashSet<_> = classes.iter().map(|c| &c[1]).collect();
        assert_eq!(unique.len(), 5);
    }

    #[test]
    fn parses_variant_names() {
        assert_eq!("Caution".parse::<AdmonitionVariant>(), Ok(AdmonitionVariant::Caution));
        assert_eq!(
            "danger".parse::<AdmonitionVariant>(),
            Err(UnknownVariant("danger".into()))
        );
        assert_eq!(AdmonitionVariant::Important.title(), "IMPORTANT");
    }
}
