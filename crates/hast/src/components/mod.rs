//! Component rendering over the presentation tree.
//!
//! Elements whose tag name is registered are replaced by the component's
//! output. Children are rendered before their parent, so a card nested in
//! a callout is already expanded when the callout sees it.

use mdweave_core::{Diagnostics, RecoverableError, Slugger};

use crate::element::{Element, HastNode, Root};
use crate::registry::{ComponentKind, ComponentRegistry};

/// Callout blocks.
pub mod admonition;
/// Repository card placeholder.
pub mod card;

pub use admonition::{AdmonitionVariant, render_admonition, try_render_admonition};
pub use card::{render_card, try_render_card};

/// Invalid component input. Rendered in place as a hidden fragment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComponentError {
    /// Admonition with nothing inside.
    #[error(
        "Invalid admonition directive. (Admonition directives must be of block type \":::note{{name=\"name\"}} <content> :::\")"
    )]
    EmptyAdmonition,
    /// Card written as a container or with a label.
    #[error("Invalid directive. (\"github\" directive must be leaf type \"::github{{repo=\"owner/repo\"}}\")")]
    CardNotLeaf,
    /// Card without a usable `repo` attribute.
    #[error("Invalid repository. (\"repo\" attribute must be in the format \"owner/repo\")")]
    InvalidRepository,
}

impl ComponentError {
    /// Hidden `div` carrying the message.
    pub fn to_element(&self) -> Element {
        Element::new("div").with_class("hidden").child(self.to_string())
    }
}

/// Renders one element as `kind`. `ids` hands out element ids that must be
/// unique within the document.
pub fn render_component(
    kind: ComponentKind,
    element: Element,
    ids: &mut Slugger,
) -> Result<Element, ComponentError> {
    match kind {
        ComponentKind::Admonition { variant } => {
            try_render_admonition(&element.properties, element.children, variant)
        }
        ComponentKind::GithubCard => try_render_card(&element.properties, element.children, ids),
    }
}

/// Replaces every registered element in `root`. Returns how many were
/// rendered; invalid ones are also recorded in `diagnostics`.
pub fn apply_components(
    root: &mut Root,
    registry: &ComponentRegistry,
    diagnostics: &mut Diagnostics,
) -> usize {
    let mut context = Context {
        registry,
        diagnostics,
        ids: Slugger::new(),
        rendered: 0,
    };
    context.apply(&mut root.children);
    log::debug!("rendered {} component(s)", context.rendered);
    context.rendered
}

struct Context<'a> {
    registry: &'a ComponentRegistry,
    diagnostics: &'a mut Diagnostics,
    ids: Slugger,
    rendered: usize,
}

impl Context<'_> {
    fn apply(&mut self, children: &mut [HastNode]) {
        for child in children {
            let Some(element) = child.as_element_mut() else {
                continue;
            };
            self.apply(&mut element.children);

            let Some(kind) = self.registry.get(&element.tag_name) else {
                continue;
            };
            let name = element.tag_name.clone();
            let taken = std::mem::replace(element, Element::new("div"));
            *element = match render_component(kind, taken, &mut self.ids) {
                Ok(output) => output,
                Err(err) => {
                    log::warn!("component `{}`: {}", name, err);
                    self.diagnostics.add_error(RecoverableError::error(
                        format!("`{}`: {}", name, err),
                        None,
                    ));
                    err.to_element()
                }
            };
            self.rendered += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdweave_core::{DIRECTIVE_LABEL_ATTRIBUTE, ErrorSeverity};

    fn note(children: Vec<HastNode>) -> HastNode {
        Element::new("note").with_children(children).into()
    }

    #[test]
    fn replaces_registered_elements_children_first() {
        let card: HastNode = Element::new("github")
            .with_property("repo", "rust-lang/rust")
            .into();
        let mut root = Root::new(vec![note(vec![card]), Element::new("p").child("x").into()]);
        let mut diagnostics = Diagnostics::new();

        let count = apply_components(&mut root, &ComponentRegistry::default(), &mut diagnostics);

        assert_eq!(count, 2);
        assert!(!diagnostics.has_any());
        let admonition = root.children[0].as_element().unwrap();
        assert_eq!(admonition.tag_name, "blockquote");
        let inner = admonition.children[1].as_element().unwrap();
        assert!(inner.has_class("card-github"));
        assert_eq!(root.children[1].as_element().unwrap().tag_name, "p");
    }

    #[test]
    fn invalid_components_are_recorded() {
        let mut root = Root::new(vec![
            note(Vec::new()),
            Element::new("github").into(),
        ]);
        let mut diagnostics = Diagnostics::new();

        apply_components(&mut root, &ComponentRegistry::default(), &mut diagnostics);

        assert_eq!(diagnostics.errors.len(), 2);
        assert!(diagnostics.errors.iter().all(|e| e.severity == ErrorSeverity::Error));
        assert!(diagnostics.errors[0].message.starts_with("`note`: Invalid admonition"));
        for child in &root.children {
            assert!(child.as_element().unwrap().has_class("hidden"));
        }
    }

    #[test]
    fn unregistered_names_are_left_alone() {
        let mut root = Root::new(vec![
            Element::new("kbd")
                .with_property(DIRECTIVE_LABEL_ATTRIBUTE, true)
                .child("Ctrl")
                .into(),
        ]);
        let before = root.clone();
        let count = apply_components(&mut root, &ComponentRegistry::new(), &mut Diagnostics::new());
        assert_eq!(count, 0);
        assert_eq!(root, before);
    }
}
