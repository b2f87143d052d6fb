//! Directive resolution.
//!
//! Walks a tree that already contains directive nodes and annotates each one
//! with the presentation shape a renderer must materialize in its place: the
//! directive name becomes the tag, its attributes become the properties.
//! Nodes are annotated, never replaced or removed.

use crate::tree::{DIRECTIVE_LABEL_ATTRIBUTE, Node, Properties};
use crate::visit::visit_mut;

/// Annotates every directive node in `tree`. Returns how many were resolved.
///
/// Running it twice produces the same annotations.
pub fn resolve_directives(tree: &mut Node) -> usize {
    let mut resolved = 0usize;
    visit_mut(tree, |node| {
        if resolve_directive(node) {
            resolved += 1;
        }
    });
    log::debug!("resolved {} directive(s)", resolved);
    resolved
}

/// Resolves a single node. Returns false if it is not a directive.
pub fn resolve_directive(node: &mut Node) -> bool {
    let has_label = node.has_label_child();
    let (tag_name, properties) = {
        let Some(directive) = node.as_directive_mut() else {
            return false;
        };
        if has_label {
            directive
                .attributes
                .insert(DIRECTIVE_LABEL_ATTRIBUTE, true);
        }
        (directive.name.clone(), directive.attributes.clone())
    };

    log::debug!(
        "directive `{}` ({}) -> <{}> with {} propert{}",
        tag_name,
        node.kind_name(),
        tag_name,
        properties.len(),
        if properties.len() == 1 { "y" } else { "ies" }
    );

    node.data.target_tag_name = Some(tag_name);
    node.data.target_properties = Some(properties);
    true
}

/// Presentation shape previously attached by [`resolve_directive`].
pub fn target_shape(node: &Node) -> Option<(&str, &Properties)> {
    let tag_name = node.data.target_tag_name.as_deref()?;
    let properties = node.data.target_properties.as_ref()?;
    Some((tag_name, properties))
}
