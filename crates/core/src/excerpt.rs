//! First-paragraph excerpts.

use crate::metadata::{MetadataEntry, MetadataSink};
use crate::text::to_string;
use crate::tree::Node;

/// Text of the first paragraph among the root's direct children.
///
/// Only top-level paragraphs count: a paragraph nested in a list, quote, or
/// directive never becomes the excerpt. Returns an empty string when there
/// is none.
pub fn excerpt(tree: &Node) -> String {
    tree.children
        .iter()
        .find(|node| node.is_paragraph())
        .map(to_string)
        .unwrap_or_default()
}

/// Writes the `Excerpt` entry for a document.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExcerptExtractor;

impl ExcerptExtractor {
    /// Computes the excerpt and writes it to `sink`.
    pub fn extract(&self, tree: &Node, document_id: &str, sink: &mut dyn MetadataSink) -> String {
        let text = excerpt(tree);
        log::debug!("excerpt of `{}`: {} byte(s)", document_id, text.len());
        sink.set(document_id, MetadataEntry::Excerpt(text.clone()));
        text
    }
}
