//! End-to-end processing of one document.

use mdweave_core::{
    Diagnostics, Document, DocumentMetadata, MetadataSink, Resolved, WeaveError,
};
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::components::apply_components;
use crate::convert::to_hast;
use crate::element::Root;
use crate::headings::{HeadingEntry, slug_headings};
use crate::options::Options;
use crate::sections::sectionize;

/// Everything produced for one document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedDocument {
    /// Document id.
    pub id: String,
    /// Rendered presentation tree.
    pub tree: Root,
    /// Reading time, word count and excerpt.
    pub metadata: DocumentMetadata,
    /// Frontmatter with `minutes`, `words` and `excerpt` merged in.
    pub frontmatter: JsonValue,
    /// Headings in document order.
    pub headings: Vec<HeadingEntry>,
    /// Problems recovered from along the way.
    pub diagnostics: Diagnostics,
}

/// Processes markdown source.
///
/// ```
/// use mdweave_hast::{Options, process};
///
/// let doc = process("post.md", ":::tip\nUse the keyboard.\n:::\n", &Options::default()).unwrap();
/// let callout = doc.tree.children[0].as_element().unwrap();
/// assert_eq!(callout.classes(), vec!["admonition", "bdm-tip"]);
/// assert_eq!(doc.metadata.word_count, 3);
/// ```
pub fn process(id: &str, source: &str, options: &Options) -> Result<ProcessedDocument, WeaveError> {
    process_with_sink(id, source, options, &mut ())
}

/// Processes markdown source, also writing metadata to `sink`.
pub fn process_with_sink(
    id: &str,
    source: &str,
    options: &Options,
    sink: &mut dyn MetadataSink,
) -> Result<ProcessedDocument, WeaveError> {
    log::debug!("processing `{}` ({} bytes)", id, source.len());
    let measured = Document::parse(id, source, &options.parse_options())?
        .measure(options.words_per_minute, sink);
    let measured = if options.enable_github_alerts {
        measured.convert_alerts()
    } else {
        measured
    };
    Ok(render_document(measured.resolve(), options))
}

/// Renders a resolved document: presentation tree, components, heading
/// ids and anchors, then optional sections.
pub fn render_document(document: Document<Resolved>, options: &Options) -> ProcessedDocument {
    let mut tree = to_hast(&document);
    let parts = document.into_parts();
    let mut diagnostics = parts.diagnostics;

    apply_components(&mut tree, options.registry(), &mut diagnostics);
    let headings = slug_headings(&mut tree, options.enable_heading_anchors, &mut diagnostics);
    if options.enable_sections {
        sectionize(&mut tree);
    }

    if diagnostics.has_any() {
        log::debug!("`{}`: {} diagnostic(s)", parts.id, diagnostics.count());
    }

    ProcessedDocument {
        id: parts.id,
        tree,
        metadata: parts.metadata,
        frontmatter: parts.frontmatter,
        headings,
        diagnostics,
    }
}
