#![deny(missing_docs)]
//! mdweave core: the document node model and the passes that run over it.
//!
//! Directive resolution, reading time and excerpt extraction, GitHub alert
//! conversion, plus a markdown-rs adapter for getting a tree out of text.

/// GitHub alert blockquote conversion.
pub mod alerts;
/// Code fence and literal block tracking for line-level rewriting.
pub mod code_fence;
/// Directive resolution.
pub mod directives;
/// Core error and diagnostic types.
pub mod error;
/// First-paragraph excerpts.
pub mod excerpt;
/// YAML frontmatter extraction.
pub mod frontmatter;
/// Metadata records and sinks.
pub mod metadata;
/// markdown-rs adapter.
pub mod parse;
/// Staged document processing.
pub mod pipeline;
/// Reading-time estimation.
pub mod reading_time;
/// Slug generation utilities.
pub mod slug;
/// Directive syntax preprocessing.
pub mod syntax;
/// Plain-text extraction.
pub mod text;
/// Document tree node model.
pub mod tree;
/// Tree traversal.
pub mod visit;

pub use alerts::{ALERT_TYPES, convert_github_alerts};
pub use directives::{resolve_directive, resolve_directives, target_shape};
pub use error::{
    Diagnostics, ErrorSeverity, ParseWarning, RecoverableError, SourceLocation, WeaveError,
};
pub use excerpt::{ExcerptExtractor, excerpt};
pub use frontmatter::{Frontmatter, FrontmatterError, extract_frontmatter};
pub use metadata::{
    DocumentMetadata, FrontmatterSink, MetadataEntry, MetadataSink, MetadataStore, Tee,
};
pub use parse::{AstTransform, ParseOptions, ParsedDocument, parse_document};
pub use pipeline::{Document, DocumentParts, Measured, Parsed, Resolved, Stage};
pub use reading_time::{DEFAULT_WORDS_PER_MINUTE, ReadingTime, ReadingTimeExtractor, reading_time};
pub use slug::{Slugger, extract_custom_id, slugify};
pub use text::{flatten_text, to_string};
pub use tree::{
    DIRECTIVE_LABEL_ATTRIBUTE, Data, Directive, DirectiveKind, Node, NodeKind, Properties,
    PropertyValue,
};
pub use visit::{try_visit, try_visit_mut, visit, visit_mut, visit_with_depth};
