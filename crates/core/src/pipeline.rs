//! Staged document processing.
//!
//! A [`Document`] moves through the passes in a fixed order, and its type
//! parameter records how far it got:
//!
//! ```text
//! Document<Parsed> --measure--> Document<Measured> --resolve--> Document<Resolved>
//!        |                             |
//!    transform                   convert_alerts
//! ```
//!
//! Metadata is always derived from the tree as parsed, before any directive
//! rewriting. Renderers only accept `Document<Resolved>`, so handing them a
//! tree whose directives were never annotated does not compile:
//!
//! ```compile_fail
//! use mdweave_core::{Document, Node, Resolved};
//!
//! fn render(_: &Document<Resolved>) {}
//!
//! let parsed = Document::new("doc", Node::root(vec![]));
//! render(&parsed);
//! ```
//!
//! ```
//! use mdweave_core::{DEFAULT_WORDS_PER_MINUTE, Document, MetadataStore, Node};
//!
//! let tree = Node::root(vec![Node::paragraph_text("Hello world")]);
//! let mut store = MetadataStore::new();
//! let doc = Document::new("hello.md", tree)
//!     .measure(DEFAULT_WORDS_PER_MINUTE, &mut store)
//!     .resolve();
//! assert_eq!(doc.metadata().excerpt, "Hello world");
//! assert_eq!(store.get("hello.md").unwrap().word_count, 2);
//! ```

use std::marker::PhantomData;
use std::num::NonZeroU32;

use serde_json::Value as JsonValue;

use crate::alerts::convert_github_alerts;
use crate::directives::resolve_directives;
use crate::error::{Diagnostics, WeaveError};
use crate::excerpt::ExcerptExtractor;
use crate::metadata::{DocumentMetadata, FrontmatterSink, MetadataSink, Tee};
use crate::parse::{AstTransform, ParseOptions, parse_document};
use crate::reading_time::ReadingTimeExtractor;
use crate::tree::Node;

mod sealed {
    pub trait Sealed {}
}

/// Processing stage marker.
pub trait Stage: sealed::Sealed {}

/// Freshly parsed; user transforms may still run.
#[derive(Debug)]
pub enum Parsed {}
/// Metadata derived; alert conversion may run.
#[derive(Debug)]
pub enum Measured {}
/// Directives annotated; ready for rendering.
#[derive(Debug)]
pub enum Resolved {}

impl sealed::Sealed for Parsed {}
impl sealed::Sealed for Measured {}
impl sealed::Sealed for Resolved {}
impl Stage for Parsed {}
impl Stage for Measured {}
impl Stage for Resolved {}

/// A document on its way through the passes.
#[derive(Debug)]
pub struct Document<S: Stage> {
    id: String,
    tree: Node,
    frontmatter: JsonValue,
    metadata: DocumentMetadata,
    diagnostics: Diagnostics,
    stage: PhantomData<S>,
}

/// Everything a finished document carries.
#[derive(Debug)]
pub struct DocumentParts {
    /// Document id.
    pub id: String,
    /// Annotated tree.
    pub tree: Node,
    /// Frontmatter with derived metadata merged in.
    pub frontmatter: JsonValue,
    /// Derived metadata.
    pub metadata: DocumentMetadata,
    /// Recovered problems.
    pub diagnostics: Diagnostics,
}

impl<S: Stage> Document<S> {
    fn into_stage<T: Stage>(self) -> Document<T> {
        Document {
            id: self.id,
            tree: self.tree,
            frontmatter: self.frontmatter,
            metadata: self.metadata,
            diagnostics: self.diagnostics,
            stage: PhantomData,
        }
    }

    /// Document id used as the metadata key.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current tree.
    pub fn tree(&self) -> &Node {
        &self.tree
    }

    /// Frontmatter object.
    pub fn frontmatter(&self) -> &JsonValue {
        &self.frontmatter
    }

    /// Derived metadata; defaults until the document is measured.
    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    /// Diagnostics collected so far.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Mutable diagnostics, for passes that run outside this crate.
    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }
}

impl Document<Parsed> {
    /// Wraps an already-parsed tree.
    pub fn new(id: impl Into<String>, tree: Node) -> Self {
        Self {
            id: id.into(),
            tree,
            frontmatter: JsonValue::Object(Default::default()),
            metadata: DocumentMetadata::default(),
            diagnostics: Diagnostics::new(),
            stage: PhantomData,
        }
    }

    /// Parses markdown source.
    pub fn parse(id: impl Into<String>, source: &str, options: &ParseOptions) -> Result<Self, WeaveError> {
        let id = id.into();
        let parsed = parse_document(source, options).map_err(|err| match err {
            WeaveError::Parse { message, location } => WeaveError::Parse {
                message,
                location: location.with_file(id.as_str()),
            },
            other => other,
        })?;
        let mut diagnostics = parsed.diagnostics;
        diagnostics.attribute_to(&id);
        let mut doc = Self::new(id, parsed.tree).with_frontmatter(parsed.frontmatter);
        doc.diagnostics = diagnostics;
        Ok(doc)
    }

    /// Replaces the frontmatter object.
    pub fn with_frontmatter(mut self, frontmatter: JsonValue) -> Self {
        self.frontmatter = frontmatter;
        self
    }

    /// Runs a user transform over the tree.
    pub fn transform(mut self, transform: &dyn AstTransform) -> Result<Self, WeaveError> {
        log::debug!("running transform `{}` on `{}`", transform.name(), self.id);
        transform.transform(&mut self.tree).map_err(|err| match err {
            WeaveError::Pass { .. } => err,
            other => WeaveError::pass_failed(transform.name(), other.to_string()),
        })?;
        Ok(self)
    }

    /// Derives reading time and excerpt from the tree as parsed.
    ///
    /// Entries go to the document's own record, its frontmatter, and `sink`.
    pub fn measure(mut self, words_per_minute: NonZeroU32, sink: &mut dyn MetadataSink) -> Document<Measured> {
        {
            let mut frontmatter = FrontmatterSink::new(&mut self.frontmatter);
            let mut local = Tee::new(&mut self.metadata, &mut frontmatter);
            let mut all = Tee::new(&mut local, sink);
            ReadingTimeExtractor::new(words_per_minute).extract(&self.tree, &self.id, &mut all);
            ExcerptExtractor.extract(&self.tree, &self.id, &mut all);
        }
        self.into_stage()
    }
}

impl Document<Measured> {
    /// Rewrites GitHub alert blockquotes into container directives.
    pub fn convert_alerts(mut self) -> Self {
        convert_github_alerts(&mut self.tree);
        self
    }

    /// Annotates every directive with its presentation shape.
    pub fn resolve(mut self) -> Document<Resolved> {
        let resolved = resolve_directives(&mut self.tree);
        log::debug!("`{}`: {} directive(s) resolved", self.id, resolved);
        self.into_stage()
    }
}

impl Document<Resolved> {
    /// Splits the document into its parts.
    pub fn into_parts(self) -> DocumentParts {
        DocumentParts {
            id: self.id,
            tree: self.tree,
            frontmatter: self.frontmatter,
            metadata: self.metadata,
            diagnostics: self.diagnostics,
        }
    }
}
