#![deny(missing_docs)]
//! mdweave presentation layer.
//!
//! Turns a resolved document into a hast-shaped tree, renders registered
//! components (admonitions, repository cards), assigns heading ids, and
//! runs whole documents or batches of them end to end.

/// Parallel batch processing.
pub mod batch;
/// Component renderers.
pub mod components;
/// Document tree to presentation tree.
pub mod convert;
/// Presentation tree types.
pub mod element;
/// Heading ids and anchors.
pub mod headings;
/// Processing options.
pub mod options;
/// Single-document entry points.
pub mod process;
/// Component registry.
pub mod registry;
/// Heading sections.
pub mod sections;

pub use batch::{
    BatchInput, BatchOptions, BatchProcessingResult, BatchResult, BatchStats, process_batch,
};
pub use components::{
    AdmonitionVariant, ComponentError, apply_components, render_admonition, render_card,
};
pub use convert::to_hast;
pub use element::{Element, HastNode, Root};
pub use headings::{HeadingEntry, slug_headings};
pub use options::Options;
pub use process::{ProcessedDocument, process, process_with_sink, render_document};
pub use registry::{ComponentKind, ComponentRegistry};
pub use sections::sectionize;
