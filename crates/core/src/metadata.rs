//! Derived document metadata and the sinks it is written to.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// One derived metadata field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataEntry {
    /// First-paragraph excerpt (possibly empty).
    Excerpt(String),
    /// Estimated reading time in whole minutes (at least 1).
    ReadingMinutes(u32),
    /// Whitespace-delimited word count.
    WordCount(usize),
}

impl MetadataEntry {
    /// Frontmatter key the entry is published under.
    pub fn key(&self) -> &'static str {
        match self {
            MetadataEntry::Excerpt(_) => "excerpt",
            MetadataEntry::ReadingMinutes(_) => "minutes",
            MetadataEntry::WordCount(_) => "words",
        }
    }
}

/// Destination for derived metadata.
///
/// Extractors call `set` once per field they own; no extractor reads back what
/// another one wrote.
pub trait MetadataSink {
    /// Records `entry` for the document identified by `document_id`.
    fn set(&mut self, document_id: &str, entry: MetadataEntry);
}

/// Discards every entry.
impl MetadataSink for () {
    fn set(&mut self, _document_id: &str, _entry: MetadataEntry) {}
}

/// Metadata record of a single document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    /// Estimated reading time in minutes.
    pub reading_minutes: u32,
    /// Word count of the flattened document text.
    pub word_count: usize,
    /// Text of the first top-level paragraph.
    pub excerpt: String,
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        Self {
            reading_minutes: 1,
            word_count: 0,
            excerpt: String::new(),
        }
    }
}

impl DocumentMetadata {
    /// Applies an entry to this record.
    pub fn apply(&mut self, entry: MetadataEntry) {
        match entry {
            MetadataEntry::Excerpt(excerpt) => self.excerpt = excerpt,
            MetadataEntry::ReadingMinutes(minutes) => self.reading_minutes = minutes,
            MetadataEntry::WordCount(words) => self.word_count = words,
        }
    }
}

impl MetadataSink for DocumentMetadata {
    fn set(&mut self, _document_id: &str, entry: MetadataEntry) {
        self.apply(entry);
    }
}

/// Metadata records keyed by document id.
#[derive(Debug, Clone, Default)]
pub struct MetadataStore {
    documents: HashMap<String, DocumentMetadata>,
}

impl MetadataStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the record for `document_id`, if any field was written.
    pub fn get(&self, document_id: &str) -> Option<&DocumentMetadata> {
        self.documents.get(document_id)
    }

    /// Number of documents with metadata.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl MetadataSink for MetadataStore {
    fn set(&mut self, document_id: &str, entry: MetadataEntry) {
        self.documents
            .entry(document_id.to_string())
            .or_default()
            .apply(entry);
    }
}

/// Writes metadata into a document's frontmatter object under the keys
/// `excerpt`, `minutes`, and `words`.
#[derive(Debug)]
pub struct FrontmatterSink<'a> {
    frontmatter: &'a mut JsonValue,
}

impl<'a> FrontmatterSink<'a> {
    /// Wraps a frontmatter value. Non-object values are replaced by an empty
    /// object on first write.
    pub fn new(frontmatter: &'a mut JsonValue) -> Self {
        Self { frontmatter }
    }
}

impl MetadataSink for FrontmatterSink<'_> {
    fn set(&mut self, document_id: &str, entry: MetadataEntry) {
        if !self.frontmatter.is_object() {
            log::debug!(
                "frontmatter of `{}` was not an object; replacing it",
                document_id
            );
            *self.frontmatter = JsonValue::Object(Default::default());
        }
        let key = entry.key();
        let value = match entry {
            MetadataEntry::Excerpt(excerpt) => JsonValue::from(excerpt),
            MetadataEntry::ReadingMinutes(minutes) => JsonValue::from(minutes),
            MetadataEntry::WordCount(words) => JsonValue::from(words),
        };
        if let Some(object) = self.frontmatter.as_object_mut() {
            object.insert(key.to_string(), value);
        }
    }
}

/// Forwards every entry to two sinks.
pub struct Tee<'a, A: ?Sized, B: ?Sized> {
    first: &'a mut A,
    second: &'a mut B,
}

impl<'a, A: MetadataSink + ?Sized, B: MetadataSink + ?Sized> Tee<'a, A, B> {
    /// Combines two sinks.
    pub fn new(first: &'a mut A, second: &'a mut B) -> Self {
        Self { first, second }
    }
}

impl<A: MetadataSink + ?Sized, B: MetadataSink + ?Sized> MetadataSink for Tee<'_, A, B> {
    fn set(&mut self, document_id: &str, entry: MetadataEntry) {
        self.first.set(document_id, entry.clone());
        self.second.set(document_id, entry);
    }
}
