//! Parallel processing of independent documents.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use mdweave_core::{MetadataEntry, MetadataSink, MetadataStore};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::options::Options;
use crate::process::{ProcessedDocument, process};

/// One document to process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchInput {
    /// Document identifier (typically the file path).
    pub id: String,
    /// Markdown source.
    pub source: String,
}

/// Result for a single document in a batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    /// Identifier matching the input.
    pub id: String,
    /// Output (present on success).
    pub result: Option<ProcessedDocument>,
    /// Error message (present on failure).
    pub error: Option<String>,
}

/// Statistics for batch processing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStats {
    /// Number of inputs.
    pub total: u32,
    /// Documents processed successfully.
    pub succeeded: u32,
    /// Documents that failed.
    pub failed: u32,
    /// Wall-clock time in milliseconds.
    pub processing_time_ms: f64,
}

/// Options for batch processing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BatchOptions {
    /// Thread cap. Defaults to rayon's global pool.
    pub max_threads: Option<u32>,
    /// Keep going after a failure. Defaults to true.
    pub continue_on_error: Option<bool>,
    /// Options applied to every document.
    pub options: Options,
}

/// All results plus statistics.
#[derive(Debug, Clone, Serialize)]
pub struct BatchProcessingResult {
    /// Per-document results, in input order.
    pub results: Vec<BatchResult>,
    /// Processing statistics.
    pub stats: BatchStats,
}

impl BatchProcessingResult {
    /// Collects the metadata of every successful document, keyed by id.
    pub fn metadata_store(&self) -> MetadataStore {
        let mut store = MetadataStore::new();
        for doc in self.results.iter().filter_map(|r| r.result.as_ref()) {
            let meta = &doc.metadata;
            store.set(&doc.id, MetadataEntry::ReadingMinutes(meta.reading_minutes));
            store.set(&doc.id, MetadataEntry::WordCount(meta.word_count));
            store.set(&doc.id, MetadataEntry::Excerpt(meta.excerpt.clone()));
        }
        store
    }
}

/// Processes `inputs` in parallel.
///
/// With `continue_on_error` false, documents run one after another and the
/// batch stops at the first failure.
pub fn process_batch(inputs: Vec<BatchInput>, batch: &BatchOptions) -> BatchProcessingResult {
    let start = Instant::now();
    let continue_on_error = batch.continue_on_error.unwrap_or(true);

    let pool = batch.max_threads.and_then(|max_threads| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(max_threads as usize)
            .build()
            .map_err(|err| log::warn!("falling back to the global thread pool: {}", err))
            .ok()
    });

    let total = inputs.len() as u32;
    let succeeded = AtomicU32::new(0);
    let failed = AtomicU32::new(0);

    let process_input = |input: BatchInput| -> BatchResult {
        match process(&input.id, &input.source, &batch.options) {
            Ok(result) => {
                succeeded.fetch_add(1, Ordering::Relaxed);
                BatchResult {
                    id: input.id,
                    result: Some(result),
                    error: None,
                }
            }
            Err(err) => {
                failed.fetch_add(1, Ordering::Relaxed);
                log::warn!("`{}` failed: {}", input.id, err);
                BatchResult {
                    id: input.id,
                    result: None,
                    error: Some(err.to_string()),
                }
            }
        }
    };

    let results: Vec<BatchResult> = if continue_on_error {
        match pool {
            Some(pool) => pool.install(|| inputs.into_par_iter().map(process_input).collect()),
            None => inputs.into_par_iter().map(process_input).collect(),
        }
    } else {
        let mut results = Vec::with_capacity(inputs.len());
        for input in inputs {
            let result = process_input(input);
            let stop = result.error.is_some();
            results.push(result);
            if stop {
                break;
            }
        }
        results
    };

    let stats = BatchStats {
        total,
        succeeded: succeeded.load(Ordering::Relaxed),
        failed: failed.load(Ordering::Relaxed),
        processing_time_ms: start.elapsed().as_secs_f64() * 1000.0,
    };
    log::debug!(
        "batch of {}: {} ok, {} failed in {:.1}ms",
        stats.total,
        stats.succeeded,
        stats.failed,
        stats.processing_time_ms
    );
    BatchProcessingResult { results, stats }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(id: &str, source: &str) -> BatchInput {
        BatchInput {
            id: id.to_string(),
            source: source.to_string(),
        }
    }

    fn inputs() -> Vec<BatchInput> {
        vec![
            input("a.md", "First post here."),
            input("bad.md", "---\ntitle: [\n---\n"),
            input("c.md", ":::note\nHi\n:::\n"),
        ]
    }

    #[test]
    fn keeps_input_order_and_counts() {
        let out = process_batch(inputs(), &BatchOptions::default());
        let ids: Vec<_> = out.results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a.md", "bad.md", "c.md"]);
        assert_eq!(out.stats.total, 3);
        assert_eq!(out.stats.succeeded, 2);
        assert_eq!(out.stats.failed, 1);
        assert!(out.results[1].error.is_some());
        assert!(out.results[1].result.is_none());
    }

    #[test]
    fn stops_at_first_failure_when_asked() {
        let options = BatchOptions {
            continue_on_error: Some(false),
            ..BatchOptions::default()
        };
        let out = process_batch(inputs(), &options);
        assert_eq!(out.results.len(), 2);
        assert_eq!(out.stats.failed, 1);
    }

    #[test]
    fn capped_pool_gives_same_results() {
        let options = BatchOptions {
            max_threads: Some(1),
            ..BatchOptions::default()
        };
        let out = process_batch(inputs(), &options);
        assert_eq!(out.stats.succeeded, 2);
        let store = out.metadata_store();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("a.md").unwrap().excerpt, "First post here.");
        assert!(store.get("bad.md").is_none());
    }
}
