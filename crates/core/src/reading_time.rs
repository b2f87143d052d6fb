//! Reading-time estimation.

use std::num::NonZeroU32;

use crate::metadata::{MetadataEntry, MetadataSink};
use crate::text::flatten_text;
use crate::tree::Node;

/// Reading speed used when none is configured.
pub const DEFAULT_WORDS_PER_MINUTE: NonZeroU32 = match NonZeroU32::new(200) {
    Some(wpm) => wpm,
    None => unreachable!(),
};

/// Reading-time estimate for one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadingTime {
    /// Whole minutes, never below 1.
    pub minutes: u32,
    /// Whitespace-delimited words in the flattened text.
    pub words: usize,
}

/// Counts whitespace-delimited words.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Converts a word count into whole minutes: `max(1, round(words / wpm))`.
pub fn minutes_for(words: usize, words_per_minute: NonZeroU32) -> u32 {
    let minutes = (words as f64 / f64::from(words_per_minute.get())).round();
    (minutes as u32).max(1)
}

/// Estimates the reading time of the whole tree.
pub fn reading_time(tree: &Node, words_per_minute: NonZeroU32) -> ReadingTime {
    let words = count_words(&flatten_text(tree));
    ReadingTime {
        minutes: minutes_for(words, words_per_minute),
        words,
    }
}

/// Writes `ReadingMinutes` and `WordCount` for a document.
#[derive(Debug, Clone, Copy)]
pub struct ReadingTimeExtractor {
    words_per_minute: NonZeroU32,
}

impl Default for ReadingTimeExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_WORDS_PER_MINUTE)
    }
}

impl ReadingTimeExtractor {
    /// Creates an extractor with the given reading speed.
    pub fn new(words_per_minute: NonZeroU32) -> Self {
        Self { words_per_minute }
    }

    /// Computes the estimate and writes it to `sink`. Does not touch the tree.
    pub fn extract(
        &self,
        tree: &Node,
        document_id: &str,
        sink: &mut dyn MetadataSink,
    ) -> ReadingTime {
        let estimate = reading_time(tree, self.words_per_minute);
        log::debug!(
            "reading time of `{}`: {} word(s), {} minute(s)",
            document_id,
            estimate.words,
            estimate.minutes
        );
        sink.set(document_id, MetadataEntry::ReadingMinutes(estimate.minutes));
        sink.set(document_id, MetadataEntry::WordCount(estimate.words));
        estimate
    }
}
