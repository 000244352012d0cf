//! Phrase committer: longest stable-prefix commit.
//!
//! The live transcriber re-decodes a sliding window every tick and may
//! return a different string each time — words revised, corrected, or
//! extended. The committer turns that overwrite-prone stream into a
//! monotonically growing sequence of finalized, non-overlapping phrases:
//! a delta is committed only once enough new words have accumulated past
//! the already-committed prefix, and a transcript that rewrites committed
//! history silently resets the state rather than emitting corrupted text.
//! Reset events are lossy (at most one pending segment) by design.

use crate::defaults;

/// Converts unstable live transcripts into stable committed phrases.
#[derive(Debug, Clone)]
pub struct PhraseCommitter {
    last_committed: String,
    min_words: usize,
}

impl PhraseCommitter {
    /// Creates a committer that requires `min_words` new words before
    /// committing a phrase.
    pub fn new(min_words: usize) -> Self {
        Self {
            last_committed: String::new(),
            min_words,
        }
    }

    /// Processes the latest live transcript.
    ///
    /// Returns the newly finalized phrase, or `None` when there is not yet
    /// enough stable content — or when the transcript rewrote committed
    /// history, which resets the committer for the next tick.
    pub fn process(&mut self, live_text: &str) -> Option<String> {
        if !live_text.starts_with(&self.last_committed) {
            // Upstream rewrote history we already emitted. Diffing against
            // the stale prefix could emit corrupted text; drop the pending
            // segment instead and re-sync from scratch.
            self.last_committed.clear();
            return None;
        }

        let delta = live_text[self.last_committed.len()..].trim();
        let words: Vec<&str> = delta.split_whitespace().collect();

        if words.len() >= self.min_words {
            self.last_committed = live_text.to_string();
            return Some(words.join(" "));
        }

        None
    }

    /// Force-commits any pending delta regardless of the word threshold.
    ///
    /// Used by the flush-on-silence policy so trailing words are not lost
    /// at the end of an utterance. The prefix/reset contract is the same
    /// as `process`.
    pub fn flush(&mut self, live_text: &str) -> Option<String> {
        if !live_text.starts_with(&self.last_committed) {
            self.last_committed.clear();
            return None;
        }

        let delta = live_text[self.last_committed.len()..].trim();
        if delta.is_empty() {
            return None;
        }

        let words: Vec<&str> = delta.split_whitespace().collect();
        self.last_committed = live_text.to_string();
        Some(words.join(" "))
    }

    /// The transcript prefix already emitted.
    pub fn last_committed(&self) -> &str {
        &self.last_committed
    }

    /// Clears committed state.
    pub fn reset(&mut self) {
        self.last_committed.clear();
    }
}

impl Default for PhraseCommitter {
    fn default() -> Self {
        Self::new(defaults::MIN_COMMIT_WORDS)
    }
}
