//! Translation delta buffer.
//!
//! Sits between the committed-transcript history and the translator: given
//! the cumulative history each tick, emits only the substring appended
//! since the last successful extraction. This decouples "how much new
//! source text exists" from "how much has been sent to the translator",
//! so the translator runs once per new chunk of source text rather than
//! once per raw transcription tick. Same prefix/reset contract as the
//! phrase committer, one layer up.

/// Extracts newly-appended suffixes of a growing source string.
#[derive(Debug, Clone, Default)]
pub struct TranslationDeltaBuffer {
    last_source: String,
}

impl TranslationDeltaBuffer {
    /// Creates an empty delta buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the text appended since the last successful call, or `None`
    /// if nothing new exists.
    ///
    /// A `new_text` that does not extend the recorded history indicates an
    /// upstream rewrite; the buffer resets silently and emits nothing for
    /// that call.
    pub fn get_delta(&mut self, new_text: &str) -> Option<String> {
        if !new_text.starts_with(&self.last_source) {
            // History rewrite upstream — re-sync from scratch.
            self.last_source.clear();
            return None;
        }

        let delta = new_text[self.last_source.len()..].trim();
        if delta.is_empty() {
            return None;
        }

        let delta = delta.to_string();
        self.last_source = new_text.to_string();
        Some(delta)
    }

    /// The full history already forwarded.
    pub fn last_source(&self) -> &str {
        &self.last_source
    }

    /// Clears recorded history.
    pub fn reset(&mut self) {
        self.last_source.clear();
    }
}
