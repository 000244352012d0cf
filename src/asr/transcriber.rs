use crate::error::{DubvoxError, Result};
use std::sync::Arc;
use std::sync::Mutex;

/// Trait for streaming speech-to-text transcription.
///
/// Implementations are expected to re-decode each window from scratch with
/// no persistent state, so two calls on overlapping windows may disagree
/// about words already "heard". The phrase committer downstream absorbs
/// those rewrites.
pub trait Transcriber: Send + Sync {
    /// Transcribe a window of audio to text.
    ///
    /// # Arguments
    /// * `audio` - Mono f32 samples at the pipeline sample rate
    /// * `language` - Language tag for decoding (e.g. "en")
    ///
    /// # Returns
    /// Transcribed text (possibly empty) or error
    fn transcribe(&self, audio: &[f32], language: &str) -> Result<String>;

    /// Check if the transcriber is ready
    fn is_ready(&self) -> bool;
}

/// Implement Transcriber for Arc<T> to allow sharing across sessions.
impl<T: Transcriber + ?Sized> Transcriber for Arc<T> {
    fn transcribe(&self, audio: &[f32], language: &str) -> Result<String> {
        (**self).transcribe(audio, language)
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}

/// Mock transcriber for testing.
///
/// Plays back a script of responses, one per call, repeating the last entry
/// once the script is exhausted. This models a live transcriber whose output
/// grows (and is sometimes rewritten) across ticks.
pub struct MockTranscriber {
    script: Vec<String>,
    call_index: Mutex<usize>,
    should_fail: bool,
}

impl MockTranscriber {
    /// Create a mock that returns the same text on every call.
    pub fn new(response: &str) -> Self {
        Self {
            script: vec![response.to_string()],
            call_index: Mutex::new(0),
            should_fail: false,
        }
    }

    /// Create a mock that plays back the given responses in order.
    pub fn with_script(script: Vec<&str>) -> Self {
        Self {
            script: script.into_iter().map(String::from).collect(),
            call_index: Mutex::new(0),
            should_fail: false,
        }
    }

    /// Configure the mock to fail on transcribe.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Number of transcribe calls made so far.
    pub fn calls(&self) -> usize {
        *self.call_index.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Transcriber for MockTranscriber {
    fn transcribe(&self, _audio: &[f32], _language: &str) -> Result<String> {
        if self.should_fail {
            return Err(DubvoxError::Transcription {
                message: "mock transcription failure".to_string(),
            });
        }

        let mut index = self.call_index.lock().unwrap_or_else(|e| e.into_inner());
        let response = self
            .script
            .get(*index)
            .or_else(|| self.script.last())
            .cloned()
            .unwrap_or_default();
        *index += 1;
        Ok(response)
    }

    fn is_ready(&self) -> bool {
        !self.should_fail
    }
}
