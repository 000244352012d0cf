use crate::error::{DubvoxError, Result};
use crate::voice::profile::VoiceProfile;
use std::sync::Arc;

/// Trait for voice-cloned speech synthesis.
///
/// Implementations condition synthesis on the speaker profile (embedding
/// plus reference clip) so the target-language speech keeps the enrolled
/// speaker's voice.
pub trait Synthesizer: Send + Sync {
    /// Synthesize translated text as mono f32 samples at the pipeline
    /// sample rate.
    ///
    /// Empty text yields an empty clip without invoking any model.
    fn synthesize(&self, text: &str, language: &str, profile: &VoiceProfile) -> Result<Vec<f32>>;
}

/// Implement Synthesizer for Arc<T> to allow sharing across sessions.
impl<T: Synthesizer + ?Sized> Synthesizer for Arc<T> {
    fn synthesize(&self, text: &str, language: &str, profile: &VoiceProfile) -> Result<Vec<f32>> {
        (**self).synthesize(text, language, profile)
    }
}

/// Mock synthesizer for testing.
///
/// Emits a fixed number of samples per input character so tests can assert
/// that audio was produced and scales with the text.
#[derive(Debug, Clone)]
pub struct MockSynthesizer {
    samples_per_char: usize,
    should_fail: bool,
}

impl MockSynthesizer {
    /// Create a mock emitting 100 samples per character.
    pub fn new() -> Self {
        Self {
            samples_per_char: 100,
            should_fail: false,
        }
    }

    /// Configure the mock to fail on synthesize.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Default for MockSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Synthesizer for MockSynthesizer {
    fn synthesize(&self, text: &str, _language: &str, _profile: &VoiceProfile) -> Result<Vec<f32>> {
        if self.should_fail {
            return Err(DubvoxError::Synthesis {
                message: "mock synthesis failure".to_string(),
            });
        }

        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        Ok(vec![0.1; text.chars().count() * self.samples_per_char])
    }
}
