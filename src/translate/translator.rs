use crate::error::{DubvoxError, Result};
use crate::translate::emotion::Emotion;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Trait for text translation between language pairs.
///
/// Contract: empty input translates to empty output without invoking any
/// model.
pub trait Translator: Send + Sync {
    /// Translate a text delta.
    ///
    /// # Arguments
    /// * `text` - Source text to translate
    /// * `source_lang` - Source language tag
    /// * `target_lang` - Target language tag
    /// * `emotion` - Optional emotion label for tone-preserving rendering
    fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
        emotion: Option<Emotion>,
    ) -> Result<String>;
}

/// Implement Translator for Arc<T> to allow sharing across sessions.
impl<T: Translator + ?Sized> Translator for Arc<T> {
    fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
        emotion: Option<Emotion>,
    ) -> Result<String> {
        (**self).translate(text, source_lang, target_lang, emotion)
    }
}

/// Mock translator for testing.
///
/// Wraps the input in a `[target_lang]` marker so tests can assert exactly
/// which deltas reached the translator, and with which emotion. Can be
/// configured to fail every call, or only the first N, to exercise
/// degradation and retry paths.
#[derive(Debug, Default)]
pub struct MockTranslator {
    fail_remaining: AtomicUsize,
}

impl MockTranslator {
    /// Create a passthrough mock translator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the mock to fail on every translate call.
    pub fn with_failure(self) -> Self {
        self.fail_remaining.store(usize::MAX, Ordering::SeqCst);
        self
    }

    /// Configure the mock to fail the first `n` translate calls and then
    /// recover.
    pub fn with_failures(self, n: usize) -> Self {
        self.fail_remaining.store(n, Ordering::SeqCst);
        self
    }
}

impl Translator for MockTranslator {
    fn translate(
        &self,
        text: &str,
        _source_lang: &str,
        target_lang: &str,
        emotion: Option<Emotion>,
    ) -> Result<String> {
        let remaining = self.fail_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            if remaining != usize::MAX {
                self.fail_remaining.store(remaining - 1, Ordering::SeqCst);
            }
            return Err(DubvoxError::Translation {
                message: "mock translation failure".to_string(),
            });
        }

        if text.trim().is_empty() {
            return Ok(String::new());
        }

        Ok(match emotion {
            Some(e) if e != Emotion::Neutral => {
                format!("[{}:{}] {}", target_lang, e, text)
            }
            _ => format!("[{}] {}", target_lang, text),
        })
    }
}
