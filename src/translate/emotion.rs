//! Emotion detection over committed phrases.
//!
//! Optional pipeline stage: the detected label is passed to the translator
//! so the target-language rendering can preserve tone.

use crate::error::{DubvoxError, Result};
use std::fmt;
use std::str::FromStr;

/// Closed set of emotion labels the pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Emotion {
    Joy,
    Anger,
    Sadness,
    Fear,
    Surprise,
    Neutral,
}

impl Emotion {
    /// Canonical lowercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Joy => "joy",
            Emotion::Anger => "anger",
            Emotion::Sadness => "sadness",
            Emotion::Fear => "fear",
            Emotion::Surprise => "surprise",
            Emotion::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = DubvoxError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "joy" => Ok(Emotion::Joy),
            "anger" => Ok(Emotion::Anger),
            "sadness" => Ok(Emotion::Sadness),
            "fear" => Ok(Emotion::Fear),
            "surprise" => Ok(Emotion::Surprise),
            "neutral" => Ok(Emotion::Neutral),
            other => Err(DubvoxError::EmotionDetection {
                message: format!("unknown emotion label: {}", other),
            }),
        }
    }
}

/// Trait for text emotion classification.
pub trait EmotionDetector: Send + Sync {
    /// Classify the emotional tone of a phrase.
    fn detect(&self, text: &str) -> Result<Emotion>;
}

/// Detector that always reports neutral, for pipelines with the emotion
/// stage disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEmotionDetector;

impl EmotionDetector for NullEmotionDetector {
    fn detect(&self, _text: &str) -> Result<Emotion> {
        Ok(Emotion::Neutral)
    }
}

/// Mock detector for testing.
#[derive(Debug, Clone)]
pub struct MockEmotionDetector {
    emotion: Emotion,
    should_fail: bool,
}

impl MockEmotionDetector {
    /// Create a mock that always reports the given label.
    pub fn new(emotion: Emotion) -> Self {
        Self {
            emotion,
            should_fail: false,
        }
    }

    /// Configure the mock to fail on detect.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl EmotionDetector for MockEmotionDetector {
    fn detect(&self, _text: &str) -> Result<Emotion> {
        if self.should_fail {
            return Err(DubvoxError::EmotionDetection {
                message: "mock emotion failure".to_string(),
            });
        }
        Ok(self.emotion)
    }
}
