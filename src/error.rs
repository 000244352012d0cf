//! Error types for dubvox.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DubvoxError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Enrollment validation errors — reported verbatim to the caller
    #[error("Sample rate must be {expected} Hz, got {actual} Hz")]
    SampleRateMismatch { expected: u32, actual: u32 },

    #[error("Enrollment audio too short: {seconds:.1}s (minimum {min_seconds:.1}s)")]
    AudioTooShort { seconds: f32, min_seconds: f32 },

    #[error("Enrollment audio too long: {seconds:.1}s (maximum {max_seconds:.1}s)")]
    AudioTooLong { seconds: f32, max_seconds: f32 },

    #[error("Enrollment audio too quiet: RMS {rms:.4} (minimum {min_rms:.4})")]
    AudioTooQuiet { rms: f32, min_rms: f32 },

    #[error("Enrollment audio clipping: {ratio:.3} of samples clipped (maximum {max_ratio:.3})")]
    AudioClipping { ratio: f32, max_ratio: f32 },

    #[error("Not enough speech after silence trimming: {seconds:.1}s (minimum {min_seconds:.1}s)")]
    NotEnoughSpeech { seconds: f32, min_seconds: f32 },

    // Voice profile errors
    #[error("Voice profile not found for user {user_id}")]
    ProfileNotFound { user_id: String },

    #[error("Voice profile already exists for user {user_id}")]
    ProfileExists { user_id: String },

    #[error("Voice profile storage failed: {message}")]
    ProfileStorage { message: String },

    // External capability errors
    #[error("Transcription failed: {message}")]
    Transcription { message: String },

    #[error("Emotion detection failed: {message}")]
    EmotionDetection { message: String },

    #[error("Translation failed: {message}")]
    Translation { message: String },

    #[error("Speech synthesis failed: {message}")]
    Synthesis { message: String },

    #[error("Speaker encoding failed: {message}")]
    SpeakerEncoding { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, DubvoxError>;
