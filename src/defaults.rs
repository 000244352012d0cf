//! Default configuration constants for dubvox.
//!
//! This module provides shared constants used across different configuration
//! types to ensure consistency and eliminate duplication.

/// Default audio sample rate in Hz.
///
/// 16kHz is the standard for speech recognition and speaker encoders, and
/// provides a good balance between quality and computational cost. All
/// internal audio is mono f32 at this rate; conversion happens once at the
/// ingest boundary.
pub const SAMPLE_RATE: u32 = 16000;

/// Default voice activity energy threshold.
///
/// RMS-based threshold (0.0 to 1.0) that decides whether a chunk contains
/// speech. 0.015 is tuned for typical microphone input levels: sensitive
/// enough for quiet speakers while rejecting room noise.
pub const ENERGY_THRESHOLD: f32 = 0.015;

/// Default silence duration in milliseconds before the audio buffer is reset.
///
/// 800ms tolerates natural word gaps without discarding context; a sustained
/// pause longer than this marks the end of an utterance.
pub const SILENCE_DURATION_MS: u32 = 800;

/// Default rolling audio buffer length in seconds.
///
/// The buffer keeps the most recent N seconds of audio; older samples are
/// discarded under continuous pressure.
pub const BUFFER_SECONDS: f32 = 5.0;

/// Default sliding transcription window in seconds.
///
/// Live transcription re-decodes only this much recent audio per tick,
/// bounding per-tick latency regardless of utterance length.
pub const LIVE_WINDOW_SECONDS: f32 = 3.0;

/// Minimum number of samples worth transcribing.
///
/// Windows shorter than this (100ms at 16kHz) produce nothing but decoder
/// noise — skip the transcriber entirely.
pub const MIN_TRANSCRIBE_SAMPLES: usize = 1600;

/// Default minimum word count before a live-transcript delta is committed.
///
/// Smaller values increase responsiveness but raise the rate of mid-clause
/// cuts; larger values add latency.
pub const MIN_COMMIT_WORDS: usize = 4;

/// Default source language tag.
pub const SOURCE_LANG: &str = "en";

/// Default target language tag.
pub const TARGET_LANG: &str = "hi";

/// Minimum enrollment recording length in seconds.
pub const ENROLL_MIN_SECONDS: f32 = 10.0;

/// Maximum enrollment recording length in seconds.
pub const ENROLL_MAX_SECONDS: f32 = 90.0;

/// Minimum RMS energy for an enrollment recording.
///
/// Recordings below this are too quiet to yield a usable speaker embedding.
pub const ENROLL_MIN_RMS: f32 = 0.01;

/// Maximum fraction of clipped samples (|s| > 0.99) in an enrollment recording.
pub const ENROLL_MAX_CLIP_RATIO: f32 = 0.01;

/// Minimum seconds of speech that must survive silence trimming at enrollment.
pub const ENROLL_MIN_SPEECH_SECONDS: f32 = 5.0;

/// Frame length in samples used for energy-based silence trimming (30ms at 16kHz).
pub const TRIM_FRAME_SAMPLES: usize = 480;
