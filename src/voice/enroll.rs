//! Voice enrollment.
//!
//! Validates a candidate recording, trims leading/trailing and internal
//! silence with the same energy heuristic the live gate uses, normalizes
//! the retained speech, extracts a speaker embedding, and persists the
//! profile under a freshly generated user id. Validation failures are
//! terminal for the attempt and reported verbatim; nothing is retried or
//! persisted partially.

use crate::audio::gate::calculate_rms;
use crate::audio::ingest::normalize;
use crate::config::EnrollmentConfig;
use crate::defaults;
use crate::error::{DubvoxError, Result};
use crate::voice::profile::VoiceProfile;
use crate::voice::store::VoiceProfileStore;
use std::sync::Arc;

/// Amplitude treated as clipped.
const CLIP_LEVEL: f32 = 0.99;

/// Trait for speaker embedding extraction.
pub trait SpeakerEncoder: Send + Sync {
    /// Extract a fixed-dimensional speaker embedding from mono f32 audio at
    /// the pipeline sample rate.
    fn encode(&self, audio: &[f32]) -> Result<Vec<f32>>;
}

/// Implement SpeakerEncoder for Arc<T> to allow sharing.
impl<T: SpeakerEncoder + ?Sized> SpeakerEncoder for Arc<T> {
    fn encode(&self, audio: &[f32]) -> Result<Vec<f32>> {
        (**self).encode(audio)
    }
}

/// Mock encoder for testing: a small fixed-size summary vector.
#[derive(Debug, Clone)]
pub struct MockSpeakerEncoder {
    dim: usize,
    should_fail: bool,
}

impl MockSpeakerEncoder {
    /// Create a mock producing `dim`-dimensional embeddings.
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            should_fail: false,
        }
    }

    /// Configure the mock to fail on encode.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl SpeakerEncoder for MockSpeakerEncoder {
    fn encode(&self, audio: &[f32]) -> Result<Vec<f32>> {
        if self.should_fail {
            return Err(DubvoxError::SpeakerEncoding {
                message: "mock encoder failure".to_string(),
            });
        }
        let rms = calculate_rms(audio);
        Ok(vec![rms; self.dim])
    }
}

/// Validates an enrollment recording against the quality contract.
///
/// Checks, in order: sample rate, duration bounds, minimum RMS energy,
/// clipping ratio. The first violation is returned.
pub fn validate_enrollment(
    audio: &[f32],
    sample_rate: u32,
    expected_rate: u32,
    config: &EnrollmentConfig,
) -> Result<()> {
    if sample_rate != expected_rate {
        return Err(DubvoxError::SampleRateMismatch {
            expected: expected_rate,
            actual: sample_rate,
        });
    }

    let seconds = audio.len() as f32 / sample_rate as f32;
    if seconds < config.min_seconds {
        return Err(DubvoxError::AudioTooShort {
            seconds,
            min_seconds: config.min_seconds,
        });
    }
    if seconds > config.max_seconds {
        return Err(DubvoxError::AudioTooLong {
            seconds,
            max_seconds: config.max_seconds,
        });
    }

    let rms = calculate_rms(audio);
    if rms < config.min_rms {
        return Err(DubvoxError::AudioTooQuiet {
            rms,
            min_rms: config.min_rms,
        });
    }

    let clipped = audio.iter().filter(|s| s.abs() > CLIP_LEVEL).count();
    let ratio = clipped as f32 / audio.len() as f32;
    if ratio > config.max_clip_ratio {
        return Err(DubvoxError::AudioClipping {
            ratio,
            max_ratio: config.max_clip_ratio,
        });
    }

    Ok(())
}

/// Removes silent frames from a recording using per-frame RMS energy.
///
/// Frames (30ms) below the threshold are dropped; what remains is the
/// concatenated speech content used for embedding extraction and as the
/// synthesis reference.
pub fn trim_silence(audio: &[f32], energy_threshold: f32) -> Vec<f32> {
    audio
        .chunks(defaults::TRIM_FRAME_SAMPLES)
        .filter(|frame| calculate_rms(frame) > energy_threshold)
        .flatten()
        .copied()
        .collect()
}

/// Orchestrates voice enrollment: validate → trim → normalize → encode →
/// persist.
pub struct Enroller<E, S> {
    encoder: E,
    store: S,
    config: EnrollmentConfig,
    sample_rate: u32,
    energy_threshold: f32,
}

impl<E: SpeakerEncoder, S: VoiceProfileStore> Enroller<E, S> {
    /// Creates an enroller over the given encoder and store.
    pub fn new(encoder: E, store: S, config: EnrollmentConfig, sample_rate: u32) -> Self {
        Self {
            encoder,
            store,
            config,
            sample_rate,
            energy_threshold: defaults::ENERGY_THRESHOLD,
        }
    }

    /// Overrides the silence-trimming energy threshold.
    pub fn with_energy_threshold(mut self, threshold: f32) -> Self {
        self.energy_threshold = threshold;
        self
    }

    /// Enrolls a new voice from a raw recording.
    ///
    /// The recording must already be normalized (mono f32, pipeline sample
    /// rate); see `audio::ingest`. Returns the generated user id.
    pub fn enroll(&self, audio: &[f32], sample_rate: u32) -> Result<String> {
        validate_enrollment(audio, sample_rate, self.sample_rate, &self.config)?;

        let speech = trim_silence(audio, self.energy_threshold);
        let speech_seconds = speech.len() as f32 / self.sample_rate as f32;
        if speech_seconds < self.config.min_speech_seconds {
            return Err(DubvoxError::NotEnoughSpeech {
                seconds: speech_seconds,
                min_seconds: self.config.min_speech_seconds,
            });
        }

        // DC-offset removal and peak scaling, so the embedding and the
        // synthesis reference see a consistent level regardless of how hot
        // the enrollment microphone ran
        let speech = normalize(&speech);
        let embedding = self.encoder.encode(&speech)?;

        let user_id = new_user_id();
        let profile = VoiceProfile::new(user_id.clone(), embedding, speech, self.sample_rate);
        self.store.save(&profile)?;

        tracing::debug!(user_id = %user_id, seconds = speech_seconds, "voice enrolled");
        Ok(user_id)
    }

    /// Access to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

/// Generates a short user id (first 8 hex chars of a v4 UUID).
fn new_user_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice::store::MemoryProfileStore;

    fn config() -> EnrollmentConfig {
        EnrollmentConfig::default()
    }

    /// A 30s recording of alternating speech and silence frames.
    fn speechy_recording() -> Vec<f32> {
        let mut audio = Vec::new();
        for i in 0..(30 * 16000 / defaults::TRIM_FRAME_SAMPLES) {
            if i % 3 == 0 {
                audio.extend(std::iter::repeat(0.0005).take(defaults::TRIM_FRAME_SAMPLES));
            } else {
                // zero-mean square wave so the speech has structure to keep
                audio.extend(
                    (0..defaults::TRIM_FRAME_SAMPLES)
                        .map(|n| if n % 2 == 0 { 0.3 } else { -0.3 }),
                );
            }
        }
        audio
    }

    #[test]
    fn test_validate_accepts_good_recording() {
        let audio = vec![0.1; 16000 * 30];
        assert!(validate_enrollment(&audio, 16000, 16000, &config()).is_ok());
    }

    #[test]
    fn test_validate_rejects_wrong_rate() {
        let audio = vec![0.1; 44100 * 30];
        assert!(matches!(
            validate_enrollment(&audio, 44100, 16000, &config()),
            Err(DubvoxError::SampleRateMismatch {
                expected: 16000,
                actual: 44100
            })
        ));
    }

    #[test]
    fn test_validate_rejects_too_short() {
        let audio = vec![0.1; 16000 * 2];
        assert!(matches!(
            validate_enrollment(&audio, 16000, 16000, &config()),
            Err(DubvoxError::AudioTooShort { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_too_long() {
        let audio = vec![0.1; 16000 * 120];
        assert!(matches!(
            validate_enrollment(&audio, 16000, 16000, &config()),
            Err(DubvoxError::AudioTooLong { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_too_quiet() {
        let audio = vec![0.001; 16000 * 30];
        assert!(matches!(
            validate_enrollment(&audio, 16000, 16000, &config()),
            Err(DubvoxError::AudioTooQuiet { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_clipping() {
        let mut audio = vec![0.1; 16000 * 30];
        for s in audio.iter_mut().take(16000) {
            *s = 1.0;
        }
        assert!(matches!(
            validate_enrollment(&audio, 16000, 16000, &config()),
            Err(DubvoxError::AudioClipping { .. })
        ));
    }

    #[test]
    fn test_trim_silence_drops_quiet_frames() {
        let mut audio = vec![0.0; defaults::TRIM_FRAME_SAMPLES];
        audio.extend(vec![0.3; defaults::TRIM_FRAME_SAMPLES]);
        audio.extend(vec![0.0; defaults::TRIM_FRAME_SAMPLES]);

        let trimmed = trim_silence(&audio, 0.015);
        assert_eq!(trimmed.len(), defaults::TRIM_FRAME_SAMPLES);
        assert_eq!(trimmed[0], 0.3);
    }

    #[test]
    fn test_trim_silence_all_silent() {
        let audio = vec![0.0; 16000];
        assert!(trim_silence(&audio, 0.015).is_empty());
    }

    #[test]
    fn test_enroll_happy_path() {
        let enroller = Enroller::new(
            MockSpeakerEncoder::new(8),
            MemoryProfileStore::new(),
            config(),
            16000,
        );

        let user_id = enroller.enroll(&speechy_recording(), 16000).unwrap();
        assert_eq!(user_id.len(), 8);

        let profile = enroller.store().load(&user_id).unwrap();
        assert_eq!(profile.embedding.len(), 8);
        assert!(profile.reference_seconds() >= 5.0);
    }

    #[test]
    fn test_enroll_normalizes_retained_speech() {
        let enroller = Enroller::new(
            MockSpeakerEncoder::new(8),
            MemoryProfileStore::new(),
            config(),
            16000,
        );

        let user_id = enroller.enroll(&speechy_recording(), 16000).unwrap();
        let profile = enroller.store().load(&user_id).unwrap();

        // Stored reference is DC-free and scaled to unit peak
        let peak = profile.reference.iter().fold(0.0f32, |p, s| p.max(s.abs()));
        assert!((peak - 1.0).abs() < 1e-3);
        let mean: f32 =
            profile.reference.iter().sum::<f32>() / profile.reference.len() as f32;
        assert!(mean.abs() < 1e-3);
    }

    #[test]
    fn test_enroll_generates_distinct_ids() {
        let enroller = Enroller::new(
            MockSpeakerEncoder::new(8),
            MemoryProfileStore::new(),
            config(),
            16000,
        );

        let a = enroller.enroll(&speechy_recording(), 16000).unwrap();
        let b = enroller.enroll(&speechy_recording(), 16000).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_enroll_rejects_mostly_silence() {
        let enroller = Enroller::new(
            MockSpeakerEncoder::new(8),
            MemoryProfileStore::new(),
            config(),
            16000,
        );

        // Loud enough overall to pass RMS, but only 2s of actual speech
        let mut audio = vec![0.0; 16000 * 28];
        audio.extend(vec![0.5; 16000 * 2]);

        assert!(matches!(
            enroller.enroll(&audio, 16000),
            Err(DubvoxError::NotEnoughSpeech { .. })
        ));
    }

    #[test]
    fn test_enroll_propagates_encoder_failure() {
        let enroller = Enroller::new(
            MockSpeakerEncoder::new(8).with_failure(),
            MemoryProfileStore::new(),
            config(),
            16000,
        );

        assert!(matches!(
            enroller.enroll(&speechy_recording(), 16000),
            Err(DubvoxError::SpeakerEncoding { .. })
        ));
    }

    #[test]
    fn test_enroll_validation_precedes_persistence() {
        let store = MemoryProfileStore::new();
        let enroller = Enroller::new(MockSpeakerEncoder::new(8), store, config(), 16000);

        let _ = enroller.enroll(&[0.1; 100], 16000);
        // Nothing persisted on a failed attempt — enroll generated no id,
        // so nothing to look up; verify via a fresh successful enrollment
        let ok_id = enroller.enroll(&speechy_recording(), 16000).unwrap();
        assert!(enroller.store().exists(&ok_id));
    }
}
