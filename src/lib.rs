//! dubvox - Real-time speech-to-speech translation.
//!
//! Streaming pipeline: buffer microphone audio, gate on voice activity,
//! transcribe a sliding window, commit stable phrases, translate the
//! committed deltas (optionally emotion-aware), and synthesize the target
//! language in the speaker's own cloned voice.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod asr;
pub mod audio;
pub mod config;
pub mod defaults;
pub mod error;
pub mod session;
pub mod translate;
pub mod tts;
pub mod voice;

// Core pipeline components
pub use asr::committer::PhraseCommitter;
pub use audio::buffer::AudioBuffer;
pub use audio::gate::{VoiceActivityGate, VoiceActivityGateConfig};
pub use translate::delta::TranslationDeltaBuffer;

// Capability traits (external model boundaries)
pub use asr::transcriber::Transcriber;
pub use translate::emotion::{Emotion, EmotionDetector};
pub use translate::translator::Translator;
pub use tts::synthesizer::Synthesizer;
pub use voice::enroll::{Enroller, SpeakerEncoder};
pub use voice::profile::VoiceProfile;
pub use voice::store::{FsProfileStore, VoiceProfileStore};

// Orchestration
pub use session::registry::SessionRegistry;
pub use session::session::{Capabilities, Session, SessionConfig, TickOutput};
pub use session::worker::{SessionWorker, SessionWorkerHandle};

// Error handling
pub use error::{DubvoxError, Result};

// Config
pub use config::Config;
