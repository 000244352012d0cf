//! Audio-side components: ingest normalization, the rolling sample buffer,
//! and the voice activity gate.

pub mod buffer;
pub mod gate;
pub mod ingest;

pub use buffer::AudioBuffer;
pub use gate::{calculate_rms, Clock, SystemClock, VoiceActivityGate, VoiceActivityGateConfig};
