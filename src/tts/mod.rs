//! Speech synthesis with voice cloning (external capability boundary).

pub mod synthesizer;

pub use synthesizer::{MockSynthesizer, Synthesizer};
