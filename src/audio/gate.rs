//! Voice activity gate.
//!
//! A cheap RMS energy heuristic that keeps the expensive transcription
//! model off pure silence, plus a silence-duration timer that debounces
//! buffer resets: one quiet chunk must not discard context, a sustained
//! pause should.

use crate::defaults;
use std::time::{Duration, Instant};

/// Trait for time operations, allowing mock time in tests.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

/// Real system clock using `std::time::Instant::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Configuration for the voice activity gate.
#[derive(Debug, Clone, Copy)]
pub struct VoiceActivityGateConfig {
    /// RMS threshold for classifying a chunk as speech (0.0 to 1.0).
    pub energy_threshold: f32,
    /// Silence duration after which `is_silence_long` reports true.
    pub silence_duration: Duration,
}

impl Default for VoiceActivityGateConfig {
    fn default() -> Self {
        Self {
            energy_threshold: defaults::ENERGY_THRESHOLD,
            silence_duration: Duration::from_millis(defaults::SILENCE_DURATION_MS as u64),
        }
    }
}

/// Energy-based speech/silence classifier with a silence timer.
pub struct VoiceActivityGate<C: Clock = SystemClock> {
    config: VoiceActivityGateConfig,
    last_voice_time: Instant,
    clock: C,
}

impl<C: Clock> VoiceActivityGate<C> {
    /// Creates a gate with the given configuration and clock.
    pub fn with_clock(config: VoiceActivityGateConfig, clock: C) -> Self {
        let last_voice_time = clock.now();
        Self {
            config,
            last_voice_time,
            clock,
        }
    }

    /// Returns true iff the chunk's RMS energy exceeds the threshold.
    ///
    /// On true, stamps the last-voice timestamp. The timestamp only moves
    /// forward, and only on speech.
    pub fn is_speech(&mut self, chunk: &[f32]) -> bool {
        let energy = calculate_rms(chunk);
        if energy > self.config.energy_threshold {
            self.last_voice_time = self.clock.now();
            return true;
        }
        false
    }

    /// Returns true iff the elapsed time since the last speech chunk
    /// exceeds the configured silence duration.
    pub fn is_silence_long(&self) -> bool {
        self.clock.now().duration_since(self.last_voice_time) > self.config.silence_duration
    }

    /// Updates the energy threshold without resetting timer state.
    pub fn set_threshold(&mut self, threshold: f32) {
        self.config.energy_threshold = threshold;
    }

    /// Current energy threshold.
    pub fn threshold(&self) -> f32 {
        self.config.energy_threshold
    }

    /// Restarts the silence timer from now.
    pub fn reset(&mut self) {
        self.last_voice_time = self.clock.now();
    }
}

impl VoiceActivityGate<SystemClock> {
    /// Creates a gate with the given configuration using the system clock.
    pub fn new(config: VoiceActivityGateConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

/// Calculates the root-mean-square energy of normalized f32 samples.
///
/// Returns a value in [0.0, 1.0]: 0.0 for silence, ~0.707 for a full-scale
/// sine wave. Empty input yields 0.0.
pub fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f64 = samples.iter().map(|&s| s as f64 * s as f64).sum();
    (sum_squares / samples.len() as f64).sqrt() as f32
}
