//! Rolling audio sample buffer.
//!
//! Keeps the most recent N seconds of mono audio for sliding-window
//! transcription. Under continuous input pressure the oldest samples are
//! discarded; the tail (most recent samples) is always preserved exactly.

/// Fixed-capacity rolling buffer of mono f32 samples.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
    max_samples: usize,
}

impl AudioBuffer {
    /// Creates a buffer retaining at most `max_seconds` of audio.
    pub fn new(max_seconds: f32, sample_rate: u32) -> Self {
        let max_samples = (max_seconds * sample_rate as f32) as usize;
        Self {
            samples: Vec::with_capacity(max_samples),
            sample_rate,
            max_samples,
        }
    }

    /// Appends a chunk, truncating from the front if the buffer would exceed
    /// its capacity. Returns the retained contents.
    ///
    /// The chunk must already be normalized (mono, buffer sample rate);
    /// see `audio::ingest`. Zero-length chunks are allowed.
    pub fn add(&mut self, chunk: &[f32]) -> &[f32] {
        self.samples.extend_from_slice(chunk);

        if self.samples.len() > self.max_samples {
            let excess = self.samples.len() - self.max_samples;
            self.samples.drain(..excess);
        }

        &self.samples
    }

    /// Returns the last `seconds` of audio without mutating the buffer.
    ///
    /// Returns fewer samples if the buffer holds less than requested.
    pub fn get_recent(&self, seconds: f32) -> &[f32] {
        let wanted = (seconds * self.sample_rate as f32) as usize;
        let start = self.samples.len().saturating_sub(wanted);
        &self.samples[start..]
    }

    /// Clears the buffer.
    pub fn reset(&mut self) {
        self.samples.clear();
    }

    /// Returns the full contents and clears the buffer, for one final
    /// whole-utterance pass.
    pub fn flush(&mut self) -> Vec<f32> {
        std::mem::take(&mut self.samples)
    }

    /// Number of samples currently retained.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if no samples are retained.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration of the retained audio in seconds.
    pub fn duration_seconds(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Maximum number of samples this buffer retains.
    pub fn capacity(&self) -> usize {
        self.max_samples
    }
}
