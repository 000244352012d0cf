//! Boundary audio normalization.
//!
//! Everything downstream of this module works on mono f32 samples in
//! [-1.0, 1.0] at one fixed rate. Callers hand whatever their capture
//! source produced (interleaved stereo, 16-bit PCM, foreign sample rates)
//! to `ingest` exactly once; internal components never re-coerce formats.

/// Convert 16-bit PCM samples to normalized f32.
pub fn pcm_to_f32(samples: &[i16]) -> Vec<f32> {
    samples
        .iter()
        .map(|&s| s as f32 / i16::MAX as f32)
        .collect()
}

/// Fold interleaved multi-channel audio to mono by averaging channels.
///
/// A channel count of 0 or 1 returns the input unchanged. Trailing samples
/// that do not form a complete frame are dropped.
pub fn to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }

    let channels = channels as usize;
    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Simple linear interpolation resampling.
pub fn resample_linear(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let pos = i as f64 * ratio;
            let idx = pos as usize;
            let frac = pos - idx as f64;

            if idx + 1 < samples.len() {
                let a = samples[idx] as f64;
                let b = samples[idx + 1] as f64;
                (a + (b - a) * frac) as f32
            } else {
                samples[samples.len() - 1]
            }
        })
        .collect()
}

/// Remove DC offset and scale to unit peak.
///
/// Speaker encoders expect level-normalized input; a recording with a DC
/// bias or a low peak would skew the embedding. Input with zero peak after
/// centering is returned centered but unscaled.
pub fn normalize(samples: &[f32]) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }

    let mean = (samples.iter().map(|&s| s as f64).sum::<f64>() / samples.len() as f64) as f32;
    let mut centered: Vec<f32> = samples.iter().map(|s| s - mean).collect();

    let peak = centered.iter().fold(0.0f32, |p, s| p.max(s.abs()));
    if peak > 0.0 {
        for s in &mut centered {
            *s /= peak;
        }
    }
    centered
}

/// Normalize a captured chunk to the pipeline contract: mono, `target_rate`,
/// samples clamped to [-1.0, 1.0].
pub fn ingest(samples: &[f32], channels: u16, sample_rate: u32, target_rate: u32) -> Vec<f32> {
    let mono = to_mono(samples, channels);
    let mut resampled = resample_linear(&mono, sample_rate, target_rate);
    for s in &mut resampled {
        *s = s.clamp(-1.0, 1.0);
    }
    resampled
}
