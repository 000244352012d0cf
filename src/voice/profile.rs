//! Speaker profile value type.

/// A persisted voice identity: speaker embedding plus the reference clip
/// used to condition synthesis.
///
/// Profiles are immutable once saved; re-enrollment creates a new id.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceProfile {
    /// User identifier the profile is keyed by.
    pub user_id: String,
    /// Speaker embedding vector (dimensionality fixed by the encoder).
    pub embedding: Vec<f32>,
    /// Reference audio clip, mono f32.
    pub reference: Vec<f32>,
    /// Sample rate of the reference clip.
    pub sample_rate: u32,
}

impl VoiceProfile {
    /// Creates a profile.
    pub fn new(
        user_id: impl Into<String>,
        embedding: Vec<f32>,
        reference: Vec<f32>,
        sample_rate: u32,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            embedding,
            reference,
            sample_rate,
        }
    }

    /// Duration of the reference clip in seconds.
    pub fn reference_seconds(&self) -> f32 {
        self.reference.len() as f32 / self.sample_rate as f32
    }
}
