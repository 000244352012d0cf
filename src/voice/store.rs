//! Voice profile persistence.
//!
//! A profile is stored as two files keyed by user id: a JSON record with
//! the speaker embedding and a WAV reference clip. Profiles are write-once;
//! saving over an existing id is an error and re-enrollment must use a
//! fresh id.

use crate::error::{DubvoxError, Result};
use crate::voice::profile::VoiceProfile;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Trait for saving and loading voice profiles.
pub trait VoiceProfileStore: Send + Sync {
    /// Persists a new profile. Fails with `ProfileExists` if the user id
    /// is already enrolled.
    fn save(&self, profile: &VoiceProfile) -> Result<()>;

    /// Loads the profile for a user id. Fails with `ProfileNotFound` for
    /// unknown ids.
    fn load(&self, user_id: &str) -> Result<VoiceProfile>;

    /// Returns true if a profile exists for the user id.
    fn exists(&self, user_id: &str) -> bool;
}

/// Implement VoiceProfileStore for Arc<T> to allow sharing between the
/// enroller and the session registry.
impl<T: VoiceProfileStore + ?Sized> VoiceProfileStore for std::sync::Arc<T> {
    fn save(&self, profile: &VoiceProfile) -> Result<()> {
        (**self).save(profile)
    }

    fn load(&self, user_id: &str) -> Result<VoiceProfile> {
        (**self).load(user_id)
    }

    fn exists(&self, user_id: &str) -> bool {
        (**self).exists(user_id)
    }
}

/// On-disk embedding record.
#[derive(Debug, Serialize, Deserialize)]
struct EmbeddingRecord {
    user_id: String,
    sample_rate: u32,
    embedding: Vec<f32>,
}

/// Filesystem-backed profile store.
///
/// Layout: `<dir>/<user_id>_embedding.json` + `<dir>/<user_id>_reference.wav`.
pub struct FsProfileStore {
    dir: PathBuf,
}

impl FsProfileStore {
    /// Creates a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn embedding_path(&self, user_id: &str) -> PathBuf {
        self.dir.join(format!("{}_embedding.json", user_id))
    }

    fn reference_path(&self, user_id: &str) -> PathBuf {
        self.dir.join(format!("{}_reference.wav", user_id))
    }

    fn write_reference(&self, path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer =
            hound::WavWriter::create(path, spec).map_err(|e| DubvoxError::ProfileStorage {
                message: format!("Failed to create reference WAV: {}", e),
            })?;

        for &s in samples {
            let pcm = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer
                .write_sample(pcm)
                .map_err(|e| DubvoxError::ProfileStorage {
                    message: format!("Failed to write reference WAV: {}", e),
                })?;
        }

        writer.finalize().map_err(|e| DubvoxError::ProfileStorage {
            message: format!("Failed to finalize reference WAV: {}", e),
        })
    }

    fn read_reference(&self, path: &Path) -> Result<(Vec<f32>, u32)> {
        let mut reader =
            hound::WavReader::open(path).map_err(|e| DubvoxError::ProfileStorage {
                message: format!("Failed to open reference WAV: {}", e),
            })?;

        let sample_rate = reader.spec().sample_rate;
        let samples: Vec<f32> = reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / i16::MAX as f32))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| DubvoxError::ProfileStorage {
                message: format!("Failed to read reference WAV: {}", e),
            })?;

        Ok((samples, sample_rate))
    }
}

impl VoiceProfileStore for FsProfileStore {
    fn save(&self, profile: &VoiceProfile) -> Result<()> {
        if self.exists(&profile.user_id) {
            return Err(DubvoxError::ProfileExists {
                user_id: profile.user_id.clone(),
            });
        }

        let record = EmbeddingRecord {
            user_id: profile.user_id.clone(),
            sample_rate: profile.sample_rate,
            embedding: profile.embedding.clone(),
        };
        let json =
            serde_json::to_string_pretty(&record).map_err(|e| DubvoxError::ProfileStorage {
                message: format!("Failed to serialize embedding: {}", e),
            })?;

        self.write_reference(
            &self.reference_path(&profile.user_id),
            &profile.reference,
            profile.sample_rate,
        )?;
        fs::write(self.embedding_path(&profile.user_id), json)?;

        tracing::debug!(user_id = %profile.user_id, "voice profile saved");
        Ok(())
    }

    fn load(&self, user_id: &str) -> Result<VoiceProfile> {
        let embedding_path = self.embedding_path(user_id);
        if !embedding_path.exists() {
            return Err(DubvoxError::ProfileNotFound {
                user_id: user_id.to_string(),
            });
        }

        let json = fs::read_to_string(&embedding_path)?;
        let record: EmbeddingRecord =
            serde_json::from_str(&json).map_err(|e| DubvoxError::ProfileStorage {
                message: format!("Failed to parse embedding record: {}", e),
            })?;

        let (reference, sample_rate) = self.read_reference(&self.reference_path(user_id))?;

        Ok(VoiceProfile {
            user_id: record.user_id,
            embedding: record.embedding,
            reference,
            sample_rate,
        })
    }

    fn exists(&self, user_id: &str) -> bool {
        self.embedding_path(user_id).exists()
    }
}

/// In-memory profile store for tests.
#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: Mutex<HashMap<String, VoiceProfile>>,
}

impl MemoryProfileStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl VoiceProfileStore for MemoryProfileStore {
    fn save(&self, profile: &VoiceProfile) -> Result<()> {
        let mut profiles = self.profiles.lock().unwrap_or_else(|e| e.into_inner());
        if profiles.contains_key(&profile.user_id) {
            return Err(DubvoxError::ProfileExists {
                user_id: profile.user_id.clone(),
            });
        }
        profiles.insert(profile.user_id.clone(), profile.clone());
        Ok(())
    }

    fn load(&self, user_id: &str) -> Result<VoiceProfile> {
        let profiles = self.profiles.lock().unwrap_or_else(|e| e.into_inner());
        profiles
            .get(user_id)
            .cloned()
            .ok_or_else(|| DubvoxError::ProfileNotFound {
                user_id: user_id.to_string(),
            })
    }

    fn exists(&self, user_id: &str) -> bool {
        let profiles = self.profiles.lock().unwrap_or_else(|e| e.into_inner());
        profiles.contains_key(user_id)
    }
}
