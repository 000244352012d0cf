use crate::defaults;
use crate::error::{DubvoxError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub commit: CommitConfig,
    pub translation: TranslationConfig,
    pub enrollment: EnrollmentConfig,
    pub profiles: ProfilesConfig,
}

/// Audio pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub energy_threshold: f32,
    pub silence_duration_ms: u32,
    pub buffer_seconds: f32,
    pub live_window_seconds: f32,
}

/// Phrase commit configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CommitConfig {
    pub min_words: usize,
    /// Force-commit any pending sub-threshold delta when a long silence
    /// resets the audio buffer.
    pub flush_on_silence: bool,
}

/// Translation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TranslationConfig {
    pub source_lang: String,
    pub target_lang: String,
    pub emotion_aware: bool,
}

/// Voice enrollment validation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EnrollmentConfig {
    pub min_seconds: f32,
    pub max_seconds: f32,
    pub min_rms: f32,
    pub max_clip_ratio: f32,
    pub min_speech_seconds: f32,
}

/// Voice profile storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProfilesConfig {
    /// Directory for persisted voice profiles. `None` uses the platform
    /// data directory.
    pub dir: Option<PathBuf>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
            energy_threshold: defaults::ENERGY_THRESHOLD,
            silence_duration_ms: defaults::SILENCE_DURATION_MS,
            buffer_seconds: defaults::BUFFER_SECONDS,
            live_window_seconds: defaults::LIVE_WINDOW_SECONDS,
        }
    }
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self {
            min_words: defaults::MIN_COMMIT_WORDS,
            flush_on_silence: false,
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            source_lang: defaults::SOURCE_LANG.to_string(),
            target_lang: defaults::TARGET_LANG.to_string(),
            emotion_aware: true,
        }
    }
}

impl Default for EnrollmentConfig {
    fn default() -> Self {
        Self {
            min_seconds: defaults::ENROLL_MIN_SECONDS,
            max_seconds: defaults::ENROLL_MAX_SECONDS,
            min_rms: defaults::ENROLL_MIN_RMS,
            max_clip_ratio: defaults::ENROLL_MAX_CLIP_RATIO,
            min_speech_seconds: defaults::ENROLL_MIN_SPEECH_SECONDS,
        }
    }
}

impl Default for ProfilesConfig {
    fn default() -> Self {
        Self { dir: None }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file is missing or contains invalid TOML.
    /// Missing fields use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DubvoxError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                DubvoxError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file, falling back to defaults only when
    /// the file does not exist. Invalid TOML is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(DubvoxError::ConfigFileNotFound { .. }) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - DUBVOX_SOURCE_LANG → translation.source_lang
    /// - DUBVOX_TARGET_LANG → translation.target_lang
    /// - DUBVOX_PROFILE_DIR → profiles.dir
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(lang) = std::env::var("DUBVOX_SOURCE_LANG") {
            if !lang.is_empty() {
                self.translation.source_lang = lang;
            }
        }

        if let Ok(lang) = std::env::var("DUBVOX_TARGET_LANG") {
            if !lang.is_empty() {
                self.translation.target_lang = lang;
            }
        }

        if let Ok(dir) = std::env::var("DUBVOX_PROFILE_DIR") {
            if !dir.is_empty() {
                self.profiles.dir = Some(PathBuf::from(dir));
            }
        }

        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.audio.sample_rate == 0 {
            return Err(DubvoxError::ConfigInvalidValue {
                key: "audio.sample_rate".to_string(),
                message: "must be positive".to_string(),
            });
        }

        if !(0.0..1.0).contains(&self.audio.energy_threshold) {
            return Err(DubvoxError::ConfigInvalidValue {
                key: "audio.energy_threshold".to_string(),
                message: "must be in [0.0, 1.0)".to_string(),
            });
        }

        if self.audio.buffer_seconds <= 0.0 {
            return Err(DubvoxError::ConfigInvalidValue {
                key: "audio.buffer_seconds".to_string(),
                message: "must be positive".to_string(),
            });
        }

        if self.audio.live_window_seconds <= 0.0
            || self.audio.live_window_seconds > self.audio.buffer_seconds
        {
            return Err(DubvoxError::ConfigInvalidValue {
                key: "audio.live_window_seconds".to_string(),
                message: "must be positive and no larger than buffer_seconds".to_string(),
            });
        }

        if self.commit.min_words == 0 {
            return Err(DubvoxError::ConfigInvalidValue {
                key: "commit.min_words".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if self.translation.source_lang.is_empty() || self.translation.target_lang.is_empty() {
            return Err(DubvoxError::ConfigInvalidValue {
                key: "translation".to_string(),
                message: "language tags must not be empty".to_string(),
            });
        }

        if self.enrollment.min_seconds >= self.enrollment.max_seconds {
            return Err(DubvoxError::ConfigInvalidValue {
                key: "enrollment.min_seconds".to_string(),
                message: "must be less than max_seconds".to_string(),
            });
        }

        Ok(())
    }

    /// Resolve the voice profile directory, using the platform data
    /// directory when none is configured.
    pub fn profile_dir(&self) -> PathBuf {
        if let Some(ref dir) = self.profiles.dir {
            return dir.clone();
        }
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dubvox")
            .join("profiles")
    }
}
