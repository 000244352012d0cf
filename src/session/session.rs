//! One user's pipeline state and the per-chunk tick.
//!
//! A tick runs strictly forward: buffer → gate → transcribe window →
//! commit → delta → (emotion) → translate → synthesize. External
//! capability failures are absorbed at this boundary — the tick degrades
//! to the previous known-good outputs and no audio, and the session stays
//! live. A failed translation or synthesis rolls the committer, delta
//! buffer, and history back to their pre-tick state, so the phrase is
//! committed again on a later successful tick instead of being lost.

use crate::asr::committer::PhraseCommitter;
use crate::asr::transcriber::Transcriber;
use crate::audio::buffer::AudioBuffer;
use crate::audio::gate::{VoiceActivityGate, VoiceActivityGateConfig};
use crate::config::Config;
use crate::defaults;
use crate::error::Result;
use crate::translate::delta::TranslationDeltaBuffer;
use crate::translate::emotion::{Emotion, EmotionDetector};
use crate::translate::translator::Translator;
use crate::tts::synthesizer::Synthesizer;
use crate::voice::profile::VoiceProfile;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Per-session tuning, usually derived from the crate [`Config`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub sample_rate: u32,
    pub buffer_seconds: f32,
    pub live_window_seconds: f32,
    pub energy_threshold: f32,
    pub silence_duration: Duration,
    pub min_commit_words: usize,
    pub flush_on_silence: bool,
    pub source_lang: String,
    pub target_lang: String,
    pub emotion_aware: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
            buffer_seconds: defaults::BUFFER_SECONDS,
            live_window_seconds: defaults::LIVE_WINDOW_SECONDS,
            energy_threshold: defaults::ENERGY_THRESHOLD,
            silence_duration: Duration::from_millis(defaults::SILENCE_DURATION_MS as u64),
            min_commit_words: defaults::MIN_COMMIT_WORDS,
            flush_on_silence: false,
            source_lang: defaults::SOURCE_LANG.to_string(),
            target_lang: defaults::TARGET_LANG.to_string(),
            emotion_aware: true,
        }
    }
}

impl From<&Config> for SessionConfig {
    fn from(config: &Config) -> Self {
        Self {
            sample_rate: config.audio.sample_rate,
            buffer_seconds: config.audio.buffer_seconds,
            live_window_seconds: config.audio.live_window_seconds,
            energy_threshold: config.audio.energy_threshold,
            silence_duration: Duration::from_millis(config.audio.silence_duration_ms as u64),
            min_commit_words: config.commit.min_words,
            flush_on_silence: config.commit.flush_on_silence,
            source_lang: config.translation.source_lang.clone(),
            target_lang: config.translation.target_lang.clone(),
            emotion_aware: config.translation.emotion_aware,
        }
    }
}

/// External capabilities a session invokes, shareable across sessions.
#[derive(Clone)]
pub struct Capabilities {
    pub transcriber: Arc<dyn Transcriber>,
    pub emotion: Arc<dyn EmotionDetector>,
    pub translator: Arc<dyn Translator>,
    pub synthesizer: Arc<dyn Synthesizer>,
}

/// Output of one pipeline tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutput {
    /// Live (unstable) transcript as of this tick.
    pub live_text: String,
    /// Most recent translated text.
    pub translation: String,
    /// Synthesized audio for a newly committed phrase, if any.
    pub audio: Option<Vec<f32>>,
}

/// Snapshot of commit-side state, taken before a phrase is processed so a
/// downstream failure can un-commit it.
struct CommitCheckpoint {
    committer: PhraseCommitter,
    delta: TranslationDeltaBuffer,
    history_len: usize,
    last_translation: String,
}

/// One user's streaming translation session.
pub struct Session {
    config: SessionConfig,
    buffer: AudioBuffer,
    gate: VoiceActivityGate,
    committer: PhraseCommitter,
    delta: TranslationDeltaBuffer,
    capabilities: Capabilities,
    profile: VoiceProfile,

    committed_history: String,
    last_live: String,
    last_translation: String,
    last_tick: Instant,
}

impl Session {
    /// Creates a session for the given speaker profile.
    pub fn new(config: SessionConfig, capabilities: Capabilities, profile: VoiceProfile) -> Self {
        let buffer = AudioBuffer::new(config.buffer_seconds, config.sample_rate);
        let gate = VoiceActivityGate::new(VoiceActivityGateConfig {
            energy_threshold: config.energy_threshold,
            silence_duration: config.silence_duration,
        });
        let committer = PhraseCommitter::new(config.min_commit_words);

        Self {
            config,
            buffer,
            gate,
            committer,
            delta: TranslationDeltaBuffer::new(),
            capabilities,
            profile,
            committed_history: String::new(),
            last_live: String::new(),
            last_translation: String::new(),
            last_tick: Instant::now(),
        }
    }

    /// Processes one audio chunk end-to-end.
    ///
    /// The chunk must already be normalized (mono f32, session sample
    /// rate); see `audio::ingest`. Always buffers the chunk; transcription
    /// and everything downstream run only on speech. Runtime failures are
    /// absorbed: the returned tick carries the previous known-good text
    /// and no audio.
    pub fn process_chunk(&mut self, chunk: &[f32]) -> TickOutput {
        self.last_tick = Instant::now();
        self.buffer.add(chunk);

        let mut audio_out = None;

        if self.gate.is_speech(chunk) {
            match self.speech_tick() {
                Ok(audio) => audio_out = audio,
                Err(e) => {
                    tracing::warn!(user_id = %self.profile.user_id, error = %e,
                        "tick degraded to last known-good output");
                }
            }
        }

        if self.gate.is_silence_long() && !self.buffer.is_empty() {
            audio_out = audio_out.or_else(|| self.on_long_silence());
        }

        TickOutput {
            live_text: self.last_live.clone(),
            translation: self.last_translation.clone(),
            audio: audio_out,
        }
    }

    /// Speech path of a tick: sliding-window transcription and, when a
    /// phrase commits, translation and synthesis.
    fn speech_tick(&mut self) -> Result<Option<Vec<f32>>> {
        let window = self.buffer.get_recent(self.config.live_window_seconds);
        if window.len() < defaults::MIN_TRANSCRIBE_SAMPLES {
            return Ok(None);
        }

        let live = self
            .capabilities
            .transcriber
            .transcribe(window, &self.config.source_lang)?;
        self.last_live = live.clone();

        let checkpoint = self.commit_checkpoint();
        let result = match self.committer.process(&live) {
            Some(phrase) => self.handle_phrase(&phrase),
            None => Ok(None),
        };
        if result.is_err() {
            // Un-commit so the phrase is retried once the capability recovers
            self.restore_commit(checkpoint);
        }
        result
    }

    fn commit_checkpoint(&self) -> CommitCheckpoint {
        CommitCheckpoint {
            committer: self.committer.clone(),
            delta: self.delta.clone(),
            history_len: self.committed_history.len(),
            last_translation: self.last_translation.clone(),
        }
    }

    fn restore_commit(&mut self, checkpoint: CommitCheckpoint) {
        self.committer = checkpoint.committer;
        self.delta = checkpoint.delta;
        self.committed_history.truncate(checkpoint.history_len);
        self.last_translation = checkpoint.last_translation;
    }

    /// Appends a committed phrase to the history and pushes any new source
    /// text through translation and synthesis. Callers take a commit
    /// checkpoint beforehand and restore it on the error path.
    fn handle_phrase(&mut self, phrase: &str) -> Result<Option<Vec<f32>>> {
        if !self.committed_history.is_empty() {
            self.committed_history.push(' ');
        }
        self.committed_history.push_str(phrase);

        let history = self.committed_history.clone();
        let Some(source_delta) = self.delta.get_delta(&history) else {
            return Ok(None);
        };

        // Emotion is an optional stage: a detector failure downgrades the
        // label to none rather than failing the tick.
        let emotion = if self.config.emotion_aware {
            match self.capabilities.emotion.detect(&source_delta) {
                Ok(label) => Some(label),
                Err(e) => {
                    tracing::debug!(error = %e, "emotion detection skipped");
                    None
                }
            }
        } else {
            None
        };

        let translated = self.capabilities.translator.translate(
            &source_delta,
            &self.config.source_lang,
            &self.config.target_lang,
            emotion,
        )?;
        self.last_translation = translated.clone();

        let audio = self.capabilities.synthesizer.synthesize(
            &translated,
            &self.config.target_lang,
            &self.profile,
        )?;

        Ok(if audio.is_empty() { None } else { Some(audio) })
    }

    /// Long-silence handling: optionally flush the pending sub-threshold
    /// delta, then reset the audio buffer. Committer and delta-buffer
    /// state track logical transcript continuity and survive the reset.
    fn on_long_silence(&mut self) -> Option<Vec<f32>> {
        let mut audio_out = None;

        if self.config.flush_on_silence {
            let live = self.last_live.clone();
            let checkpoint = self.commit_checkpoint();
            if let Some(phrase) = self.committer.flush(&live) {
                match self.handle_phrase(&phrase) {
                    Ok(audio) => audio_out = audio,
                    Err(e) => {
                        self.restore_commit(checkpoint);
                        tracing::warn!(user_id = %self.profile.user_id, error = %e,
                            "silence flush degraded");
                    }
                }
            }
        }

        self.buffer.reset();
        audio_out
    }

    /// Text committed so far, in emission order.
    pub fn committed_history(&self) -> &str {
        &self.committed_history
    }

    /// Live transcript from the most recent speech tick.
    pub fn live_text(&self) -> &str {
        &self.last_live
    }

    /// Most recent translation output.
    pub fn translation(&self) -> &str {
        &self.last_translation
    }

    /// The enrolled profile this session synthesizes with.
    pub fn profile(&self) -> &VoiceProfile {
        &self.profile
    }

    /// Time since the last processed chunk.
    pub fn idle_for(&self) -> Duration {
        self.last_tick.elapsed()
    }

    /// Samples currently buffered.
    pub fn buffered_samples(&self) -> usize {
        self.buffer.len()
    }

    /// Detected emotion label for a phrase, for callers that surface it.
    pub fn detect_emotion(&self, text: &str) -> Option<Emotion> {
        self.capabilities.emotion.detect(text).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asr::transcriber::MockTranscriber;
    use crate::translate::emotion::{Emotion, MockEmotionDetector};
    use crate::translate::translator::MockTranslator;
    use crate::tts::synthesizer::MockSynthesizer;

    fn capabilities(transcriber: MockTranscriber) -> Capabilities {
        Capabilities {
            transcriber: Arc::new(transcriber),
            emotion: Arc::new(MockEmotionDetector::new(Emotion::Neutral)),
            translator: Arc::new(MockTranslator::new()),
            synthesizer: Arc::new(MockSynthesizer::new()),
        }
    }

    fn profile() -> VoiceProfile {
        VoiceProfile::new("user1", vec![0.1; 8], vec![0.1; 16000], 16000)
    }

    fn config() -> SessionConfig {
        SessionConfig {
            min_commit_words: 2,
            ..SessionConfig::default()
        }
    }

    fn speech_chunk() -> Vec<f32> {
        vec![0.3; 3200] // 200ms of loud audio
    }

    fn silent_chunk() -> Vec<f32> {
        vec![0.0; 3200]
    }

    #[test]
    fn test_silence_produces_no_output() {
        let mut session = Session::new(
            config(),
            capabilities(MockTranscriber::new("should not run")),
            profile(),
        );

        let out = session.process_chunk(&silent_chunk());
        assert_eq!(out.live_text, "");
        assert_eq!(out.translation, "");
        assert!(out.audio.is_none());
    }

    #[test]
    fn test_silent_chunks_are_still_buffered() {
        let mut session = Session::new(
            config(),
            capabilities(MockTranscriber::new("")),
            profile(),
        );

        session.process_chunk(&silent_chunk());
        assert_eq!(session.buffered_samples(), 3200);
    }

    #[test]
    fn test_speech_updates_live_text() {
        let mut session = Session::new(
            config(),
            capabilities(MockTranscriber::new("hello")),
            profile(),
        );

        let out = session.process_chunk(&speech_chunk());
        assert_eq!(out.live_text, "hello");
        // One word < min_commit_words → nothing committed or translated
        assert_eq!(out.translation, "");
        assert!(out.audio.is_none());
    }

    #[test]
    fn test_commit_translate_synthesize() {
        let mut session = Session::new(
            config(),
            capabilities(MockTranscriber::new("hello there friend")),
            profile(),
        );

        let out = session.process_chunk(&speech_chunk());
        assert_eq!(out.live_text, "hello there friend");
        assert_eq!(out.translation, "[hi] hello there friend");
        assert!(out.audio.is_some());
        assert_eq!(session.committed_history(), "hello there friend");
    }

    #[test]
    fn test_growing_transcript_emits_disjoint_phrases() {
        let transcriber = MockTranscriber::with_script(vec![
            "good morning",
            "good morning how are",
            "good morning how are you today",
        ]);
        let mut session = Session::new(config(), capabilities(transcriber), profile());

        let first = session.process_chunk(&speech_chunk());
        assert_eq!(first.translation, "[hi] good morning");

        let second = session.process_chunk(&speech_chunk());
        assert_eq!(second.translation, "[hi] how are");

        let third = session.process_chunk(&speech_chunk());
        assert_eq!(third.translation, "[hi] you today");

        assert_eq!(
            session.committed_history(),
            "good morning how are you today"
        );
    }

    #[test]
    fn test_short_window_skips_transcription() {
        let transcriber = MockTranscriber::new("should not run");
        let mut session = Session::new(config(), capabilities(transcriber), profile());

        // 50ms chunk, below the minimum transcription window
        let out = session.process_chunk(&vec![0.3; 800]);
        assert_eq!(out.live_text, "");
    }

    #[test]
    fn test_transcriber_failure_degrades() {
        let transcriber = MockTranscriber::with_script(vec!["stable phrase here"]);
        let caps = Capabilities {
            transcriber: Arc::new(transcriber),
            ..capabilities(MockTranscriber::new(""))
        };
        let mut session = Session::new(config(), caps, profile());

        let good = session.process_chunk(&speech_chunk());
        assert_eq!(good.translation, "[hi] stable phrase here");

        // Swap in a failing transcriber mid-stream via a new session is not
        // possible; instead verify the degrade path with a failing stack.
        let failing = Capabilities {
            transcriber: Arc::new(MockTranscriber::new("x").with_failure()),
            ..capabilities(MockTranscriber::new(""))
        };
        let mut failing_session = Session::new(config(), failing, profile());
        failing_session.last_live = "previous live".to_string();
        failing_session.last_translation = "previous translation".to_string();

        let out = failing_session.process_chunk(&speech_chunk());
        assert_eq!(out.live_text, "previous live");
        assert_eq!(out.translation, "previous translation");
        assert!(out.audio.is_none());
    }

    #[test]
    fn test_translator_failure_keeps_session_live() {
        let caps = Capabilities {
            translator: Arc::new(MockTranslator::new().with_failure()),
            ..capabilities(MockTranscriber::new("hello there friend"))
        };
        let mut session = Session::new(config(), caps, profile());

        let out = session.process_chunk(&speech_chunk());
        // Live text still advanced (transcription succeeded before failure)
        assert_eq!(out.live_text, "hello there friend");
        assert_eq!(out.translation, "");
        assert!(out.audio.is_none());

        // Session remains usable afterwards
        let out2 = session.process_chunk(&speech_chunk());
        assert_eq!(out2.live_text, "hello there friend");
    }

    #[test]
    fn test_translator_recovery_retries_dropped_phrase() {
        let caps = Capabilities {
            translator: Arc::new(MockTranslator::new().with_failures(1)),
            ..capabilities(MockTranscriber::with_script(vec![
                "hello there friend",
                "hello there friend nice to meet you",
            ]))
        };
        let mut session = Session::new(config(), caps, profile());

        // Failed tick: the phrase must not be marked as sent
        let first = session.process_chunk(&speech_chunk());
        assert_eq!(first.translation, "");
        assert!(first.audio.is_none());
        assert_eq!(session.committed_history(), "");

        // Once the translator recovers it gets the dropped words back,
        // not just the extension
        let second = session.process_chunk(&speech_chunk());
        assert_eq!(
            second.translation,
            "[hi] hello there friend nice to meet you"
        );
        assert_eq!(
            session.committed_history(),
            "hello there friend nice to meet you"
        );
    }

    #[test]
    fn test_synthesis_failure_rolls_back_commit_state() {
        let caps = Capabilities {
            synthesizer: Arc::new(MockSynthesizer::new().with_failure()),
            ..capabilities(MockTranscriber::new("hello there friend"))
        };
        let mut session = Session::new(config(), caps, profile());

        let out = session.process_chunk(&speech_chunk());
        assert_eq!(out.live_text, "hello there friend");
        assert_eq!(out.translation, "");
        assert!(out.audio.is_none());
        assert_eq!(session.committed_history(), "");
    }

    #[test]
    fn test_emotion_failure_downgrades_to_no_label() {
        let caps = Capabilities {
            emotion: Arc::new(MockEmotionDetector::new(Emotion::Joy).with_failure()),
            ..capabilities(MockTranscriber::new("hello there friend"))
        };
        let mut session = Session::new(config(), caps, profile());

        let out = session.process_chunk(&speech_chunk());
        // Translation still runs, without an emotion marker
        assert_eq!(out.translation, "[hi] hello there friend");
    }

    #[test]
    fn test_emotion_label_reaches_translator() {
        let caps = Capabilities {
            emotion: Arc::new(MockEmotionDetector::new(Emotion::Joy)),
            ..capabilities(MockTranscriber::new("hello there friend"))
        };
        let mut session = Session::new(config(), caps, profile());

        let out = session.process_chunk(&speech_chunk());
        assert_eq!(out.translation, "[hi:joy] hello there friend");
    }

    #[test]
    fn test_emotion_aware_disabled() {
        let caps = Capabilities {
            emotion: Arc::new(MockEmotionDetector::new(Emotion::Joy)),
            ..capabilities(MockTranscriber::new("hello there friend"))
        };
        let mut config = config();
        config.emotion_aware = false;
        let mut session = Session::new(config, caps, profile());

        let out = session.process_chunk(&speech_chunk());
        assert_eq!(out.translation, "[hi] hello there friend");
    }

    #[test]
    fn test_long_silence_resets_buffer_but_not_committer() {
        let mut cfg = config();
        cfg.silence_duration = Duration::from_millis(30);
        let mut session = Session::new(
            cfg,
            capabilities(MockTranscriber::new("hello there friend")),
            profile(),
        );

        session.process_chunk(&speech_chunk());
        assert_eq!(session.committed_history(), "hello there friend");

        // A silent chunk after the silence budget expires triggers the reset
        std::thread::sleep(Duration::from_millis(50));
        session.process_chunk(&silent_chunk());
        assert_eq!(session.buffered_samples(), 0);
        // Logical transcript state survives
        assert_eq!(session.committed_history(), "hello there friend");
        assert_eq!(session.live_text(), "hello there friend");
    }

    #[test]
    fn test_flush_on_silence_commits_pending_words() {
        let mut cfg = config();
        cfg.min_commit_words = 10;
        cfg.flush_on_silence = true;
        cfg.silence_duration = Duration::from_millis(30);

        let mut session = Session::new(
            cfg,
            capabilities(MockTranscriber::new("short trailing phrase")),
            profile(),
        );

        // Three words < 10 → pending, not committed
        let out = session.process_chunk(&speech_chunk());
        assert_eq!(out.translation, "");

        // Long silence force-commits the pending delta
        std::thread::sleep(Duration::from_millis(50));
        let out = session.process_chunk(&silent_chunk());
        assert_eq!(out.translation, "[hi] short trailing phrase");
        assert!(out.audio.is_some());
        assert_eq!(session.committed_history(), "short trailing phrase");
    }

    #[test]
    fn test_no_flush_on_silence_by_default() {
        let mut cfg = config();
        cfg.min_commit_words = 10;
        cfg.silence_duration = Duration::from_millis(30);

        let mut session = Session::new(
            cfg,
            capabilities(MockTranscriber::new("short trailing phrase")),
            profile(),
        );

        session.process_chunk(&speech_chunk());
        std::thread::sleep(Duration::from_millis(50));
        let out = session.process_chunk(&silent_chunk());
        assert_eq!(out.translation, "");
        assert_eq!(session.committed_history(), "");
    }

    #[test]
    fn test_transcript_rewrite_resyncs_without_corruption() {
        let transcriber = MockTranscriber::with_script(vec![
            "we will meet at noon",
            "he will greet the crowd today", // rewrite of committed history
            "he will greet the crowd today and speak",
        ]);
        let mut session = Session::new(config(), capabilities(transcriber), profile());

        let first = session.process_chunk(&speech_chunk());
        assert_eq!(first.translation, "[hi] we will meet at noon");

        // Rewrite tick: no phrase, no translation update
        let second = session.process_chunk(&speech_chunk());
        assert_eq!(second.translation, "[hi] we will meet at noon");
        assert!(second.audio.is_none());

        // Re-synced: the full rewritten transcript commits fresh
        let third = session.process_chunk(&speech_chunk());
        assert_eq!(
            third.translation,
            "[hi] he will greet the crowd today and speak"
        );
    }

    #[test]
    fn test_idle_for_tracks_ticks() {
        let mut session = Session::new(
            config(),
            capabilities(MockTranscriber::new("")),
            profile(),
        );
        session.process_chunk(&silent_chunk());
        assert!(session.idle_for() < Duration::from_secs(1));
    }
}
