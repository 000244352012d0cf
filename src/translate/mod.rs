//! Translation side: delta extraction over the committed history, the
//! external translator capability, and optional emotion detection.

pub mod delta;
pub mod emotion;
pub mod translator;

pub use delta::TranslationDeltaBuffer;
pub use emotion::{Emotion, EmotionDetector, MockEmotionDetector, NullEmotionDetector};
pub use translator::{MockTranslator, Translator};
