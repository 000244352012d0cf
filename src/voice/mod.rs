//! Voice identity: speaker profiles, their persistence, and enrollment.

pub mod enroll;
pub mod profile;
pub mod store;

pub use enroll::{Enroller, MockSpeakerEncoder, SpeakerEncoder};
pub use profile::VoiceProfile;
pub use store::{FsProfileStore, MemoryProfileStore, VoiceProfileStore};
