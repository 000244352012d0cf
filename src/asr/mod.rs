//! Speech recognition side: the external transcriber capability and the
//! phrase committer that stabilizes its output.

pub mod committer;
pub mod transcriber;

pub use committer::PhraseCommitter;
pub use transcriber::{MockTranscriber, Transcriber};
