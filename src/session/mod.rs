//! Per-user session orchestration: the pipeline tick, the session
//! registry, and the background session worker.

pub mod registry;
pub mod session;
pub mod worker;

pub use registry::SessionRegistry;
pub use session::{Capabilities, Session, SessionConfig, TickOutput};
pub use worker::{SessionWorker, SessionWorkerConfig, SessionWorkerHandle};
