//! Session registry.
//!
//! Maps user ids to live sessions. Sessions are created lazily on first
//! reference — creation loads the user's voice profile and fails fast when
//! none exists. Each session sits behind its own mutex so ticks for one
//! user are strictly serialized while distinct users proceed in parallel.
//! Idle sessions can be evicted by the caller; nothing grows unbounded.

use crate::error::Result;
use crate::session::session::{Capabilities, Session, SessionConfig, TickOutput};
use crate::voice::store::VoiceProfileStore;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Registry of per-user streaming sessions.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, Arc<Mutex<Session>>>>,
    config: SessionConfig,
    capabilities: Capabilities,
    store: Arc<dyn VoiceProfileStore>,
}

impl SessionRegistry {
    /// Creates a registry that builds sessions from the given config,
    /// capabilities, and profile store.
    pub fn new(
        config: SessionConfig,
        capabilities: Capabilities,
        store: Arc<dyn VoiceProfileStore>,
    ) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            config,
            capabilities,
            store,
        }
    }

    /// Returns the session for a user id, creating it on first reference.
    ///
    /// Fails with `ProfileNotFound` if the user has not enrolled.
    pub fn get_or_create(&self, user_id: &str) -> Result<Arc<Mutex<Session>>> {
        {
            let sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(session) = sessions.get(user_id) {
                return Ok(session.clone());
            }
        }

        // Load outside the map lock so a slow store does not block other
        // users' lookups.
        let profile = self.store.load(user_id)?;
        let session = Arc::new(Mutex::new(Session::new(
            self.config.clone(),
            self.capabilities.clone(),
            profile,
        )));

        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        let entry = sessions
            .entry(user_id.to_string())
            .or_insert_with(|| session)
            .clone();

        tracing::debug!(user_id, total = sessions.len(), "session ready");
        Ok(entry)
    }

    /// Convenience: one pipeline tick for a user.
    ///
    /// Serializes ticks per user via the session lock, so chunks are
    /// processed in arrival order.
    pub fn process_chunk(&self, user_id: &str, chunk: &[f32]) -> Result<TickOutput> {
        let session = self.get_or_create(user_id)?;
        let mut session = session.lock().unwrap_or_else(|e| e.into_inner());
        Ok(session.process_chunk(chunk))
    }

    /// Removes the session for a user id. Returns true if one existed.
    pub fn remove(&self, user_id: &str) -> bool {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.remove(user_id).is_some()
    }

    /// Evicts sessions idle longer than `max_idle`. Returns the number
    /// removed. Sessions currently ticking are never evicted.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        let before = sessions.len();

        sessions.retain(|user_id, session| {
            // try_lock: a session mid-tick is in use, keep it
            match session.try_lock() {
                Ok(session) => {
                    let keep = session.idle_for() <= max_idle;
                    if !keep {
                        tracing::debug!(%user_id, "evicting idle session");
                    }
                    keep
                }
                Err(_) => true,
            }
        });

        before - sessions.len()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        let sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.len()
    }

    /// Returns true if no sessions are live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
