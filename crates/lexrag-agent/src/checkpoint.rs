//! The session checkpoint store: a keyed map from `session_id` to its
//! ordered message list, serialized per key and parallel across keys.
//!
//! Grounded on `ploke-tui`'s session-keyed LLM manager state, with the
//! ordering guarantee that operations on a single key are serialized while
//! operations on distinct keys run in parallel — `dashmap::DashMap` shards
//! its internal locking by key, giving exactly that without a single global
//! mutex.

use dashmap::DashMap;
use lexrag_core::{Message, SessionState};

#[derive(Default)]
pub struct CheckpointStore {
    sessions: DashMap<String, SessionState>,
}

impl CheckpointStore {
    pub fn new() -> Self {
        Self { sessions: DashMap::new() }
    }

    /// `true` if this session id has never been checkpointed — used to
    /// decide whether a caller-supplied `history[]` should seed the frame.
    pub fn is_new(&self, session_id: &str) -> bool {
        !self.sessions.contains_key(session_id)
    }

    pub fn load(&self, session_id: &str) -> Vec<Message> {
        self.sessions.get(session_id).map(|entry| entry.messages.clone()).unwrap_or_default()
    }

    pub fn store(&self, session_id: &str, messages: Vec<Message>) {
        self.sessions.insert(session_id.to_string(), SessionState { session_id: session_id.to_string(), messages });
    }
}
