//! In-memory session store keyed by user identifier.
//!
//! A plain keyed container over `DashMap`, not a concurrency primitive: the
//! engine assumes at most one in-flight transition per user ID. Different
//! user IDs are fully independent and may be processed in parallel.

use dashmap::DashMap;
use dashmap::mapref::one::RefMut;
use menuflow_types::session::Session;

/// Maps user IDs to their sessions, creating lazily at the start step.
pub struct SessionStore {
    sessions: DashMap<String, Session>,
    start_step_id: String,
}

impl SessionStore {
    /// Create an empty store seeding new sessions at `start_step_id`.
    pub fn new(start_step_id: impl Into<String>) -> Self {
        Self {
            sessions: DashMap::new(),
            start_step_id: start_step_id.into(),
        }
    }

    /// Return the session for `user_id`, creating a fresh one at the start
    /// step on first contact.
    pub fn get_or_create(&self, user_id: &str) -> RefMut<'_, String, Session> {
        self.sessions
            .entry(user_id.to_string())
            .or_insert_with(|| Session::new(user_id, &self.start_step_id))
    }

    /// Discard any session for `user_id`. Idempotent: resetting a
    /// non-existent session is a no-op.
    pub fn reset(&self, user_id: &str) {
        self.sessions.remove(user_id);
    }

    /// Read-only snapshot of a session, for observability. Never mutates.
    pub fn peek(&self, user_id: &str) -> Option<Session> {
        self.sessions.get(user_id).map(|entry| entry.value().clone())
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the store holds no sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// All user IDs with a live session, unordered.
    pub fn user_ids(&self) -> Vec<String> {
        self.sessions.iter().map(|e| e.key().clone()).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
