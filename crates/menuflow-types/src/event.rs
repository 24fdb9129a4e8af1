//! Session lifecycle events published by the engine.
//!
//! After every in-memory commit the engine publishes one of these on its
//! event bus. The optional persistence adapter subscribes and records them;
//! the engine never awaits delivery.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A committed change to a user's session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A transition committed: the session moved to (or re-rendered) `step_id`.
    Committed {
        user_id: String,
        step_id: String,
        /// Snapshot of the answers map at commit time.
        answers: HashMap<String, String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        intent: Option<String>,
        timestamp: DateTime<Utc>,
    },
    /// The session was discarded and re-seeded at the start step.
    Reset {
        user_id: String,
        timestamp: DateTime<Utc>,
    },
}

impl SessionEvent {
    /// The user the event concerns.
    pub fn user_id(&self) -> &str {
        match self {
            SessionEvent::Committed { user_id, .. } | SessionEvent::Reset { user_id, .. } => {
                user_id
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
