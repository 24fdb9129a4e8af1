//! Per-user session state.
//!
//! A `Session` records a user's position in the flow graph, the answers
//! captured so far, the session intent, and an append-only input history.
//! Sessions are created lazily by the session store and live in process
//! memory; durability is an optional collaborator's concern.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mutable per-user progress through a flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Channel-specific user identifier (e.g. a phone number).
    pub user_id: String,
    /// The step the user is currently positioned at.
    pub current_step_id: String,
    /// Recorded answers keyed by step `store_key`. Last write wins.
    pub answers: HashMap<String, String>,
    /// High-level tag summarizing the user's declared goal. Set at most once
    /// by a step's `default_intent`; overwritten by an explicit intent-tagged
    /// button choice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    /// Append-only input log, for observability only. The transition
    /// algorithm never reads it back.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<HistoryEntry>,
    /// When this session was created (or last reset).
    pub started_at: DateTime<Utc>,
}

/// One recorded input in a session's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Step the input was received at.
    pub step_id: String,
    /// The raw message text, verbatim.
    pub input: String,
    /// When the input was recorded.
    pub timestamp: DateTime<Utc>,
}

impl Session {
    /// Create a fresh session positioned at the given start step.
    pub fn new(user_id: impl Into<String>, start_step_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            current_step_id: start_step_id.into(),
            answers: HashMap::new(),
            intent: None,
            history: Vec::new(),
            started_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
