//! SQLite session-log repository implementation.
//!
//! Implements `SessionLogRepository` from `menuflow-core` using sqlx with
//! split read/write pools, and provides the writer task that drains the
//! engine's event bus into the log. Persistence is best-effort: failures are
//! logged and never reach the engine.

use chrono::{DateTime, Utc};
use menuflow_core::repository::SessionLogRepository;
use menuflow_types::error::RepositoryError;
use menuflow_types::event::SessionEvent;
use sqlx::Row;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `SessionLogRepository`.
#[derive(Clone)]
pub struct SqliteSessionLog {
    pool: DatabasePool,
}

impl SqliteSessionLog {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl SessionLogRepository for SqliteSessionLog {
    async fn record_event(&self, event: &SessionEvent) -> Result<(), RepositoryError> {
        let id = Uuid::now_v7().to_string();
        let (event_type, user_id, step_id, answers, intent, timestamp) = match event {
            SessionEvent::Committed {
                user_id,
                step_id,
                answers,
                intent,
                timestamp,
            } => {
                let answers_json = serde_json::to_string(answers)
                    .map_err(|e| RepositoryError::Query(format!("serialize answers: {e}")))?;
                (
                    "committed",
                    user_id.as_str(),
                    Some(step_id.as_str()),
                    Some(answers_json),
                    intent.as_deref(),
                    *timestamp,
                )
            }
            SessionEvent::Reset { user_id, timestamp } => {
                ("reset", user_id.as_str(), None, None, None, *timestamp)
            }
        };

        sqlx::query(
            "INSERT INTO session_log (id, user_id, event_type, step_id, answers, intent, timestamp)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(event_type)
        .bind(step_id)
        .bind(answers)
        .bind(intent)
        .bind(timestamp.to_rfc3339())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn recent_events(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<SessionEvent>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT user_id, event_type, step_id, answers, intent, timestamp
             FROM session_log WHERE user_id = ?
             ORDER BY timestamp DESC, id DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter().map(event_from_row).collect()
    }

    async fn stats(&self) -> Result<(u64, u64), RepositoryError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS events, COUNT(DISTINCT user_id) AS users FROM session_log",
        )
        .fetch_one(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let events: i64 = row
            .try_get("events")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let users: i64 = row
            .try_get("users")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok((events as u64, users as u64))
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn event_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<SessionEvent, RepositoryError> {
    let user_id: String = try_get(row, "user_id")?;
    let event_type: String = try_get(row, "event_type")?;
    let timestamp = parse_datetime(&try_get::<String>(row, "timestamp")?)?;

    match event_type.as_str() {
        "committed" => {
            let step_id: Option<String> = try_get(row, "step_id")?;
            let step_id = step_id.ok_or_else(|| {
                RepositoryError::Query("committed event missing step_id".into())
            })?;
            let answers_json: Option<String> = try_get(row, "answers")?;
            let answers = match answers_json {
                Some(json) => serde_json::from_str(&json)
                    .map_err(|e| RepositoryError::Query(format!("invalid answers JSON: {e}")))?,
                None => Default::default(),
            };
            let intent: Option<String> = try_get(row, "intent")?;
            Ok(SessionEvent::Committed {
                user_id,
                step_id,
                answers,
                intent,
                timestamp,
            })
        }
        "reset" => Ok(SessionEvent::Reset { user_id, timestamp }),
        other => Err(RepositoryError::Query(format!(
            "unknown event_type: {other}"
        ))),
    }
}

fn try_get<'r, T>(row: &'r sqlx::sqlite::SqliteRow, column: &str) -> Result<T, RepositoryError>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(column)
        .map_err(|e| RepositoryError::Query(e.to_string()))
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid timestamp: {e}")))
}

// ---------------------------------------------------------------------------
// Event bus writer task
// ---------------------------------------------------------------------------

/// Spawn a task that drains engine events into the session log.
///
/// Lagged receivers skip ahead with a warning; the task ends when the bus is
/// dropped. Write failures are logged and swallowed -- persistence is
/// best-effort by contract.
pub fn spawn_session_log_writer(
    mut rx: broadcast::Receiver<SessionEvent>,
    repo: SqliteSessionLog,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Err(err) = repo.record_event(&event).await {
                        tracing::error!(user_id = event.user_id(), %err, "failed to persist session event");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "session log writer lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
