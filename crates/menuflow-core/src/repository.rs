//! Session-log repository trait definition.
//!
//! Defines the storage interface for committed session events. The
//! infrastructure layer (menuflow-infra) implements this trait with SQLite
//! persistence; the engine itself never calls it -- a writer task drains the
//! event bus into it.
//!
//! Uses native async fn in traits (Rust 2024 edition, no async_trait macro).

use menuflow_types::error::RepositoryError;
use menuflow_types::event::SessionEvent;

/// Repository for the append-only session transition log.
pub trait SessionLogRepository: Send + Sync {
    /// Persist one committed event.
    fn record_event(
        &self,
        event: &SessionEvent,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Most recent events for a user, newest first.
    fn recent_events(
        &self,
        user_id: &str,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<SessionEvent>, RepositoryError>> + Send;

    /// Total number of logged events and distinct users, for status display.
    fn stats(
        &self,
    ) -> impl std::future::Future<Output = Result<(u64, u64), RepositoryError>> + Send;
}
