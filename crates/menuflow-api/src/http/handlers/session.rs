//! Session observability handlers.
//!
//! Endpoints:
//! - GET /api/v1/sessions/{user_id}      - Peek a live session (read-only)
//! - GET /api/v1/sessions/{user_id}/log  - Recent persisted events

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, Query, State};
use menuflow_core::repository::SessionLogRepository;
use menuflow_types::event::SessionEvent;
use menuflow_types::session::Session;
use serde::Deserialize;
use uuid::Uuid;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Query parameters for the session log listing.
#[derive(Debug, Deserialize)]
pub struct LogQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    50
}

/// GET /api/v1/sessions/{user_id} - Peek a live session without mutating it.
pub async fn get_session(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Session>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let session = state
        .engine
        .peek_session(&user_id)
        .ok_or_else(|| AppError::NotFound(format!("no session for user '{user_id}'")))?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(session, request_id, elapsed)
        .with_link("self", &format!("/api/v1/sessions/{user_id}"))
        .with_link("log", &format!("/api/v1/sessions/{user_id}/log"));

    Ok(Json(resp))
}

/// GET /api/v1/sessions/{user_id}/log - Recent persisted events, newest first.
///
/// Returns 503 when the process runs without persistence.
pub async fn get_session_log(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<LogQuery>,
) -> Result<Json<ApiResponse<Vec<SessionEvent>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let repo = state
        .session_log
        .as_ref()
        .ok_or_else(|| AppError::Unavailable("session log persistence is disabled".to_string()))?;

    let events = repo
        .recent_events(&user_id, query.limit)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(events, request_id, elapsed)
        .with_link("session", &format!("/api/v1/sessions/{user_id}"));

    Ok(Json(resp))
}
