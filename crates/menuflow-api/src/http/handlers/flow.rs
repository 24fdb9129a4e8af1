//! Flow inspection handler.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use uuid::Uuid;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Summary of the flow this process serves.
#[derive(Debug, Serialize)]
pub struct FlowSummary {
    pub name: String,
    pub start: String,
    pub steps: usize,
    pub intents: Vec<String>,
    pub live_sessions: usize,
}

/// GET /api/v1/flow - Summary of the loaded flow definition.
pub async fn get_flow(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<FlowSummary>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let flow = state.engine.flow();
    let mut intents: Vec<String> = flow.intents().iter().cloned().collect();
    intents.sort();

    let summary = FlowSummary {
        name: flow.name().to_string(),
        start: flow.start_id().to_string(),
        steps: flow.step_count(),
        intents,
        live_sessions: state.engine.session_count(),
    };

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(summary, request_id, elapsed)))
}
