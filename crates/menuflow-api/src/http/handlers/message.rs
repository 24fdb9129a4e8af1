//! Inbound message handler: the transport-facing entry to the flow engine.
//!
//! The inbound channel adapter is expected to have extracted plain text from
//! whatever envelope carried it (a button click arrives as the clicked
//! option's ID). The engine commits in memory before this handler returns;
//! delivery through the outbound adapter is spawned best-effort and cannot
//! roll the session back.

use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::extract::State;
use menuflow_core::outbound::OutboundAdapter;
use menuflow_types::response::ResponseDescriptor;
use serde::Deserialize;
use uuid::Uuid;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Body of `POST /api/v1/messages`.
#[derive(Debug, Deserialize)]
pub struct InboundMessage {
    /// Channel-specific user identifier.
    pub user_id: String,
    /// Raw message text (or clicked option ID).
    pub text: String,
}

/// POST /api/v1/messages - Process one inbound message.
///
/// Returns the engine's response descriptor in the envelope; the outbound
/// adapter delivers the same descriptor asynchronously.
pub async fn receive_message(
    State(state): State<AppState>,
    Json(inbound): Json<InboundMessage>,
) -> Result<Json<ApiResponse<ResponseDescriptor>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    if inbound.user_id.is_empty() {
        return Err(AppError::Validation("user_id must not be empty".to_string()));
    }

    let response = state.engine.handle_message(&inbound.user_id, &inbound.text);

    // Best-effort delivery: the transition is complete regardless of outcome.
    let outbound = Arc::clone(&state.outbound);
    let delivered = response.clone();
    let user_id = inbound.user_id.clone();
    tokio::spawn(async move {
        if let Err(err) = outbound.deliver(&user_id, &delivered).await {
            tracing::error!(user_id, %err, "outbound delivery failed");
        }
    });

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(response, request_id, elapsed)
        .with_link("session", &format!("/api/v1/sessions/{}", inbound.user_id));

    Ok(Json(resp))
}
