//! Route handler functions for all API endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use relay_chat::SessionHint;
use relay_core::text;
use relay_core::types::Message;

use crate::error::ApiError;
use crate::session::session_cookie;
use crate::state::AppState;

// =============================================================================
// Request / response types
// =============================================================================

/// Body of `POST /api/chat`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesParams {
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessagesResponse {
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub provider: String,
    pub total_messages: u64,
}

// =============================================================================
// Chat endpoints
// =============================================================================

/// POST /api/chat - store a user message and the assistant's reply.
///
/// A body that is not valid JSON of the expected shape gets the same 400 as
/// a message that fails validation.
pub async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<MessagesResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        debug!(error = %rejection, "Rejected chat body");
        ApiError::invalid_request()
    })?;

    let hint = SessionHint::from_body(request.session_id)
        .with_cookie(session_cookie(&headers, &state.config.session.cookie_name));

    let exchange = state
        .orchestrator
        .handle_message(&request.message, &hint)
        .await?;

    Ok(Json(MessagesResponse {
        messages: exchange.into_messages(),
    }))
}

/// GET /api/messages - the full transcript of one session.
pub async fn messages(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<MessagesParams>,
) -> Result<Json<MessagesResponse>, ApiError> {
    let hint = SessionHint::from_query(params.session_id)
        .with_cookie(session_cookie(&headers, &state.config.session.cookie_name));

    let messages = state.orchestrator.history(&hint).await.map_err(|e| {
        error!(error = %e, "Failed to load messages");
        ApiError::Internal(text::FETCH_FAILED.to_string())
    })?;

    Ok(Json(MessagesResponse { messages }))
}

// =============================================================================
// Health
// =============================================================================

/// GET /health - liveness plus a few counters.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let total_messages = state.store.len().await.unwrap_or(0) as u64;

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        provider: state.orchestrator.provider_name().to_string(),
        total_messages,
    })
}
