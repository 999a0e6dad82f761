//! Chat endpoint
//!
//! `POST /chat` relays a message to the completion provider;
//! `OPTIONS /chat` answers plain preflight requests.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::error::ApiError;
use crate::schemas::{ChatReply, ChatRequest};
use crate::server::state::AppState;

/// Relay a chat message
///
/// POST /chat
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection.body_text(), "Rejected chat request body");
        ApiError::InvalidRequest(rejection.body_text())
    })?;

    request
        .validate()
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

    tracing::debug!(
        content_chars = request.content.chars().count(),
        provider = ?request.provider,
        "Handling chat message"
    );

    let reply = state.relay.relay(&request.content, request.provider).await?;

    Ok(Json(reply))
}

/// Preflight for clients that send `OPTIONS` without CORS request headers
///
/// Proper CORS preflights are answered by the CORS layer before reaching
/// this handler.
///
/// OPTIONS /chat
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}
