//! Chat endpoint handlers.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};
use uuid::Uuid;

use super::error::ApiError;
use super::routes::AppState;
use super::types::{ChatRequest, ChatResponse, FieldError, HealthResponse, ToolsResponse};

/// POST /api/chat - Generate a reply for the given conversation.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ChatResponse>, ApiError> {
    let request: ChatRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(error = %e, "Rejected malformed chat request");
        ApiError::Validation(vec![FieldError::new("body", e.to_string())])
    })?;

    if let Err(fields) = request.validate() {
        tracing::debug!(errors = fields.len(), "Rejected invalid chat request");
        return Err(ApiError::Validation(fields));
    }

    let chat_id = request
        .chat_id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    tracing::info!(
        chat_id = %chat_id,
        channel = %request.channel,
        user_id = ?request.user_id,
        messages = request.messages.len(),
        "Chat request"
    );

    let reply = state
        .agent
        .generate_reply(&request.messages, &request.reply_options())
        .await
        .map_err(|e| {
            tracing::error!(chat_id = %chat_id, error = %e, "Reply generation failed");
            ApiError::from(e)
        })?;

    Ok(Json(ChatResponse {
        reply: reply.text,
        chat_id,
        channel: request.channel,
        usage: reply.usage,
        finish_reason: reply.finish_reason,
        model_version: reply.model_version,
    }))
}

/// GET /health - Liveness check.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/tools - Describe registered tools.
pub async fn list_tools(State(state): State<Arc<AppState>>) -> Json<ToolsResponse> {
    Json(ToolsResponse {
        tools: state.agent.tools().list_tools(),
    })
}
