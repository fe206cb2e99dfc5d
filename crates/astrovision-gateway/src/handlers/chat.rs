//! `POST /api/chat`: single-turn relay to the completion service.

use super::{error_json, AppState};
use astrovision_core::ValidationError;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

pub const UPSTREAM_FAILURE: &str = "Failed to fetch response from the completion service";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

/// Trimmed message, or the 400 reason.
fn validate(body: Result<Json<ChatRequest>, JsonRejection>) -> Result<String, ValidationError> {
    let Json(req) = body.map_err(|_| ValidationError::EmptyMessage)?;
    req.message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .ok_or(ValidationError::EmptyMessage)
}

pub async fn relay(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let message = match validate(body) {
        Ok(m) => m,
        Err(e) => return error_json(StatusCode::BAD_REQUEST, e.to_string()),
    };

    match state.completion.complete(&message).await {
        Ok(reply) => {
            tracing::info!(target: "astrovision::gateway", chars = reply.len(), "chat relay answered");
            Json(serde_json::json!({ "response": reply })).into_response()
        }
        Err(e) => {
            tracing::error!(target: "astrovision::gateway", error = %e, "chat relay failed");
            error_json(StatusCode::INTERNAL_SERVER_ERROR, UPSTREAM_FAILURE)
        }
    }
}
