//! Route handlers and the state they share.

pub mod chat;
pub mod feeds;

use astrovision_core::{AstroConfig, ChatCompletionClient, CompletionBackend, FeedClient};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;

pub struct AppState {
    pub config: Arc<AstroConfig>,
    pub feeds: FeedClient,
    pub completion: Arc<dyn CompletionBackend>,
}

impl AppState {
    pub fn from_config(config: AstroConfig) -> Self {
        let completion = Arc::new(ChatCompletionClient::from_config(&config));
        Self::with_backend(config, completion)
    }

    pub fn with_backend(config: AstroConfig, completion: Arc<dyn CompletionBackend>) -> Self {
        let config = Arc::new(config);
        Self {
            feeds: FeedClient::new(Arc::clone(&config)),
            config,
            completion,
        }
    }
}

/// `{ "error": message }` with the given status.
pub(crate) fn error_json(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}
