//! AstroVision gateway: the chat relay endpoint plus JSON/CSV feed projections.

mod handlers;

use astrovision_core::AstroConfig;
use axum::{body::Body, http::Request, middleware::Next, response::Response, routing::get, routing::post, Router};
use handlers::AppState;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AstroConfig::load()?;
    if config.completion_api_key().is_none() {
        tracing::warn!(target: "astrovision::gateway", "OPENAI_API_KEY is not set; /api/chat will answer 500");
    }
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::from_config(config));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(target: "astrovision::gateway", addr = %bind_addr, version = astrovision_core::version(), "gateway listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(handlers::chat::relay))
        .route("/api/feeds/iss", get(handlers::feeds::iss))
        .route("/api/feeds/launches", get(handlers::feeds::launches))
        .route("/api/feeds/space-weather", get(handlers::feeds::space_weather))
        .route("/api/feeds/asteroids", get(handlers::feeds::asteroids))
        .route("/api/feeds/asteroids.csv", get(handlers::feeds::asteroids_csv))
        .route("/api/feeds/news", get(handlers::feeds::news))
        .with_state(state)
        .layer(axum::middleware::from_fn(log_requests))
}

async fn log_requests(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();
    let response = next.run(request).await;
    tracing::info!(
        target: "astrovision::gateway",
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    response
}

async fn health() -> &'static str {
    "OK"
}
