use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

// Health probes
pub fn health_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::api::root))
        .route("/health", get(handlers::api::health))
}

// API Routes - question answering and training
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/query", post(handlers::api::query))
        .route(
            "/train",
            post(handlers::api::train).get(handlers::api::training_data),
        )
        .nest(
            "/api",
            Router::new()
                // Same handler, path used by the dashboard
                .route("/generate-sql", post(handlers::api::query))
                // System status
                .route("/status", get(handlers::api::system_status)),
        )
}
