//! HTTP surface: health, chat, cities and tour templates.

pub mod chat;
pub mod cities;
pub mod tours;

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::config::DEFAULT_FRONTEND_URL;
use crate::tour::TourAgent;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<TourAgent>,
}

/// Build the full router.
pub fn router(agent: Arc<TourAgent>) -> Router {
    let state = AppState { agent };

    Router::new()
        .route("/health", get(health))
        .merge(chat::chat_routes(state))
        .merge(cities::city_routes())
        .merge(tours::tour_routes())
}

/// CORS for the frontend origin plus the local dev server.
pub fn cors_layer(frontend_url: &str) -> CorsLayer {
    let mut origins = Vec::new();
    for origin in [frontend_url, DEFAULT_FRONTEND_URL] {
        match origin.parse::<HeaderValue>() {
            Ok(value) if !origins.contains(&value) => origins.push(value),
            Ok(_) => {}
            Err(e) => warn!(origin, error = %e, "Ignoring invalid CORS origin"),
        }
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "geo-explore"
    }))
}
