//! Chat endpoint: message in, generated tour out.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;
use tracing::error;

use super::AppState;

fn default_city() -> String {
    "nyc".to_string()
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default = "default_city")]
    pub city: String,
    #[serde(default)]
    pub preferences: Option<Value>,
}

/// POST /api/chat
///
/// Runs the tour pipeline. A narrative failure is the only pipeline error
/// and maps to 502.
async fn chat(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> impl IntoResponse {
    if req.message.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "message must not be empty"})),
        )
            .into_response();
    }

    match state
        .agent
        .run(&req.message, &req.city, req.preferences.as_ref())
        .await
    {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            error!(error = %e, city = %req.city, "Tour generation failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({"error": e.to_string()})),
            )
                .into_response()
        }
    }
}

pub fn chat_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/chat/", post(chat))
        .with_state(state)
}
