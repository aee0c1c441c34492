//! Tour template listing and detail.

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::data::templates;

#[derive(Debug, Deserialize)]
struct TemplateFilter {
    city: Option<String>,
}

/// GET /api/tours/templates?city=
async fn list_templates(Query(filter): Query<TemplateFilter>) -> impl IntoResponse {
    Json(templates::summaries(filter.city.as_deref()))
}

/// GET /api/tours/templates/{tour_id}
async fn get_template(Path(tour_id): Path<String>) -> impl IntoResponse {
    match templates::template(&tour_id) {
        Some(template) => Json(template).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Tour not found"})),
        )
            .into_response(),
    }
}

pub fn tour_routes() -> Router {
    Router::new()
        .route("/api/tours/templates", get(list_templates))
        .route("/api/tours/templates/{tour_id}", get(get_template))
}
