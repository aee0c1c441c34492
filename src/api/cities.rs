//! City listing and detail.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::data::cities;

async fn list_cities() -> impl IntoResponse {
    Json(cities::all())
}

async fn get_city(Path(city_id): Path<String>) -> impl IntoResponse {
    match cities::city(&city_id) {
        Some(city) => Json(city).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "City not found"})),
        )
            .into_response(),
    }
}

pub fn city_routes() -> Router {
    Router::new()
        .route("/api/cities", get(list_cities))
        .route("/api/cities/", get(list_cities))
        .route("/api/cities/{city_id}", get(get_city))
}
