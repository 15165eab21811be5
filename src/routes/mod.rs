use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    models::MovieRecord,
    state::AppState,
};

pub mod analyze;
pub mod recommend;

/// Response shape shared by every recommendation endpoint.
#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub mood: String,
    pub recommendations: Vec<MovieRecord>,
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/", get(index))
        .route("/analyze", post(analyze::analyze))
        .route("/recommend", post(recommend::recommend))
        .route("/api/recommend", get(recommend::api_recommend))
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Single-page capture UI; frames are grabbed client-side and posted
/// to `/analyze`.
async fn index() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
