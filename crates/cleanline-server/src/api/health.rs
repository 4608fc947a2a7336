//! Liveness/readiness probe.

use crate::api::AppState;
use crate::db;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match db::health_check(&state.db).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok", "database": "up" }))),
        Err(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "degraded", "database": "down", "error": err.to_string() })),
        ),
    }
}
