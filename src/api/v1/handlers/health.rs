/*
 * Responsibility
 * - GET /health (疎通用)
 * - require_auth を通さない public route
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"success": true, "status": "ok"})))
}
