/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - 認可が必要な route は require_auth(route, auth, permission) で包む
 */
use axum::{Router, routing::get};

use crate::error::AppError;
use crate::middleware::auth::require_auth;
use crate::state::AppState;

use crate::api::v1::handlers::{
    health::health,
    me::{check_permission, me},
};

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/me", require_auth(get(me), &state.auth, ""))
        .route(
            "/me/permissions/{permission}",
            require_auth(get(check_permission), &state.auth, ""),
        )
        .method_not_allowed_fallback(|| async { AppError::MethodNotAllowed })
}
