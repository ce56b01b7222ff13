/*
 * Responsibility
 * - GET /me : 検証済みトークンの claims をそのまま返す
 * - GET /me/permissions/{permission} : その permission を持っているか
 * - どちらも require_auth("") の内側 (有効なトークン + permissions claim が必要)
 */
use axum::{Json, extract::Path};

use crate::api::v1::{
    dto::me::{MeResponse, PermissionCheckResponse},
    extractors::AuthCtxExtractor,
};

pub async fn me(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<MeResponse> {
    Json(MeResponse {
        success: true,
        sub: ctx.subject,
        permissions: ctx.permissions,
        expires_at: ctx.expires_at,
        claims: ctx.claims,
    })
}

pub async fn check_permission(
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Path(permission): Path<String>,
) -> Json<PermissionCheckResponse> {
    let granted = ctx.has_permission(&permission);

    Json(PermissionCheckResponse {
        success: true,
        permission,
        granted,
    })
}
