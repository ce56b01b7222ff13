/*
 * Responsibility
 * - /me 系 response DTO
 */
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::services::auth::ClaimSet;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub success: bool,
    pub sub: Option<String>,
    pub permissions: Vec<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub claims: ClaimSet,
}

#[derive(Debug, Serialize)]
pub struct PermissionCheckResponse {
    pub success: bool,
    pub permission: String,
    pub granted: bool,
}
