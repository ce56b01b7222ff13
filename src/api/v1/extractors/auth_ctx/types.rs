/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - JWT 検証 / JWKS / permission チェックは middleware/services 側の責務
 * - claims はリクエストごとに作られ、どこにも共有・保存しない
 */
use chrono::{DateTime, Utc};

use crate::services::auth::{ClaimSet, check_permission};

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `subject` は provider の `sub`（例: `auth0|...`）
/// - `permissions` は `permissions` claim（なければ空）
/// - `claims` は検証済み payload そのもの
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub subject: Option<String>,
    pub permissions: Vec<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub claims: ClaimSet,
}

impl AuthCtx {
    pub fn from_claims(claims: ClaimSet) -> Self {
        Self {
            subject: claims.subject().map(str::to_string),
            permissions: claims
                .permissions()
                .unwrap_or_default()
                .into_iter()
                .map(str::to_string)
                .collect(),
            expires_at: claims.expires_at(),
            claims,
        }
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        check_permission(&self.claims, permission).is_ok()
    }
}
