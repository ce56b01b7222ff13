use axum::http::HeaderMap;

use super::claims::ClaimSet;
use super::error::AuthError;
use super::header::extract_token;
use super::jwks::{JwksCache, SigningKey};
use super::permissions::check_permission;
use super::verifier::{TokenVerifier, key_id};

/// Bearer-token authorization against the provider's key set.
///
/// One instance is shared by every request (behind `Arc` in `AppState`);
/// the only state it carries across requests is the key-set cache.
pub struct AuthService {
    keys: JwksCache,
    verifier: TokenVerifier,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("keys", &self.keys)
            .field("verifier", &self.verifier)
            .finish()
    }
}

impl AuthService {
    pub fn new(keys: JwksCache, verifier: TokenVerifier) -> Self {
        Self { keys, verifier }
    }

    /// Full pipeline: header → key → signature/claims → permission.
    ///
    /// Stops at the first failure; on success the verified claims belong
    /// to this request only.
    pub async fn authorize(
        &self,
        headers: &HeaderMap,
        permission: &str,
    ) -> Result<ClaimSet, AuthError> {
        let token = extract_token(headers)?;
        let key = self.resolve_key(token).await?;
        let claims = self.verify(token, &key)?;
        check_permission(&claims, permission)?;
        Ok(claims)
    }

    pub async fn resolve_key(&self, token: &str) -> Result<SigningKey, AuthError> {
        let kid = key_id(token)?;
        self.keys.key_for(&kid).await
    }

    pub fn verify(&self, token: &str, key: &SigningKey) -> Result<ClaimSet, AuthError> {
        self.verifier.verify(token, key)
    }

    pub fn keys(&self) -> &JwksCache {
        &self.keys
    }
}
