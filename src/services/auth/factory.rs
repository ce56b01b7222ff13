/// Factory: build `AuthService` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::AuthService;
use crate::services::auth::jwks::{HttpKeySource, JwksCache, KeySetError};
use crate::services::auth::verifier::{TokenVerifier, VerifierSettings};

pub fn build_auth_service(config: &Config) -> Result<Arc<AuthService>, KeySetError> {
    let source = HttpKeySource::new(config.jwks_url.clone(), config.jwks_fetch_timeout)?;
    let keys = JwksCache::new(Arc::new(source), config.jwks_min_refresh_interval);

    let verifier = TokenVerifier::new(&VerifierSettings {
        audience: config.api_audience.clone(),
        issuer: config.auth_issuer(),
        algorithms: config.auth_algorithms.clone(),
        leeway_seconds: config.access_token_leeway_seconds,
    });

    Ok(Arc::new(AuthService::new(keys, verifier)))
}
