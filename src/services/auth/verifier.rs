//! Signature and claim verification for provider-issued access tokens.
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, Validation};

use super::claims::ClaimSet;
use super::error::{AuthError, TokenPhase};
use super::jwks::SigningKey;

/// What a token must satisfy besides a valid signature.
#[derive(Debug, Clone)]
pub struct VerifierSettings {
    pub audience: String,
    pub issuer: String,
    pub algorithms: Vec<Algorithm>,
    pub leeway_seconds: u64,
}

/// Read the `kid` from the token header without checking the signature.
pub fn key_id(token: &str) -> Result<String, AuthError> {
    let header = jsonwebtoken::decode_header(token).map_err(|err| {
        tracing::debug!(error = %err, "undecodable token header");
        AuthError::MalformedToken(TokenPhase::Header)
    })?;

    header
        .kid
        .filter(|kid| !kid.is_empty())
        .ok_or(AuthError::MalformedToken(TokenPhase::Header))
}

#[derive(Debug, Clone)]
pub struct TokenVerifier {
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(settings: &VerifierSettings) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.algorithms = settings.algorithms.clone();
        validation.set_audience(&[settings.audience.as_str()]);
        validation.set_issuer(&[settings.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "aud", "iss"]);
        validation.validate_nbf = true;
        validation.leeway = settings.leeway_seconds;

        Self { validation }
    }

    /// Check signature, `aud`, `iss`, `exp` (and `nbf` when present).
    pub fn verify(&self, token: &str, key: &SigningKey) -> Result<ClaimSet, AuthError> {
        let decoding_key = key.decoding_key().map_err(|err| {
            tracing::warn!(kid = %key.kid, error = %err, "unusable signing key");
            AuthError::MalformedToken(TokenPhase::Verification)
        })?;

        let data = jsonwebtoken::decode::<ClaimSet>(token, &decoding_key, &self.validation)
            .map_err(map_jwt_error)?;

        Ok(data.claims)
    }
}

fn map_jwt_error(error: jsonwebtoken::errors::Error) -> AuthError {
    match error.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidAudience
        | ErrorKind::InvalidIssuer
        | ErrorKind::ImmatureSignature
        | ErrorKind::MissingRequiredClaim(_) => AuthError::InvalidClaims,
        _ => {
            tracing::debug!(error = %error, "token rejected");
            AuthError::MalformedToken(TokenPhase::Verification)
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_tokens::*;
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use serde_json::{Value, json};

    fn verifier() -> TokenVerifier {
        TokenVerifier::new(&VerifierSettings {
            audience: AUDIENCE.to_string(),
            issuer: ISSUER.to_string(),
            algorithms: vec![Algorithm::RS256],
            leeway_seconds: 0,
        })
    }

    fn signing_key() -> SigningKey {
        key_set().find("abc").cloned().expect("abc key")
    }

    #[test]
    fn test_key_id_reads_unverified_header() {
        let token = sign(&claims(&[]));
        assert_eq!(key_id(&token).expect("kid"), "abc");
    }

    #[test]
    fn test_key_id_missing_kid() {
        let token = sign_with(SIGNING_KEY_PEM, None, &claims(&[]));
        let err = key_id(&token).expect_err("no kid");
        assert!(matches!(err, AuthError::MalformedToken(TokenPhase::Header)));
        assert_eq!(err.status(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_key_id_garbage() {
        for token in ["", "garbage", "a.b.c", "!!!.???.###"] {
            assert!(matches!(
                key_id(token),
                Err(AuthError::MalformedToken(TokenPhase::Header))
            ));
        }
    }

    #[test]
    fn test_verify_valid_token() {
        let original = claims(&["get:widgets"]);
        let token = sign(&original);

        let verified = verifier().verify(&token, &signing_key()).expect("valid");
        assert_eq!(verified.subject(), Some("auth0|tester"));
        assert_eq!(verified.permissions(), Some(vec!["get:widgets"]));
    }

    #[test]
    fn test_verify_preserves_claims_exactly() {
        let mut original = claims(&["b:second", "a:first"]);
        original.insert(
            "https://example.com/profile".to_string(),
            json!({"name": "Ada", "roles": ["z", "a"], "n": 1.5}),
        );
        let token = sign(&original);

        let verified = verifier().verify(&token, &signing_key()).expect("valid");
        assert_eq!(
            serde_json::to_string(&verified).expect("serialize"),
            serde_json::to_string(&original).expect("serialize")
        );
    }

    #[test]
    fn test_verify_is_repeatable() {
        let token = sign(&claims(&["get:widgets"]));
        let verifier = verifier();
        let key = signing_key();

        let first = verifier.verify(&token, &key).expect("first");
        let second = verifier.verify(&token, &key).expect("second");
        assert_eq!(first, second);
    }

    #[test]
    fn test_expired_token() {
        let mut expired = claims(&[]);
        expired.insert("exp".to_string(), json!(now() - 3600));
        let token = sign(&expired);

        let err = verifier().verify(&token, &signing_key()).expect_err("expired");
        assert!(matches!(err, AuthError::TokenExpired));
        assert_eq!(err.code(), "token_expired");
    }

    #[test]
    fn test_wrong_audience_or_issuer() {
        for (claim, value) in [("aud", "other-api"), ("iss", "https://evil.example.com/")] {
            let mut bad = claims(&[]);
            bad.insert(claim.to_string(), Value::String(value.to_string()));
            let token = sign(&bad);

            let err = verifier().verify(&token, &signing_key()).expect_err(claim);
            assert!(matches!(err, AuthError::InvalidClaims), "{claim}");
        }
    }

    #[test]
    fn test_missing_audience() {
        let mut bad = claims(&[]);
        bad.remove("aud");
        let token = sign(&bad);

        let err = verifier().verify(&token, &signing_key()).expect_err("no aud");
        assert!(matches!(err, AuthError::InvalidClaims));
    }

    #[test]
    fn test_signature_from_unpublished_key() {
        let token = sign_with(ROGUE_KEY_PEM, Some("abc"), &claims(&[]));

        let err = verifier().verify(&token, &signing_key()).expect_err("rogue");
        assert!(matches!(err, AuthError::MalformedToken(TokenPhase::Verification)));
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_tampered_payload() {
        let token = sign(&claims(&["get:widgets"]));
        let parts: Vec<&str> = token.split('.').collect();

        let mut forged = claims(&["get:widgets", "delete:everything"]);
        forged.insert("sub".to_string(), json!("auth0|attacker"));
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged).expect("json"));
        let tampered = format!("{}.{}.{}", parts[0], payload, parts[2]);

        let err = verifier().verify(&tampered, &signing_key()).expect_err("tampered");
        assert!(matches!(err, AuthError::MalformedToken(TokenPhase::Verification)));
    }

    #[test]
    fn test_unsigned_token_is_rejected() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT","kid":"abc"}"#);
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims(&[])).expect("json"));
        let token = format!("{header}.{payload}.");

        assert!(verifier().verify(&token, &signing_key()).is_err());
    }

    #[test]
    fn test_algorithm_outside_allow_list() {
        let verifier = TokenVerifier::new(&VerifierSettings {
            audience: AUDIENCE.to_string(),
            issuer: ISSUER.to_string(),
            algorithms: vec![Algorithm::PS256],
            leeway_seconds: 0,
        });
        let token = sign(&claims(&[]));

        let err = verifier.verify(&token, &signing_key()).expect_err("RS256 not allowed");
        assert!(matches!(err, AuthError::MalformedToken(TokenPhase::Verification)));
    }
}
