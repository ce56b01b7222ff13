//! `Authorization: Bearer <token>` parsing.

use axum::http::{HeaderMap, header};

use super::error::AuthError;

/// Pull the bearer token out of the request headers.
///
/// The scheme is matched case-insensitively and the value is split on
/// any run of whitespace, so exactly two parts are accepted.
pub fn extract_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?;

    let value = value.to_str().map_err(|_| {
        AuthError::MalformedHeader("Authorization header must be bearer token.")
    })?;

    let mut parts = value.split_whitespace();

    let scheme = parts.next().ok_or(AuthError::MissingHeader)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MalformedHeader(
            "Authorization header must start with \"Bearer\".",
        ));
    }

    let token = parts
        .next()
        .ok_or(AuthError::MalformedHeader("Token not found."))?;

    if parts.next().is_some() {
        return Err(AuthError::MalformedHeader(
            "Authorization header must be bearer token.",
        ));
    }

    Ok(token)
}
