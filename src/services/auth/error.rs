//! Authorization failures.
//!
//! Every variant is terminal for the request: the middleware renders it as
//! the JSON error envelope and the guarded handler never runs.

use std::fmt;

use axum::http::StatusCode;

/// Where a token stopped being parseable.
///
/// A token whose header cannot even be read is rejected as a header
/// problem (401). Once a key has been resolved, any decode or signature
/// failure is reported as an unparsable token (400).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPhase {
    Header,
    Verification,
}

impl fmt::Display for TokenPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header => f.write_str("Authorization malformed."),
            Self::Verification => f.write_str("Unable to parse authentication token."),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Authorization header is expected.")]
    MissingHeader,

    /// Wrong scheme, missing token or too many parts.
    #[error("{0}")]
    MalformedHeader(&'static str),

    #[error("{0}")]
    MalformedToken(TokenPhase),

    #[error("Unable to find the appropriate key.")]
    KeyNotFound,

    #[error("Token expired.")]
    TokenExpired,

    #[error("Incorrect claims. Please, check the audience and issuer.")]
    InvalidClaims,

    #[error("Permissions not included in JWT.")]
    PermissionsMissing,

    #[error("Permission not found.")]
    PermissionDenied,

    #[error("Signing keys are currently unavailable.")]
    KeySetUnavailable,
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingHeader
            | Self::MalformedHeader(_)
            | Self::MalformedToken(TokenPhase::Header)
            | Self::TokenExpired
            | Self::InvalidClaims => StatusCode::UNAUTHORIZED,
            Self::MalformedToken(TokenPhase::Verification)
            | Self::KeyNotFound
            | Self::PermissionsMissing => StatusCode::BAD_REQUEST,
            // authenticated, but not permitted
            Self::PermissionDenied => StatusCode::FORBIDDEN,
            Self::KeySetUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Machine-readable code rendered next to the description.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingHeader => "authorization_header_missing",
            Self::MalformedHeader(_) | Self::MalformedToken(_) | Self::KeyNotFound => {
                "invalid_header"
            }
            Self::TokenExpired => "token_expired",
            Self::InvalidClaims | Self::PermissionsMissing => "invalid_claims",
            Self::PermissionDenied => "unauthorized",
            Self::KeySetUnavailable => "jwks_unavailable",
        }
    }

    /// Variant name, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingHeader => "MissingHeader",
            Self::MalformedHeader(_) => "MalformedHeader",
            Self::MalformedToken(_) => "MalformedToken",
            Self::KeyNotFound => "KeyNotFound",
            Self::TokenExpired => "TokenExpired",
            Self::InvalidClaims => "InvalidClaims",
            Self::PermissionsMissing => "PermissionsMissing",
            Self::PermissionDenied => "PermissionDenied",
            Self::KeySetUnavailable => "KeySetUnavailable",
        }
    }
}
