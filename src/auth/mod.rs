pub mod jwks;
pub mod permissions;
pub mod verifier;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub use jwks::{KeySource, RemoteJwks, StaticKeys};
pub use permissions::check_permission;
pub use verifier::{extract_bearer, TokenVerifier};

/// Verified token payload, kept as the raw claim object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(pub Map<String, Value>);

impl Claims {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn subject(&self) -> Option<&str> {
        self.get("sub").and_then(Value::as_str)
    }
}

/// Failures of token verification and permission checks.
///
/// Each variant carries the status, machine code and description reported
/// in the error envelope; the description is the `Display` text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Authorization header is expected.")]
    MissingToken,

    #[error("{0}")]
    MalformedHeader(&'static str),

    #[error("Unable to parse authentication token.")]
    UnparseableToken,

    #[error("Token expired.")]
    ExpiredToken,

    #[error("Incorrect claims. Please, check the audience and issuer.")]
    WrongIssuerOrAudience,

    #[error("Token signature could not be verified.")]
    InvalidSignature,

    #[error("Unable to find the appropriate key.")]
    KeyNotFound,

    #[error("Signing keys could not be retrieved.")]
    KeySetUnavailable,

    #[error("Permissions not included in JWT.")]
    PermissionsClaimMissing,

    #[error("Permission not found.")]
    PermissionDenied,
}

impl AuthError {
    pub const NOT_BEARER: &'static str = "Authorization header must start with \"Bearer\".";
    pub const TOKEN_NOT_FOUND: &'static str = "Token not found.";
    pub const TOO_MANY_PARTS: &'static str = "Authorization header must be bearer token.";
    pub const MISSING_KID: &'static str = "Authorization malformed.";
    pub const ALGORITHM_REJECTED: &'static str = "Token algorithm is not accepted.";

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::UnparseableToken
            | AuthError::KeyNotFound
            | AuthError::PermissionsClaimMissing => StatusCode::BAD_REQUEST,
            AuthError::PermissionDenied => StatusCode::FORBIDDEN,
            AuthError::KeySetUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "authorization_header_missing",
            AuthError::MalformedHeader(_) | AuthError::UnparseableToken | AuthError::KeyNotFound => {
                "invalid_header"
            }
            AuthError::ExpiredToken => "token_expired",
            AuthError::WrongIssuerOrAudience | AuthError::PermissionsClaimMissing => "invalid_claims",
            AuthError::InvalidSignature => "invalid_token",
            AuthError::KeySetUnavailable => "jwks_unavailable",
            AuthError::PermissionDenied => "unauthorized",
        }
    }
}
