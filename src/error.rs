// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::api::ValidationError;
use crate::auth::AuthError;
use crate::database::RepositoryError;

pub const DRINK_NOT_FOUND: &str = "Drink not found.";
pub const NO_DRINKS: &str = "No drinks found.";
pub const TITLE_NOT_UNIQUE: &str = "Title is not unique.";

/// HTTP API error; every variant renders the same failure envelope
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 400 / 401 / 403 from token verification and permission checks
    Auth(AuthError),

    // 404 Not Found
    NotFound(String),

    // 405 Method Not Allowed
    MethodNotAllowed,

    // 409 Conflict
    Conflict(String),

    // 422 Unprocessable Entity (well-typed but empty or invalid value)
    UnprocessableEntity(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth(err) => err.status_code(),
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Detailed, client-safe description
    pub fn description(&self) -> Option<String> {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::UnprocessableEntity(msg)
            | ApiError::InternalServerError(msg)
            | ApiError::ServiceUnavailable(msg) => Some(msg.clone()),
            ApiError::Auth(err) => Some(err.to_string()),
            ApiError::MethodNotAllowed => None,
        }
    }

    pub fn to_json(&self) -> Value {
        let status = self.status_code();
        let mut body = json!({
            "success": false,
            "error": status.as_u16(),
            "message": status.canonical_reason().unwrap_or("Unknown Error"),
        });

        if let ApiError::Auth(err) = self {
            body["code"] = json!(err.code());
        }
        if let Some(description) = self.description() {
            body["description"] = json!(description);
        }
        body
    }

    /// Map a failed write, hiding storage internals behind `fallback`
    pub fn from_write(err: RepositoryError, fallback: &str) -> Self {
        if err.is_storage_fault() {
            tracing::error!("Drink write failed: {}", err);
            ApiError::bad_request(fallback)
        } else {
            err.into()
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn unprocessable_entity(message: impl Into<String>) -> Self {
        ApiError::UnprocessableEntity(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert other error types to ApiError
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::BadRequest(msg) => ApiError::bad_request(msg),
            ValidationError::Unprocessable(msg) => ApiError::unprocessable_entity(msg),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(_) => ApiError::not_found(DRINK_NOT_FOUND),
            RepositoryError::DuplicateTitle(_) => ApiError::conflict(TITLE_NOT_UNIQUE),
            other => {
                // Log the real error but return generic message
                tracing::error!("Drink store error: {}", other);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.status_code();
        match self.description() {
            Some(description) => write!(f, "{}: {}", status, description),
            None => write!(f, "{}", status),
        }
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_for_validation_errors() {
        let err: ApiError = ValidationError::Unprocessable("Recipe element is empty or incorrect.").into();
        assert_eq!(
            err.to_json(),
            json!({
                "success": false,
                "error": 422,
                "message": "Unprocessable Entity",
                "description": "Recipe element is empty or incorrect."
            })
        );
    }

    #[test]
    fn envelope_for_auth_errors_has_code() {
        let err: ApiError = AuthError::PermissionDenied.into();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            err.to_json(),
            json!({
                "success": false,
                "error": 403,
                "message": "Forbidden",
                "code": "unauthorized",
                "description": "Permission not found."
            })
        );

        let err: ApiError = AuthError::MissingToken.into();
        assert_eq!(err.to_json()["error"], 401);
        assert_eq!(err.to_json()["code"], "authorization_header_missing");
    }

    #[test]
    fn method_not_allowed_has_no_description() {
        let body = ApiError::MethodNotAllowed.to_json();
        assert_eq!(body["error"], 405);
        assert_eq!(body["message"], "Method Not Allowed");
        assert!(body.get("description").is_none());
    }

    #[test]
    fn storage_faults_on_writes_become_bad_requests() {
        let fault = RepositoryError::Sqlx(sqlx::Error::PoolTimedOut);
        let err = ApiError::from_write(fault, "Could not create drink.");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.description().as_deref(), Some("Could not create drink."));

        let err = ApiError::from_write(RepositoryError::DuplicateTitle("water".into()), "unused");
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let err = ApiError::from_write(RepositoryError::NotFound(9), "unused");
        assert_eq!(err.to_json()["description"], DRINK_NOT_FOUND);
    }
}
