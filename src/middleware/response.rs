use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

/// Wrapper for API responses that adds `"success": true` to the body.
///
/// `T` must serialize to a JSON object; its fields sit next to `success`.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with 200 status
    pub fn success(data: T) -> Self {
        Self { data }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let mut envelope = match serde_json::to_value(&self.data) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                tracing::error!("Response data is not a JSON object: {}", other);
                return internal_error();
            }
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return internal_error();
            }
        };
        envelope.insert("success".to_string(), Value::Bool(true));

        (StatusCode::OK, Json(Value::Object(envelope))).into_response()
    }
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "error": 500,
            "message": "Internal Server Error"
        })),
    )
        .into_response()
}

// Convenience type alias
pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
