use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::context::AppContext;
use crate::error::ApiError;

/// GET /health - public liveness probe including the store
pub async fn health(State(ctx): State<AppContext>) -> Response {
    let now = chrono::Utc::now();

    match ctx.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            ApiError::service_unavailable("Database unavailable").into_response()
        }
    }
}

/// Router fallback for unknown paths
pub async fn not_found() -> ApiError {
    ApiError::not_found("The requested URL was not found on the server.")
}

/// Rewrites axum's bare 405 into the standard error envelope
pub async fn method_not_allowed(response: Response) -> Response {
    if response.status() == StatusCode::METHOD_NOT_ALLOWED {
        let allow = response.headers().get(axum::http::header::ALLOW).cloned();
        let mut rewritten = ApiError::MethodNotAllowed.into_response();
        if let Some(allow) = allow {
            rewritten.headers_mut().insert(axum::http::header::ALLOW, allow);
        }
        return rewritten;
    }
    response
}
