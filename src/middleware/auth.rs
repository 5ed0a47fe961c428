use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::auth::{check_permission, extract_bearer, TokenVerifier};
use crate::error::ApiError;

/// State of one guarded route: the verifier and the permission it demands
#[derive(Clone)]
pub struct PermissionGuard {
    verifier: Arc<TokenVerifier>,
    permission: &'static str,
}

impl PermissionGuard {
    pub fn new(verifier: Arc<TokenVerifier>, permission: &'static str) -> Self {
        Self { verifier, permission }
    }
}

/// Middleware that verifies the bearer token, checks the route's permission
/// and injects the verified [`Claims`](crate::auth::Claims) into the request
pub async fn require_permission(
    State(guard): State<PermissionGuard>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(request.headers().get(AUTHORIZATION)).map_err(|e| {
        tracing::warn!("{} {}: {}", request.method(), request.uri().path(), e);
        e
    })?;

    let claims = guard.verifier.verify(&token).await?;

    if let Err(e) = check_permission(&claims, guard.permission) {
        tracing::warn!(
            "Subject {} lacks '{}': {}",
            claims.subject().unwrap_or("<unknown>"),
            guard.permission,
            e
        );
        return Err(e.into());
    }

    tracing::debug!(
        "Granted '{}' to {}",
        guard.permission,
        claims.subject().unwrap_or("<unknown>")
    );
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}
