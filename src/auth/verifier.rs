use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use tracing::{debug, warn};

use super::{AuthError, Claims, KeySource, RemoteJwks};
use crate::config::{AuthConfig, ConfigError};

/// Pull the token out of an `Authorization: Bearer <token>` header value
pub fn extract_bearer(header: Option<&HeaderValue>) -> Result<String, AuthError> {
    let header = header.ok_or(AuthError::MissingToken)?;
    let value = header
        .to_str()
        .map_err(|_| AuthError::MalformedHeader(AuthError::NOT_BEARER))?;

    let parts: Vec<&str> = value.split_whitespace().collect();
    match parts.as_slice() {
        [scheme, ..] if !scheme.eq_ignore_ascii_case("bearer") => {
            Err(AuthError::MalformedHeader(AuthError::NOT_BEARER))
        }
        [] => Err(AuthError::MalformedHeader(AuthError::NOT_BEARER)),
        [_] => Err(AuthError::MalformedHeader(AuthError::TOKEN_NOT_FOUND)),
        [_, token] => Ok(token.to_string()),
        _ => Err(AuthError::MalformedHeader(AuthError::TOO_MANY_PARTS)),
    }
}

/// Checks signature and standard claims of bearer tokens against the
/// issuer's key set
pub struct TokenVerifier {
    keys: Arc<dyn KeySource>,
    issuer: String,
    audience: String,
    algorithms: Vec<Algorithm>,
}

impl TokenVerifier {
    pub fn new(keys: Arc<dyn KeySource>, issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            keys,
            issuer: issuer.into(),
            audience: audience.into(),
            algorithms: vec![Algorithm::RS256],
        }
    }

    pub fn with_algorithms(mut self, algorithms: Vec<Algorithm>) -> Self {
        self.algorithms = algorithms;
        self
    }

    /// Verifier using the provider's published JWKS
    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigError> {
        let jwks = RemoteJwks::new(config.jwks_url()?, Duration::from_secs(config.jwks_cache_ttl_secs))
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self::new(Arc::new(jwks), config.issuer(), config.audience.clone())
            .with_algorithms(config.algorithms.clone()))
    }

    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|e| {
            debug!("Unparseable token header: {}", e);
            AuthError::UnparseableToken
        })?;

        if !self.algorithms.contains(&header.alg) {
            warn!("Rejected token signed with {:?}", header.alg);
            return Err(AuthError::MalformedHeader(AuthError::ALGORITHM_REJECTED));
        }

        let kid = header
            .kid
            .as_deref()
            .ok_or(AuthError::MalformedHeader(AuthError::MISSING_KID))?;
        let key = self.decoding_key(kid).await?;

        let mut validation = Validation::new(header.alg);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);

        let data = decode::<Claims>(token, &key, &validation).map_err(|e| {
            let err = match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                ErrorKind::InvalidIssuer
                | ErrorKind::InvalidAudience
                | ErrorKind::ImmatureSignature
                | ErrorKind::MissingRequiredClaim(_) => AuthError::WrongIssuerOrAudience,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::UnparseableToken,
            };
            warn!("Token rejected: {}", e);
            err
        })?;

        Ok(data.claims)
    }

    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        let keys = self.keys.keys().await?;
        let jwk = match keys.find(kid) {
            Some(jwk) => jwk.clone(),
            None => {
                debug!("Key {} not in cached set, refreshing", kid);
                let refreshed = self.keys.refresh().await?;
                refreshed.find(kid).cloned().ok_or(AuthError::KeyNotFound)?
            }
        };

        DecodingKey::from_jwk(&jwk).map_err(|e| {
            warn!("Key {} cannot be used for verification: {}", kid, e);
            AuthError::KeyNotFound
        })
    }
}
