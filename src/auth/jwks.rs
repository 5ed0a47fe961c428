use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use url::Url;

use super::AuthError;

/// Supplies the signing keys tokens are verified against
#[async_trait]
pub trait KeySource: Send + Sync {
    /// Current key set, possibly cached
    async fn keys(&self) -> Result<Arc<JwkSet>, AuthError>;

    /// Called when a token names a key the current set does not have
    async fn refresh(&self) -> Result<Arc<JwkSet>, AuthError> {
        self.keys().await
    }
}

/// Fixed key set, for tests and deployments with pinned keys
pub struct StaticKeys(Arc<JwkSet>);

impl StaticKeys {
    pub fn new(keys: JwkSet) -> Self {
        Self(Arc::new(keys))
    }
}

#[async_trait]
impl KeySource for StaticKeys {
    async fn keys(&self) -> Result<Arc<JwkSet>, AuthError> {
        Ok(self.0.clone())
    }
}

struct CachedKeys {
    keys: Arc<JwkSet>,
    fetched_at: Instant,
}

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// JWKS published by the identity provider, fetched over HTTP and cached.
///
/// A refresh triggered by an unknown `kid` is skipped when the cache is
/// younger than `min_refresh_interval`, so tokens with made-up key ids
/// cannot make us hammer the provider. Fetches run under the cache write
/// lock and are bounded by `fetch_timeout`.
pub struct RemoteJwks {
    url: Url,
    client: reqwest::Client,
    ttl: Duration,
    min_refresh_interval: Duration,
    fetch_timeout: Duration,
    cache: RwLock<Option<CachedKeys>>,
}

impl RemoteJwks {
    pub fn new(url: Url, ttl: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(FETCH_TIMEOUT)
            .build()?;

        Ok(Self {
            url,
            client,
            ttl,
            min_refresh_interval: Duration::from_secs(30),
            fetch_timeout: FETCH_TIMEOUT,
            cache: RwLock::new(None),
        })
    }

    /// Upper bound for one JWKS request, connect included
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_min_refresh_interval(mut self, interval: Duration) -> Self {
        self.min_refresh_interval = interval;
        self
    }

    async fn fetch(&self) -> Result<JwkSet, reqwest::Error> {
        debug!("Fetching JWKS from {}", self.url);
        self.client
            .get(self.url.clone())
            .timeout(self.fetch_timeout)
            .send()
            .await?
            .error_for_status()?
            .json::<JwkSet>()
            .await
    }

    /// Fetch unless the cached set is younger than `max_age`
    async fn load(&self, max_age: Duration) -> Result<Arc<JwkSet>, AuthError> {
        // Fast path: try read lock
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.fetched_at.elapsed() < max_age {
                    return Ok(cached.keys.clone());
                }
            }
        }

        let mut cache = self.cache.write().await;
        // Another request may have refreshed while we waited for the lock
        if let Some(cached) = cache.as_ref() {
            if cached.fetched_at.elapsed() < max_age {
                return Ok(cached.keys.clone());
            }
        }

        match self.fetch().await {
            Ok(keys) => {
                let keys = Arc::new(keys);
                debug!("Cached {} signing keys", keys.keys.len());
                *cache = Some(CachedKeys {
                    keys: keys.clone(),
                    fetched_at: Instant::now(),
                });
                Ok(keys)
            }
            Err(e) => match cache.as_mut() {
                Some(stale) => {
                    warn!("JWKS refresh from {} failed, keeping cached keys: {}", self.url, e);
                    // Next attempt waits a full max_age instead of retrying on every request
                    stale.fetched_at = Instant::now();
                    Ok(stale.keys.clone())
                }
                None => {
                    warn!("JWKS fetch from {} failed: {}", self.url, e);
                    Err(AuthError::KeySetUnavailable)
                }
            },
        }
    }
}

#[async_trait]
impl KeySource for RemoteJwks {
    async fn keys(&self) -> Result<Arc<JwkSet>, AuthError> {
        self.load(self.ttl).await
    }

    async fn refresh(&self) -> Result<Arc<JwkSet>, AuthError> {
        self.load(self.min_refresh_interval).await
    }
}
