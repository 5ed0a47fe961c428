#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use coffee_shop_api::auth::{StaticKeys, TokenVerifier};
use coffee_shop_api::context::AppContext;
use coffee_shop_api::database::MemoryDrinkStore;
use coffee_shop_api::handlers::login::LoginPages;
use coffee_shop_api::routes;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{json, Value};

pub const TEST_KID: &str = "coffee-test-key";
pub const TEST_ISSUER: &str = "https://coffee-test.us.auth0.com/";
pub const TEST_AUDIENCE: &str = "coffeeshop";

const PRIVATE_KEY: &[u8] = include_bytes!("../fixtures/test_rsa.pem");
const OTHER_PRIVATE_KEY: &[u8] = include_bytes!("../fixtures/other_rsa.pem");
const JWKS: &str = include_str!("../fixtures/jwks.json");

pub const BARISTA: &[&str] = &["get:drinks-detail"];
pub const MANAGER: &[&str] = &["get:drinks-detail", "post:drinks", "patch:drinks", "delete:drinks"];

/// One API instance per test, backed by a fresh in-memory store
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::start_with(|ctx| ctx).await
    }

    pub async fn start_with_login() -> Result<Self> {
        Self::start_with(|ctx| {
            let config = coffee_shop_api::config::AuthConfig {
                domain: "coffee-test.us.auth0.com".into(),
                audience: TEST_AUDIENCE.into(),
                algorithms: vec![Algorithm::RS256],
                jwks_cache_ttl_secs: 600,
                client_id: Some("test-client".into()),
                callback_url: None,
            };
            let pages = LoginPages::new(&config, "test-client", "http://localhost:5000")
                .expect("login pages build");
            ctx.with_login(pages)
        })
        .await
    }

    async fn start_with(configure: impl FnOnce(AppContext) -> AppContext) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let keys = StaticKeys::new(serde_json::from_str::<JwkSet>(JWKS)?);
        let verifier = TokenVerifier::new(Arc::new(keys), TEST_ISSUER, TEST_AUDIENCE);
        let ctx = configure(AppContext::new(Arc::new(MemoryDrinkStore::new()), Arc::new(verifier)));

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test port")?;
        let app = routes::app(ctx);
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let server = Self {
            port,
            base_url,
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Create a drink with full permissions and return the created entry
    pub async fn create_drink(&self, body: &Value) -> Result<Value> {
        let res = self
            .client
            .post(self.url("/drinks"))
            .bearer_auth(token(MANAGER))
            .json(body)
            .send()
            .await?;
        let status = res.status();
        let body = res.json::<Value>().await?;
        anyhow::ensure!(status == StatusCode::OK, "create failed with {}: {}", status, body);
        Ok(body["drinks"][0].clone())
    }
}

pub fn water() -> Value {
    json!({
        "title": "Water",
        "recipe": [{"name": "Water", "color": "blue", "parts": 1}]
    })
}

pub fn claims(permissions: Option<&[&str]>) -> Value {
    let now = chrono::Utc::now().timestamp();
    let mut claims = json!({
        "iss": TEST_ISSUER,
        "sub": "auth0|integration",
        "aud": TEST_AUDIENCE,
        "iat": now,
        "exp": now + 3600,
    });
    if let Some(permissions) = permissions {
        claims["permissions"] = json!(permissions);
    }
    claims
}

/// Valid RS256 token carrying `permissions`
pub fn token(permissions: &[&str]) -> String {
    sign(PRIVATE_KEY, TEST_KID, &claims(Some(permissions)))
}

pub fn token_for(claims: &Value) -> String {
    sign(PRIVATE_KEY, TEST_KID, claims)
}

/// Names the trusted key id but is signed by another key
pub fn forged_token(permissions: &[&str]) -> String {
    sign(OTHER_PRIVATE_KEY, TEST_KID, &claims(Some(permissions)))
}

pub fn token_with_kid(kid: &str, permissions: &[&str]) -> String {
    sign(PRIVATE_KEY, kid, &claims(Some(permissions)))
}

fn sign(pem: &[u8], kid: &str, claims: &Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    let key = EncodingKey::from_rsa_pem(pem).expect("fixture key parses");
    encode(&header, claims, &key).expect("token signs")
}
