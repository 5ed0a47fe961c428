use std::sync::Arc;

use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};

use crate::auth::{StaticKeys, TokenVerifier};

pub const TEST_KID: &str = "coffee-test-key";
pub const TEST_ISSUER: &str = "https://coffee-test.us.auth0.com/";
pub const TEST_AUDIENCE: &str = "coffeeshop";

const PRIVATE_KEY: &[u8] = include_bytes!("../../tests/fixtures/test_rsa.pem");
const OTHER_PRIVATE_KEY: &[u8] = include_bytes!("../../tests/fixtures/other_rsa.pem");
const JWKS: &str = include_str!("../../tests/fixtures/jwks.json");

/// Public half of the fixture key as a JWKS document
pub fn test_jwks() -> JwkSet {
    serde_json::from_str(JWKS).expect("fixture JWKS parses")
}

pub fn test_verifier() -> TokenVerifier {
    TokenVerifier::new(Arc::new(StaticKeys::new(test_jwks())), TEST_ISSUER, TEST_AUDIENCE)
}

/// Valid claims for a one-hour token carrying `permissions`
pub fn claims_with(permissions: &[&str]) -> Value {
    let mut claims = claims_without_permissions();
    claims["permissions"] = json!(permissions);
    claims
}

pub fn claims_without_permissions() -> Value {
    let now = chrono::Utc::now().timestamp();
    json!({
        "iss": TEST_ISSUER,
        "sub": "auth0|barista",
        "aud": TEST_AUDIENCE,
        "iat": now,
        "exp": now + 3600,
    })
}

pub fn sign(claims: &Value) -> String {
    sign_with_kid(TEST_KID, claims)
}

pub fn sign_with_kid(kid: &str, claims: &Value) -> String {
    sign_with_key(PRIVATE_KEY, kid, claims)
}

/// Token that names the fixture key id but is signed by a different key
pub fn other_key_token(claims: &Value) -> String {
    sign_with_key(OTHER_PRIVATE_KEY, TEST_KID, claims)
}

fn sign_with_key(pem: &[u8], kid: &str, claims: &Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    let key = EncodingKey::from_rsa_pem(pem).expect("fixture key parses");
    encode(&header, claims, &key).expect("token signs")
}
