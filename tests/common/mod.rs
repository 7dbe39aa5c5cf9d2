// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures: RSA signing keys, a mocked JWKS endpoint and token builders.

#![allow(dead_code)]

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use people_server::auth::{KeySetCache, TokenGate};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ISSUER: &str = "https://clerk.people.test";
pub const JWKS_PATH: &str = "/.well-known/jwks.json";
pub const SIGNING_KID: &str = "people-test-key";

const SIGNING_KEY_PEM: &str = include_str!("../fixtures/signing_key.pem");
const ROGUE_KEY_PEM: &str = include_str!("../fixtures/rogue_key.pem");

/// Modulus of `fixtures/signing_key.pem`, base64url without padding.
const SIGNING_KEY_N: &str = "w61P-gJg_vKnj53JedKQ8-epL-Vh-p7jbpyfxmVn0UBWfi7zJGae3P_rBKeFuNVQbZSoKw66s5VZRU9XAKBnkDU632tsa_HpxwYa1iFBzytJ90gT6-x3Tai2WMXsZ4kAN0hG60LNy2Q-R0azpDAjmfKxvjEjAM4QlvXK6SSfMJq5Wn9pgn3OpAYjCO8qDcYddaUFnv2UDnHANmkaqv80fy0b9V3gjmixgX9oyeuuhLsye7DZYx09NuiLyQ55AXHFX1zftgOcmxZmxo2H1QHeMoippKdcM3BIMPibYUzvwuW4awmXfVfWZPxLAE3t2GiC294dJOazluFHHkRdDe9Aow";

/// Modulus of `fixtures/rogue_key.pem`, never published in the JWKS.
const ROGUE_KEY_N: &str = "mlPhYeXZb6_ZCL3OmShuyohqucz7dvEsf8rIguoQOaWQAfmyMKzPxMEFln2Lu2qS_II5gj82YG0XwQB510ePeFIjrF_00-S56Rj_76e5EliesqbSJRppo8s8KCf6SyfyBOZanFbzjb6d1KuHQkzusO9c9nD27OHL4sMWYOfcK5hBZpsnssBJzS9dSMN1lx5-9vlyawF9x8SY9sUYIbNHfJDsdPX1VeuMqV2bM-TJieo1lbllv8j5DA1NNUg0c5P9e0OaUNR1cSWoLFsmY5Hp-O74-K902sQEJd0Tqw5v5koum05HyUqMWUALj7-Av_yVoD0Mg6jJ002jfZvmQw5ZiQ";

const RSA_EXPONENT: &str = "AQAB";

fn rsa_jwk(kid: &str, n: &str) -> Value {
    json!({
        "kty": "RSA",
        "kid": kid,
        "use": "sig",
        "alg": "RS256",
        "n": n,
        "e": RSA_EXPONENT
    })
}

/// JWKS document publishing the signing key under [`SIGNING_KID`].
pub fn jwks_body() -> Value {
    json!({ "keys": [rsa_jwk(SIGNING_KID, SIGNING_KEY_N)] })
}

/// JWKS document publishing the rogue key under a second key ID.
pub fn jwks_body_with_rogue(rogue_kid: &str) -> Value {
    json!({
        "keys": [
            rsa_jwk(SIGNING_KID, SIGNING_KEY_N),
            rsa_jwk(rogue_kid, ROGUE_KEY_N)
        ]
    })
}

/// Start a mock issuer that serves [`jwks_body`].
pub async fn jwks_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(jwks_body()))
        .mount(&server)
        .await;
    server
}

/// Start a mock issuer that answers every JWKS request with `response`.
pub async fn jwks_server_responding(response: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(response)
        .mount(&server)
        .await;
    server
}

pub fn jwks_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), JWKS_PATH)
}

/// Key set cache pointed at the mock issuer.
pub fn key_set(server: &MockServer, ttl: Duration) -> KeySetCache {
    KeySetCache::new(jwks_url(server))
        .expect("http client")
        .with_cache_ttl(ttl)
        .with_fetch_timeouts(Duration::from_millis(500), Duration::from_millis(500))
        .expect("http client")
}

/// Gate trusting [`ISSUER`] with a one hour cache.
pub fn gate(server: &MockServer) -> TokenGate {
    gate_with_ttl(server, Duration::from_secs(3600))
}

pub fn gate_with_ttl(server: &MockServer, ttl: Duration) -> TokenGate {
    TokenGate::new(ISSUER, key_set(server, ttl))
}

/// Claims for a token issued by [`ISSUER`] expiring in one hour.
pub fn claims(subject: &str, role: Value) -> Value {
    let mut claims = json!({
        "sub": subject,
        "iss": ISSUER,
        "iat": Utc::now().timestamp(),
        "exp": Utc::now().timestamp() + 3600
    });
    if !role.is_null() {
        claims["role"] = role;
    }
    claims
}

fn sign_with(pem: &str, kid: Option<&str>, claims: &Value) -> String {
    let key = EncodingKey::from_rsa_pem(pem.as_bytes()).expect("fixture key");
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(str::to_string);
    encode(&header, claims, &key).expect("sign token")
}

/// Sign with the published key under [`SIGNING_KID`].
pub fn sign(claims: &Value) -> String {
    sign_with(SIGNING_KEY_PEM, Some(SIGNING_KID), claims)
}

/// Sign with the published key under an arbitrary (or no) key ID.
pub fn sign_with_kid(kid: Option<&str>, claims: &Value) -> String {
    sign_with(SIGNING_KEY_PEM, kid, claims)
}

/// Sign with a key the issuer never published, claiming [`SIGNING_KID`].
pub fn sign_with_rogue(claims: &Value) -> String {
    sign_with(ROGUE_KEY_PEM, Some(SIGNING_KID), claims)
}

/// Sign with the rogue key under its own key ID.
pub fn sign_with_rogue_kid(kid: &str, claims: &Value) -> String {
    sign_with(ROGUE_KEY_PEM, Some(kid), claims)
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
