// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token verification gate.
//!
//! ## Verification order
//!
//! 1. Decode header and claims without verifying (`MalformedToken`)
//! 2. Expiration present and in the future (`TokenExpired`)
//! 3. Issuer equals the configured issuer (`InvalidIssuer`)
//! 4. Key resolved from the cached JWKS, refreshing if stale
//!    (`KeySetUnavailable`, `UnknownKeyId`)
//! 5. Signature verified with the resolved RSA key (`SignatureInvalid`)
//! 6. Principal derived from the verified claims (`MalformedToken` without `sub`)
//!
//! Steps 2 and 3 run before any key set fetch, so expired or foreign tokens
//! never cause network traffic.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use chrono::Utc;
use jsonwebtoken::jwk::{AlgorithmParameters, Jwk};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use tracing::{debug, warn};

use super::claims::{Principal, TokenClaims};
use super::error::AuthError;
use super::jwks::KeySetCache;

/// Authorization scheme prefix, including the separating space.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Signature algorithms accepted with an RSA verification key.
const RSA_ALGORITHMS: [Algorithm; 6] = [
    Algorithm::RS256,
    Algorithm::RS384,
    Algorithm::RS512,
    Algorithm::PS256,
    Algorithm::PS384,
    Algorithm::PS512,
];

/// Result of running the gate over one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No bearer token; the request continues without a principal.
    PassThrough,
    /// Token verified; the request continues with this principal.
    Authenticated(Principal),
    /// Token presented but rejected; the request stops here.
    Rejected(AuthError),
}

/// Verifies bearer tokens against the expected issuer and its JWKS.
#[derive(Clone)]
pub struct TokenGate {
    issuer: String,
    keys: KeySetCache,
}

impl TokenGate {
    pub fn new(issuer: impl Into<String>, keys: KeySetCache) -> Self {
        Self {
            issuer: issuer.into(),
            keys,
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn key_set(&self) -> &KeySetCache {
        &self.keys
    }

    /// Decide whether a request may proceed, and as whom.
    pub async fn authenticate(&self, headers: &HeaderMap) -> Outcome {
        let Some(token) = bearer_token(headers) else {
            return Outcome::PassThrough;
        };

        match self.verify(token).await {
            Ok(principal) => {
                debug!(
                    target: "people.auth.gate",
                    subject = %principal.subject,
                    authorities = principal.authorities.len(),
                    "Bearer token accepted"
                );
                Outcome::Authenticated(principal)
            }
            Err(error) => {
                warn!(
                    target: "people.auth.gate",
                    error_code = error.error_code(),
                    error = %error,
                    "Bearer token rejected"
                );
                Outcome::Rejected(error)
            }
        }
    }

    /// Verify a raw token and derive its principal.
    pub async fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        let header = decode_header(token).map_err(|e| {
            debug!(target: "people.auth.gate", error = %e, "Token header could not be decoded");
            AuthError::MalformedToken
        })?;

        let unverified = jsonwebtoken::dangerous::insecure_decode::<TokenClaims>(token)
            .map_err(|e| {
                debug!(target: "people.auth.gate", error = %e, "Token claims could not be decoded");
                AuthError::MalformedToken
            })?
            .claims;

        check_expiration(unverified.exp, Utc::now().timestamp())?;

        check_issuer(unverified.iss.as_deref(), &self.issuer).inspect_err(|_| {
            warn!(
                target: "people.auth.gate",
                issuer = unverified.iss.as_deref().unwrap_or("<none>"),
                "Token issuer mismatch"
            );
        })?;

        let jwk = self
            .keys
            .resolve(header.kid.as_deref())
            .await
            .inspect_err(|e| {
                if *e == AuthError::UnknownKeyId {
                    warn!(
                        target: "people.auth.gate",
                        kid = header.kid.as_deref().unwrap_or("<none>"),
                        "Token key ID not found in JWKS"
                    );
                }
            })?;

        let claims = verify_signature(token, header.alg, &jwk)?;

        Principal::from_verified_claims(claims)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// Returns `None` when the header is missing, not valid UTF-8, or uses another
/// scheme.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(BEARER_PREFIX)
}

/// A missing expiration counts as expired.
fn check_expiration(exp: Option<i64>, now: i64) -> Result<(), AuthError> {
    match exp {
        Some(exp) if exp > now => Ok(()),
        _ => Err(AuthError::TokenExpired),
    }
}

fn check_issuer(claimed: Option<&str>, expected: &str) -> Result<(), AuthError> {
    if claimed == Some(expected) {
        Ok(())
    } else {
        Err(AuthError::InvalidIssuer)
    }
}

/// Verify the signature and return the claims it covers.
///
/// Expiry and issuer were checked on the same payload, so claim validation is
/// switched off here and only the signature is checked.
fn verify_signature(token: &str, alg: Algorithm, jwk: &Jwk) -> Result<TokenClaims, AuthError> {
    if !RSA_ALGORITHMS.contains(&alg) {
        warn!(target: "people.auth.gate", ?alg, "Token algorithm is not an RSA algorithm");
        return Err(AuthError::SignatureInvalid);
    }

    let AlgorithmParameters::RSA(rsa) = &jwk.algorithm else {
        warn!(target: "people.auth.gate", "JWKS key is not an RSA key");
        return Err(AuthError::SignatureInvalid);
    };

    let key = DecodingKey::from_rsa_components(&rsa.n, &rsa.e).map_err(|e| {
        warn!(target: "people.auth.gate", error = %e, "JWKS key could not be loaded");
        AuthError::SignatureInvalid
    })?;

    let mut validation = Validation::new(alg);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<TokenClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            debug!(target: "people.auth.gate", error = %e, "Signature verification failed");
            AuthError::SignatureInvalid
        })
}
