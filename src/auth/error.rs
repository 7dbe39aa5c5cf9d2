// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token gate rejection reasons.
//!
//! Every variant terminates the request with `401 Unauthorized`. The wire
//! message is deliberately coarse: only expiry, issuer and key ID failures get
//! their own text, everything else collapses into `Invalid token`. The full
//! reason (including fetch error details) only goes to the logs.

use axum::{
    http::{header::WWW_AUTHENTICATE, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Why the gate rejected a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Token could not be decoded into header and claims.
    #[error("token is malformed")]
    MalformedToken,
    /// Expiration claim is missing or not in the future.
    #[error("token expiration is missing or has passed")]
    TokenExpired,
    /// Issuer claim does not match the configured issuer.
    #[error("token issuer does not match the expected issuer")]
    InvalidIssuer,
    /// Key set could not be fetched or parsed.
    #[error("verification key set unavailable: {0}")]
    KeySetUnavailable(String),
    /// Key ID is absent from the (possibly refreshed) key set.
    #[error("no verification key matches the token key ID")]
    UnknownKeyId,
    /// Signature did not verify against the resolved key.
    #[error("token signature is invalid")]
    SignatureInvalid,
}

impl AuthError {
    /// Stable identifier used in log fields.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MalformedToken => "malformed_token",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidIssuer => "invalid_issuer",
            AuthError::KeySetUnavailable(_) => "key_set_unavailable",
            AuthError::UnknownKeyId => "unknown_key_id",
            AuthError::SignatureInvalid => "signature_invalid",
        }
    }

    /// Message written to the response body.
    pub fn wire_message(&self) -> &'static str {
        match self {
            AuthError::TokenExpired => "Token expired",
            AuthError::InvalidIssuer => "Invalid issuer",
            AuthError::UnknownKeyId => "Invalid key ID",
            AuthError::MalformedToken
            | AuthError::KeySetUnavailable(_)
            | AuthError::SignatureInvalid => "Invalid token",
        }
    }

    /// HTTP status for this rejection.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            [(WWW_AUTHENTICATE, "Bearer")],
            self.wire_message(),
        )
            .into_response()
    }
}
