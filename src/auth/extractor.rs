// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for the authenticated principal.
//!
//! These only read what the authentication middleware attached; they never
//! verify tokens themselves.
//!
//! ```rust,ignore
//! async fn my_handler(Auth(principal): Auth) -> impl IntoResponse {
//!     // principal.subject, principal.authorities
//! }
//! ```

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::debug;

use super::roles::{Admin, RoleName};
use super::Principal;
use crate::error::ApiError;

/// Extractor requiring an authenticated principal.
pub struct Auth(pub Principal);

impl<S: Send + Sync> FromRequestParts<S> for Auth {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(Auth)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

/// Optional authentication extractor.
///
/// Yields `None` on public routes reached without a token.
pub struct OptionalAuth(pub Option<Principal>);

impl<S: Send + Sync> FromRequestParts<S> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuth(parts.extensions.get::<Principal>().cloned()))
    }
}

/// Extractor requiring the authority of role `R`.
///
/// ```rust,ignore
/// async fn review(RequireRole(principal, ..): RequireRole<Reviewer>) -> impl IntoResponse {
///     // only principals with ROLE_REVIEWER get here
/// }
/// ```
pub struct RequireRole<R: RoleName>(pub Principal, pub PhantomData<R>);

impl<S: Send + Sync, R: RoleName> FromRequestParts<S> for RequireRole<R> {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Auth(principal) = Auth::from_request_parts(parts, state).await?;

        if !principal.has_authority(&R::authority()) {
            debug!(
                target: "people.auth.policy",
                subject = %principal.subject,
                required = %R::authority(),
                "Principal lacks required authority"
            );
            return Err(ApiError::forbidden("Insufficient permissions for this operation"));
        }

        Ok(RequireRole(principal, PhantomData))
    }
}

/// Extractor that requires admin role.
pub type AdminOnly = RequireRole<Admin>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::roles::{Authority, Reviewer};
    use axum::http::{Request, StatusCode};

    fn parts_with(principal: Option<Principal>) -> Parts {
        let mut parts = Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0;
        if let Some(principal) = principal {
            parts.extensions.insert(principal);
        }
        parts
    }

    fn principal(roles: &[&str]) -> Principal {
        Principal {
            subject: "user_123".to_string(),
            authorities: roles.iter().map(|r| Authority::from_role(r)).collect(),
        }
    }

    #[tokio::test]
    async fn auth_requires_principal() {
        let mut parts = parts_with(None);
        let result = Auth::from_request_parts(&mut parts, &()).await;
        assert_eq!(result.err().unwrap().status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn auth_reads_principal_from_extensions() {
        let mut parts = parts_with(Some(principal(&["client"])));
        let Auth(found) = Auth::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(found.subject, "user_123");
    }

    #[tokio::test]
    async fn optional_auth_returns_none_without_principal() {
        let mut parts = parts_with(None);
        let OptionalAuth(found) = OptionalAuth::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn admin_only_rejects_non_admin() {
        let mut parts = parts_with(Some(principal(&["reviewer"])));
        let result = AdminOnly::from_request_parts(&mut parts, &()).await;
        assert_eq!(result.err().unwrap().status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn require_role_accepts_any_listed_authority() {
        let mut parts = parts_with(Some(principal(&["client", "reviewer"])));
        let result = RequireRole::<Reviewer>::from_request_parts(&mut parts, &()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn require_role_without_principal_is_unauthorized() {
        let mut parts = parts_with(None);
        let result = AdminOnly::from_request_parts(&mut parts, &()).await;
        assert_eq!(result.err().unwrap().status, StatusCode::UNAUTHORIZED);
    }
}
