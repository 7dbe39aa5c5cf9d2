// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Route allow-list.
//!
//! The token gate never rejects a request for lacking a token. This layer
//! runs after it and does: any route not on the allow-list needs a
//! [`Principal`] in the request extensions.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use super::Principal;
use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathMatch {
    Exact(String),
    Prefix(String),
}

impl PathMatch {
    fn matches(&self, path: &str) -> bool {
        match self {
            PathMatch::Exact(expected) => path == expected,
            PathMatch::Prefix(prefix) => path.starts_with(prefix.as_str()),
        }
    }
}

/// A route reachable without a token. `method: None` allows any method.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PublicRoute {
    method: Option<Method>,
    path: PathMatch,
}

/// Set of routes that do not require an authenticated principal.
#[derive(Debug, Clone, Default)]
pub struct RoutePolicy {
    public: Vec<PublicRoute>,
}

impl RoutePolicy {
    /// A policy where every route requires authentication.
    pub fn new() -> Self {
        Self::default()
    }

    /// Public routes of the people service: account creation, lookup by
    /// email, API docs and health probes.
    pub fn people_service() -> Self {
        Self::new()
            .permit(Method::POST, "/api/users")
            .permit_prefix(Some(Method::GET), "/api/users/email/")
            .permit_prefix(None, "/docs")
            .permit_prefix(None, "/api-doc/")
            .permit_prefix(None, "/health")
    }

    /// Allow one exact path for one method.
    pub fn permit(mut self, method: Method, path: impl Into<String>) -> Self {
        self.public.push(PublicRoute {
            method: Some(method),
            path: PathMatch::Exact(path.into()),
        });
        self
    }

    /// Allow every path under a prefix.
    pub fn permit_prefix(mut self, method: Option<Method>, prefix: impl Into<String>) -> Self {
        self.public.push(PublicRoute {
            method,
            path: PathMatch::Prefix(prefix.into()),
        });
        self
    }

    pub fn is_public(&self, method: &Method, path: &str) -> bool {
        self.public.iter().any(|route| {
            route.method.as_ref().is_none_or(|m| m == method) && route.path.matches(path)
        })
    }
}

/// Reject unauthenticated requests to routes outside the allow-list.
pub async fn require_principal(
    State(policy): State<Arc<RoutePolicy>>,
    request: Request,
    next: Next,
) -> Response {
    let authenticated = request.extensions().get::<Principal>().is_some();

    if authenticated || policy.is_public(request.method(), request.uri().path()) {
        return next.run(request).await;
    }

    debug!(
        target: "people.auth.policy",
        method = %request.method(),
        path = request.uri().path(),
        "Unauthenticated request to protected route"
    );
    ApiError::unauthorized("Authentication required").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_creation_is_public_for_post_only() {
        let policy = RoutePolicy::people_service();
        assert!(policy.is_public(&Method::POST, "/api/users"));
        assert!(!policy.is_public(&Method::GET, "/api/users"));
        assert!(!policy.is_public(&Method::POST, "/api/users/42"));
    }

    #[test]
    fn lookup_by_email_is_public_for_get_only() {
        let policy = RoutePolicy::people_service();
        assert!(policy.is_public(&Method::GET, "/api/users/email/ana@example.com"));
        assert!(!policy.is_public(&Method::DELETE, "/api/users/email/ana@example.com"));
        assert!(!policy.is_public(&Method::GET, "/api/users/emails"));
    }

    #[test]
    fn docs_and_health_are_public_for_any_method() {
        let policy = RoutePolicy::people_service();
        assert!(policy.is_public(&Method::GET, "/docs/"));
        assert!(policy.is_public(&Method::GET, "/api-doc/openapi.json"));
        assert!(policy.is_public(&Method::HEAD, "/health/ready"));
    }

    #[test]
    fn everything_else_is_protected() {
        let policy = RoutePolicy::people_service();
        assert!(!policy.is_public(&Method::GET, "/api/me"));
        assert!(!policy.is_public(&Method::GET, "/api/credit-offers"));
        assert!(!policy.is_public(&Method::POST, "/api/applications"));
    }

    #[test]
    fn empty_policy_protects_all_routes() {
        assert!(!RoutePolicy::new().is_public(&Method::GET, "/health"));
    }
}
