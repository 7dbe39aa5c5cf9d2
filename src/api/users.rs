// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Current-principal endpoints.

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::{AdminOnly, Auth, Principal, RequireRole};

/// Response for GET /api/me
#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    /// User's unique ID (Clerk `sub` claim)
    pub subject: String,
    /// Authorities derived from the token's role claim
    #[schema(example = json!(["ROLE_ADMIN"]))]
    pub authorities: Vec<String>,
}

impl From<Principal> for MeResponse {
    fn from(principal: Principal) -> Self {
        Self {
            subject: principal.subject,
            authorities: principal
                .authorities
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Get the current authenticated principal.
///
/// Returns the subject and authorities the token gate attached to this request.
#[utoipa::path(
    get,
    path = "/api/me",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Principal information", body = MeResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn current_user(Auth(principal): Auth) -> Json<MeResponse> {
    Json(principal.into())
}

/// Get the current principal, admins only.
#[utoipa::path(
    get,
    path = "/api/admin/me",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Principal information", body = MeResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 403, description = "Forbidden - ROLE_ADMIN required"),
    )
)]
pub async fn current_admin(RequireRole(principal, _): AdminOnly) -> Json<MeResponse> {
    Json(principal.into())
}
