// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer token verification for the people service API.
//!
//! ## Auth Flow
//!
//! 1. Frontend authenticates the user with Clerk
//! 2. Frontend sends `Authorization: Bearer <Clerk JWT>`
//! 3. The server:
//!    - passes requests without a bearer token through untouched
//!    - checks expiry and issuer on the decoded claims
//!    - resolves the signing key from the cached Clerk JWKS (refetched after
//!      the validity window, default 1 hour)
//!    - verifies the RSA signature
//!    - attaches `sub` and `ROLE_*` authorities (from the `role` claim) to
//!      the request
//! 4. The route policy rejects unauthenticated requests outside the
//!    allow-list; extractors enforce per-handler roles
//!
//! ## Security
//!
//! - A token without `exp` is treated as expired
//! - No clock skew leeway
//! - A failed JWKS refresh rejects the request; stale keys are never served

pub mod claims;
pub mod error;
pub mod extractor;
pub mod gate;
pub mod jwks;
pub mod middleware;
pub mod policy;
pub mod roles;

pub use claims::{Principal, RoleClaim, TokenClaims};
pub use error::AuthError;
pub use extractor::{AdminOnly, Auth, OptionalAuth, RequireRole};
pub use gate::{Outcome, TokenGate};
pub use jwks::{KeySet, KeySetCache};
pub use policy::RoutePolicy;
pub use roles::Authority;
