// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Runs the [`TokenGate`] over every request:
//!
//! - no bearer token: forwarded untouched (route policy decides later)
//! - valid token: [`Principal`](super::Principal) inserted into the request
//!   extensions, then forwarded
//! - invalid token: `401` written here, the handler never runs
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/api/me", get(current_user))
//!     .layer(axum::middleware::from_fn_with_state(gate.clone(), authenticate));
//! ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::gate::{Outcome, TokenGate};

/// Authentication middleware function.
pub async fn authenticate(
    State(gate): State<TokenGate>,
    mut request: Request,
    next: Next,
) -> Response {
    match gate.authenticate(request.headers()).await {
        Outcome::PassThrough => next.run(request).await,
        Outcome::Authenticated(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Outcome::Rejected(error) => error.into_response(),
    }
}
