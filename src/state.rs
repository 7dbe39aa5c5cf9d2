// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{RoutePolicy, TokenGate};

#[derive(Clone)]
pub struct AppState {
    pub gate: TokenGate,
    pub policy: Arc<RoutePolicy>,
}

impl AppState {
    /// State with the people service route policy.
    pub fn new(gate: TokenGate) -> Self {
        Self {
            gate,
            policy: Arc::new(RoutePolicy::people_service()),
        }
    }

    pub fn with_policy(mut self, policy: RoutePolicy) -> Self {
        self.policy = Arc::new(policy);
        self
    }
}
