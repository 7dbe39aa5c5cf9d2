// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Role-derived authorities.
//!
//! A role claim value `admin` becomes the authority `ROLE_ADMIN`. Route and
//! handler checks compare against these labels.

use serde::Serialize;

/// Marker prepended to every upper-cased role value.
pub const ROLE_PREFIX: &str = "ROLE_";

/// A permission label attached to an authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Authority(String);

impl Authority {
    /// Build an authority from a raw role claim value.
    pub fn from_role(role: &str) -> Self {
        Authority(format!("{ROLE_PREFIX}{}", role.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Authority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Authority> for String {
    fn from(value: Authority) -> Self {
        value.0
    }
}

/// Role required by a [`RequireRole`](super::extractor::RequireRole) extractor.
pub trait RoleName: Send + Sync + 'static {
    /// Role claim value, before prefixing and upper-casing.
    const NAME: &'static str;

    fn authority() -> Authority {
        Authority::from_role(Self::NAME)
    }
}

/// Administrative role.
pub struct Admin;

impl RoleName for Admin {
    const NAME: &'static str = "admin";
}

/// Credit application reviewer role.
pub struct Reviewer;

impl RoleName for Reviewer {
    const NAME: &'static str = "reviewer";
}
