// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! People Service - REST backend for users, credit offers and applications
//!
//! This crate provides the HTTP surface and the bearer token gate that every
//! request passes through. Resource routes (users, credit offers,
//! applications) plug in through [`api::router_with`].
//!
//! ## Modules
//!
//! - `api` - HTTP router, health probes, principal endpoints (Axum)
//! - `auth` - Token gate, JWKS cache, route policy, role extractors
//! - `config` - Environment configuration
//! - `logging` - Tracing subscriber setup

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod state;
