// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWKS (JSON Web Key Set) fetching and caching.
//!
//! ## Cache policy
//!
//! - The key set is fetched lazily by the first request that finds the cache
//!   empty or older than the validity window (default one hour)
//! - A fetched set is never patched; a refresh swaps in a complete new entry
//! - A failed refresh leaves the cache untouched and fails the request. An
//!   entry past its window is never served as a fallback (fail-closed)
//! - Only one refresh is in flight at a time; concurrent requests wait for it
//!   and reuse the entry it installed

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::jwk::{Jwk, JwkSet};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, instrument};

use super::error::AuthError;

/// Default key set validity window (1 hour).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Connect timeout for the key set fetch.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Read timeout for the key set fetch.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Verification keys indexed by key ID.
///
/// Keys published without a `kid` cannot be selected by a token and are
/// dropped when the set is built.
#[derive(Debug, Clone, Default)]
pub struct KeySet {
    keys: HashMap<String, Jwk>,
}

impl KeySet {
    pub fn get(&self, kid: &str) -> Option<&Jwk> {
        self.keys.get(kid)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl From<JwkSet> for KeySet {
    fn from(set: JwkSet) -> Self {
        let keys = set
            .keys
            .into_iter()
            .filter_map(|jwk| jwk.common.key_id.clone().map(|kid| (kid, jwk)))
            .collect();
        Self { keys }
    }
}

/// JWKS cache entry.
struct CacheEntry {
    keys: Arc<KeySet>,
    fetched_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() <= ttl
    }
}

/// Self-refreshing cache of the issuer's verification keys.
///
/// Cloning is cheap; clones share the same cache cell.
#[derive(Clone)]
pub struct KeySetCache {
    /// JWKS URL (Clerk endpoint)
    jwks_url: String,
    /// Validity window of a fetched set
    cache_ttl: Duration,
    /// Current entry, replaced wholesale on refresh
    cache: Arc<RwLock<Option<CacheEntry>>>,
    /// Serialises refreshes
    refresh_lock: Arc<Mutex<()>>,
    /// Remote fetch attempts, successful or not
    fetches: Arc<AtomicU64>,
    /// HTTP client
    client: reqwest::Client,
}

impl KeySetCache {
    /// Create a cache for the given JWKS endpoint with default timeouts.
    ///
    /// # Arguments
    /// - `jwks_url`: The JWKS endpoint URL (e.g., `https://your-clerk-domain.clerk.accounts.dev/.well-known/jwks.json`)
    pub fn new(jwks_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        Ok(Self {
            jwks_url: jwks_url.into(),
            cache_ttl: DEFAULT_CACHE_TTL,
            cache: Arc::new(RwLock::new(None)),
            refresh_lock: Arc::new(Mutex::new(())),
            fetches: Arc::new(AtomicU64::new(0)),
            client: build_client(DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT)?,
        })
    }

    /// Set the validity window.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Replace the fetch timeouts.
    pub fn with_fetch_timeouts(
        mut self,
        connect: Duration,
        read: Duration,
    ) -> Result<Self, reqwest::Error> {
        self.client = build_client(connect, read)?;
        Ok(self)
    }

    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    /// Number of remote fetches attempted so far.
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }

    /// Whether a cached set exists and is within its validity window.
    pub async fn is_fresh(&self) -> bool {
        self.fresh_keys().await.is_some()
    }

    /// Return the cached set, refreshing it first if it is empty or stale.
    pub async fn get_or_refresh(&self) -> Result<Arc<KeySet>, AuthError> {
        if let Some(keys) = self.fresh_keys().await {
            debug!(target: "people.auth.jwks", "JWKS cache hit");
            return Ok(keys);
        }

        let _refresh = self.refresh_lock.lock().await;

        // Another request may have refreshed while we waited for the lock
        if let Some(keys) = self.fresh_keys().await {
            debug!(target: "people.auth.jwks", "JWKS refreshed by concurrent request");
            return Ok(keys);
        }

        self.fetch_and_install().await
    }

    /// Resolve the key for a token's `kid`.
    ///
    /// The cache is brought up to date before the lookup, so a token without
    /// a `kid` still costs a refresh on a cold cache.
    pub async fn resolve(&self, kid: Option<&str>) -> Result<Jwk, AuthError> {
        let keys = self.get_or_refresh().await?;

        kid.and_then(|kid| keys.get(kid))
            .cloned()
            .ok_or(AuthError::UnknownKeyId)
    }

    /// Force a refresh regardless of the current entry's age.
    pub async fn refresh(&self) -> Result<Arc<KeySet>, AuthError> {
        let _refresh = self.refresh_lock.lock().await;
        self.fetch_and_install().await
    }

    async fn fresh_keys(&self) -> Option<Arc<KeySet>> {
        let cache = self.cache.read().await;
        cache
            .as_ref()
            .filter(|entry| entry.is_fresh(self.cache_ttl))
            .map(|entry| Arc::clone(&entry.keys))
    }

    /// Fetch and swap in a new entry. Caller holds `refresh_lock`.
    async fn fetch_and_install(&self) -> Result<Arc<KeySet>, AuthError> {
        let keys = Arc::new(self.fetch_key_set().await?);

        info!(
            target: "people.auth.jwks",
            key_count = keys.len(),
            "JWKS cache refreshed"
        );

        let mut cache = self.cache.write().await;
        *cache = Some(CacheEntry {
            keys: Arc::clone(&keys),
            fetched_at: Instant::now(),
        });

        Ok(keys)
    }

    /// Fetch JWKS from the endpoint.
    #[instrument(skip(self), fields(url = %self.jwks_url))]
    async fn fetch_key_set(&self) -> Result<KeySet, AuthError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);

        let response = self.client.get(&self.jwks_url).send().await.map_err(|e| {
            error!(target: "people.auth.jwks", error = %e, "Failed to fetch JWKS");
            AuthError::KeySetUnavailable(e.to_string())
        })?;

        if !response.status().is_success() {
            error!(
                target: "people.auth.jwks",
                status = %response.status(),
                "JWKS endpoint returned error"
            );
            return Err(AuthError::KeySetUnavailable(format!(
                "HTTP {} from JWKS endpoint",
                response.status()
            )));
        }

        let jwks: JwkSet = response.json().await.map_err(|e| {
            error!(target: "people.auth.jwks", error = %e, "Failed to parse JWKS response");
            AuthError::KeySetUnavailable(e.to_string())
        })?;

        let keys = KeySet::from(jwks);
        if keys.is_empty() {
            error!(target: "people.auth.jwks", "JWKS response contains no usable keys");
            return Err(AuthError::KeySetUnavailable(
                "JWKS response contains no keys with a key ID".to_string(),
            ));
        }

        Ok(keys)
    }
}

/// HTTP client for key set fetches.
///
/// `read` bounds each socket read, including the wait for response headers;
/// there is no cap on the request as a whole. Idle connections are not
/// pooled, so each fetch closes its connection.
fn build_client(connect: Duration, read: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .connect_timeout(connect)
        .read_timeout(read)
        .pool_max_idle_per_host(0)
        .build()
}
