// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup and is constant
//! afterwards.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `CLERK_ISSUER` | Expected JWT issuer claim | Required |
//! | `CLERK_JWKS_URL` | Clerk JWKS endpoint for JWT verification | Required |
//! | `JWKS_CACHE_TTL_SECS` | How long a fetched JWKS stays valid | `3600` |
//! | `TLS_CERT_PATH` | PEM certificate chain; enables HTTPS with `TLS_KEY_PATH` | unset |
//! | `TLS_KEY_PATH` | PEM private key | unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::collections::HashMap;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::auth::jwks::DEFAULT_CACHE_TTL;
use crate::logging::LogFormat;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const ISSUER_ENV: &str = "CLERK_ISSUER";
pub const JWKS_URL_ENV: &str = "CLERK_JWKS_URL";
pub const JWKS_CACHE_TTL_ENV: &str = "JWKS_CACHE_TTL_SECS";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            name,
            reason: reason.into(),
        }
    }
}

/// Certificate and key files for HTTPS serving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Expected `iss` claim, compared by exact string match.
    pub issuer: String,
    pub jwks_url: Url,
    pub jwks_cache_ttl: Duration,
    pub tls: Option<TlsPaths>,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a map (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |name: &str| vars.get(name).map(|v| v.trim()).filter(|v| !v.is_empty());

        let host = get(HOST_ENV).unwrap_or(DEFAULT_HOST).to_string();

        let port = match get(PORT_ENV) {
            Some(value) => value
                .parse()
                .map_err(|e| ConfigError::invalid(PORT_ENV, format!("'{value}': {e}")))?,
            None => DEFAULT_PORT,
        };

        let issuer = get(ISSUER_ENV)
            .ok_or(ConfigError::MissingEnvVar(ISSUER_ENV))?
            .to_string();

        let jwks_url = get(JWKS_URL_ENV).ok_or(ConfigError::MissingEnvVar(JWKS_URL_ENV))?;
        let jwks_url = Url::parse(jwks_url)
            .map_err(|e| ConfigError::invalid(JWKS_URL_ENV, format!("'{jwks_url}': {e}")))?;
        if !matches!(jwks_url.scheme(), "http" | "https") {
            return Err(ConfigError::invalid(
                JWKS_URL_ENV,
                format!("unsupported scheme '{}'", jwks_url.scheme()),
            ));
        }

        let jwks_cache_ttl = match get(JWKS_CACHE_TTL_ENV) {
            Some(value) => {
                let secs: u64 = value.parse().map_err(|e| {
                    ConfigError::invalid(JWKS_CACHE_TTL_ENV, format!("'{value}': {e}"))
                })?;
                if secs == 0 {
                    return Err(ConfigError::invalid(JWKS_CACHE_TTL_ENV, "must be positive"));
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_CACHE_TTL,
        };

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert_path: PathBuf::from(cert),
                key_path: PathBuf::from(key),
            }),
            (None, None) => None,
            _ => {
                return Err(ConfigError::invalid(
                    TLS_CERT_PATH_ENV,
                    format!("{TLS_CERT_PATH_ENV} and {TLS_KEY_PATH_ENV} must be set together"),
                ))
            }
        };

        let log_format = match get(LOG_FORMAT_ENV) {
            Some(value) => value
                .parse()
                .map_err(|e: String| ConfigError::invalid(LOG_FORMAT_ENV, e))?,
            None => LogFormat::default(),
        };

        Ok(Self {
            host,
            port,
            issuer,
            jwks_url,
            jwks_cache_ttl,
            tls,
            log_format,
        })
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::invalid(HOST_ENV, format!("'{}': {e}", self.host)))
    }
}
