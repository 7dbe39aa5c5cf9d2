// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, time::Duration};

use axum_server::{tls_rustls::RustlsConfig, Handle};
use people_server::{
    api::router,
    auth::{KeySetCache, TokenGate},
    config::AppConfig,
    logging,
    state::AppState,
};
use tokio::signal;
use tracing::{error, info};

/// Time in-flight requests get to finish after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    logging::init(config.log_format)?;

    info!(
        issuer = %config.issuer,
        jwks_url = %config.jwks_url,
        jwks_cache_ttl_secs = config.jwks_cache_ttl.as_secs(),
        tls = config.tls.is_some(),
        "Configuration loaded"
    );

    let keys = KeySetCache::new(config.jwks_url.as_str())?.with_cache_ttl(config.jwks_cache_ttl);
    let gate = TokenGate::new(config.issuer.clone(), keys);
    let app = router(AppState::new(gate));

    let addr = config.bind_addr()?;
    let handle = Handle::new();
    tokio::spawn(shutdown_signal(handle.clone()));

    match &config.tls {
        Some(tls) => {
            // Install the ring crypto provider for rustls (must be done before any TLS operations)
            rustls::crypto::ring::default_provider()
                .install_default()
                .map_err(|_| "Failed to install rustls crypto provider")?;

            let tls_config = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path).await?;

            info!("People service listening on https://{addr} (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            info!("People service listening on http://{addr} (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
    }

    info!("People service shutdown complete");
    Ok(())
}

/// Wait for SIGINT or SIGTERM, then start a graceful shutdown.
async fn shutdown_signal(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for SIGINT: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("Shutdown signal received, draining connections");
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}
