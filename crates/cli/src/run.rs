//! Server construction and lifecycle.

use std::{sync::Arc, time::Duration};

use eyre::{Context, Result};
use kelp_backend::{HeadPoller, HeadState, HttpBackend};
use kelp_cache::{CacheStore, RpcCache};
use kelp_config::{CacheStoreKind, KelpConfig};
use kelp_server::{AppState, Pipeline, create_router};
use tracing::info;

/// Wait for a shutdown signal (SIGINT or SIGTERM on Unix, Ctrl+C on Windows).
#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");

    tokio::select! {
        _ = sigterm.recv() => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, initiating graceful shutdown...");
        }
    }
}

/// Wait for a shutdown signal (Ctrl+C on non-Unix platforms).
#[cfg(not(unix))]
async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.ok();
    info!("Received Ctrl+C, initiating graceful shutdown...");
}

/// Build the proxy from configuration and serve until shutdown.
///
/// # Errors
///
/// Returns an error if construction fails or the server errors while
/// running.
pub async fn run(config: KelpConfig) -> Result<()> {
    let backend = Arc::new(HttpBackend::new(
        &config.backend.name,
        &config.backend.url,
        Duration::from_millis(config.backend.timeout_ms),
    )?);

    let head = Arc::new(HeadState::new());
    let poller = HeadPoller::new(
        backend.clone(),
        head.clone(),
        Duration::from_millis(config.rewrite.head_poll_interval_ms),
    );
    tokio::spawn(poller.run());

    let cache = if config.cache.enabled {
        let store = match config.cache.store {
            CacheStoreKind::Memory => CacheStore::memory(config.cache.memory_size),
            CacheStoreKind::Redis => {
                CacheStore::redis(config.cache.redis_url.as_deref().unwrap_or_default())?
            }
        };
        Some(RpcCache::new(store))
    } else {
        None
    };

    let pipeline = Pipeline::new(cache, backend, head, config.rewrite.max_block_range);
    let state = Arc::new(AppState::new(pipeline, config.server.max_request_size));
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("failed to bind to {addr}"))?;

    info!(address = %addr, "kelp RPC proxy listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("server error")?;

    info!("Server shut down successfully");
    Ok(())
}
