//! Logging and tracing utilities for kelp.
//!
//! This module provides tracing initialization and configuration logging.

use eyre::{Context, Result};
use kelp_config::KelpConfig;
use tracing::{debug, info};

/// Initialize the tracing subscriber for logging.
///
/// # Arguments
///
/// * `level` - The log level string (trace, debug, info, warn, error)
///
/// # Errors
///
/// Returns an error if the tracing subscriber cannot be initialized.
pub fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .wrap_err("failed to create log filter")?;

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    Ok(())
}

/// A logger for kelp configuration.
///
/// Provides methods for logging configuration summaries at startup.
#[derive(Debug, Default, Clone, Copy)]
pub struct Logger;

impl Logger {
    /// Create a new Logger instance.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Log a summary of the configuration at startup.
    pub fn log(&self, config: &KelpConfig) {
        info!(
            host = %config.server.host,
            port = config.server.port,
            max_request_size = config.server.max_request_size,
            "Server configuration"
        );

        info!(
            name = %config.backend.name,
            url = %config.backend.url,
            timeout_ms = config.backend.timeout_ms,
            "Backend configured"
        );

        if config.cache.enabled {
            info!(
                store = %config.cache.store,
                memory_size = config.cache.memory_size,
                "Cache enabled"
            );
        } else {
            debug!("Cache disabled");
        }

        info!(
            max_block_range = config.rewrite.max_block_range,
            head_poll_interval_ms = config.rewrite.head_poll_interval_ms,
            "Rewrite configuration"
        );
    }
}
