#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/refcell/kelp/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

use std::path::Path;

use eyre::{Context, bail, ensure};
use serde::{Deserialize, Serialize};

/// Default server host address.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default server port.
pub const DEFAULT_PORT: u16 = 8545;
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Default maximum request size in bytes (1MB).
pub const DEFAULT_MAX_REQUEST_SIZE: usize = 1024 * 1024;
/// Default backend timeout in milliseconds.
pub const DEFAULT_BACKEND_TIMEOUT_MS: u64 = 10000;
/// Default cache memory size in entries.
pub const DEFAULT_CACHE_SIZE: usize = 10000;
/// Default maximum span between range endpoints (0 disables the check).
pub const DEFAULT_MAX_BLOCK_RANGE: u64 = 0;
/// Default head poll interval in milliseconds.
pub const DEFAULT_HEAD_POLL_INTERVAL_MS: u64 = 2000;

/// Server configuration for the kelp proxy.
///
/// Controls the HTTP server settings including binding address, log
/// level, and request size limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// The host address to bind to.
    pub host: String,
    /// The port to listen on.
    pub port: u16,
    /// The log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Maximum request body size in bytes.
    pub max_request_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            max_request_size: DEFAULT_MAX_REQUEST_SIZE,
        }
    }
}

/// Backend RPC endpoint configuration.
///
/// Defines the upstream full-node RPC endpoint the proxy forwards to.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BackendConfig {
    /// Name for this backend, used in logs and errors.
    pub name: String,
    /// The URL of the RPC endpoint.
    pub url: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_backend_timeout")]
    pub timeout_ms: u64,
}

const fn default_backend_timeout() -> u64 {
    DEFAULT_BACKEND_TIMEOUT_MS
}

/// Cache store selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CacheStoreKind {
    /// In-memory LRU store.
    #[default]
    Memory,
    /// Redis store.
    Redis,
}

impl std::fmt::Display for CacheStoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Redis => write!(f, "redis"),
        }
    }
}

/// Cache configuration.
///
/// Controls response caching for immutable queries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether caching is enabled.
    pub enabled: bool,
    /// Which store backs the cache.
    pub store: CacheStoreKind,
    /// Maximum number of entries in the memory store.
    pub memory_size: usize,
    /// Redis connection URL, required when `store = "redis"`.
    pub redis_url: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            store: CacheStoreKind::Memory,
            memory_size: DEFAULT_CACHE_SIZE,
            redis_url: None,
        }
    }
}

/// Rewrite configuration.
///
/// Controls block-tag canonicalization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RewriteConfig {
    /// Maximum span between a range's start and end heights.
    /// Zero disables the span check.
    pub max_block_range: u64,
    /// How often to refresh head pointers from the backend, in milliseconds.
    pub head_poll_interval_ms: u64,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            max_block_range: DEFAULT_MAX_BLOCK_RANGE,
            head_poll_interval_ms: DEFAULT_HEAD_POLL_INTERVAL_MS,
        }
    }
}

/// Root configuration for the kelp proxy.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct KelpConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Backend configuration.
    pub backend: BackendConfig,
    /// Cache configuration.
    pub cache: CacheConfig,
    /// Rewrite configuration.
    pub rewrite: RewriteConfig,
}

impl KelpConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if
    /// validation fails.
    pub fn from_file(path: &Path) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string cannot be parsed or if validation fails.
    ///
    /// # Example
    ///
    /// ```
    /// use kelp_config::KelpConfig;
    ///
    /// let toml = r#"
    /// [backend]
    /// name = "primary"
    /// url = "https://starknet.example.com/rpc"
    /// "#;
    ///
    /// let config = KelpConfig::parse(toml).unwrap();
    /// ```
    pub fn parse(s: &str) -> eyre::Result<Self> {
        let config: Self = toml::from_str(s).wrap_err("failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// Checks that:
    /// - A backend URL is configured
    /// - Port numbers are valid (non-zero)
    /// - The Redis store has a connection URL
    /// - The head poll interval is non-zero
    ///
    /// # Errors
    ///
    /// Returns an error describing any validation failures.
    pub fn validate(&self) -> eyre::Result<()> {
        ensure!(!self.backend.url.is_empty(), "backend URL must be configured");
        ensure!(self.server.port > 0, "server port must be greater than 0");
        ensure!(
            self.rewrite.head_poll_interval_ms > 0,
            "head poll interval must be greater than 0"
        );

        if self.cache.enabled && self.cache.store == CacheStoreKind::Redis {
            match &self.cache.redis_url {
                Some(url) if !url.is_empty() => {}
                _ => bail!("cache store 'redis' requires a redis_url"),
            }
        }

        if self.cache.enabled && self.cache.store == CacheStoreKind::Memory {
            ensure!(self.cache.memory_size > 0, "cache memory_size must be greater than 0");
        }

        Ok(())
    }

    /// Serialize the configuration to a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> eyre::Result<String> {
        toml::to_string_pretty(self).wrap_err("failed to serialize configuration to TOML")
    }
}
