//! The exact-match key/value store contract behind the RPC cache.

use std::future::Future;

use bytes::Bytes;
use derive_more::{Debug, Display, Error};

/// Error type for cache store operations.
#[derive(Debug, Display, Error)]
#[display("cache error: {_0}")]
#[error(ignore)]
pub struct CacheError(pub String);

impl CacheError {
    /// Create a new cache error.
    #[must_use]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// An exact-match key/value store.
///
/// The only contract is exact-match retrieval by key. Values stored by
/// the RPC cache are write-once: no key is ever rebound to a different
/// value, so concurrent same-key writes are idempotent and no
/// compare-and-swap is required. Expiry and eviction, if any, are the
/// store's own concern.
pub trait Cache: Send + Sync + 'static {
    /// Get the value stored under `key`, if any.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Bytes>, CacheError>> + Send;

    /// Store `value` under `key`.
    fn set(&self, key: &str, value: Bytes) -> impl Future<Output = Result<(), CacheError>> + Send;
}
