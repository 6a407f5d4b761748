//! Redis store.

use bytes::Bytes;
use kelp_traits::{Cache, CacheError};
use redis::{AsyncCommands, Client};

/// Redis-based store.
///
/// Plain GET/SET with no expiry: keys bind immutable facts, so entries
/// are left to Redis' own eviction policy.
#[derive(Debug, Clone)]
pub struct RedisCache {
    client: Client,
}

impl RedisCache {
    /// Create a new Redis store with the given connection URL.
    ///
    /// # Arguments
    ///
    /// * `url` - Redis connection URL (e.g., "redis://127.0.0.1:6379")
    ///
    /// # Errors
    ///
    /// Returns a `CacheError` if the URL is invalid.
    pub fn new(url: &str) -> Result<Self, CacheError> {
        let client =
            Client::open(url).map_err(|e| CacheError::new(format!("failed to create client: {e}")))?;
        Ok(Self { client })
    }

    /// Get an async connection from the client.
    async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection, CacheError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CacheError::new(format!("connection error: {e}")))
    }
}

impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        let mut conn = self.get_connection().await?;

        let result: Option<Vec<u8>> =
            conn.get(key).await.map_err(|e| CacheError::new(format!("get error: {e}")))?;

        Ok(result.map(Bytes::from))
    }

    async fn set(&self, key: &str, value: Bytes) -> Result<(), CacheError> {
        let mut conn = self.get_connection().await?;

        conn.set::<_, _, ()>(key, value.as_ref())
            .await
            .map_err(|e| CacheError::new(format!("set error: {e}")))?;

        Ok(())
    }
}
