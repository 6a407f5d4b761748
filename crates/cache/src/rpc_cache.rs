//! Method-aware cache for immutable RPC responses.
//!
//! Only requests that provably denote an immutable point in chain
//! history are cached: zero-parameter chain constants, and methods that
//! address history by a full block hash. Heights, symbolic tags, and
//! unrecognized parameter shapes never reach the store, which is what
//! makes a stateless cache safe in front of an advancing, occasionally
//! reorganizing chain head.

use bytes::Bytes;
use kelp_traits::{Cache, CacheError};
use kelp_types::{RpcRequest, RpcResponse, hex::is_block_hash};

/// Caching policy for an RPC method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Zero-parameter method whose result is a process-lifetime constant
    /// of the backend.
    Constant,
    /// Method addressing immutable history by a full block hash at a
    /// known parameter position.
    BlockHash {
        /// Position of the block-hash parameter.
        position: usize,
    },
}

/// Look up the caching policy for a method.
///
/// Methods absent from this table are never cached.
fn method_policy(method: &str) -> Option<CachePolicy> {
    let policy = match method {
        "starknet_chainId" | "net_version" => CachePolicy::Constant,
        "starknet_getBlockWithTxs"
        | "starknet_getBlockTransactionCount"
        | "starknet_getTransactionByBlockIdAndIndex"
        | "debug_getRawReceipts"
        | "consensus_getReceipts" => CachePolicy::BlockHash { position: 0 },
        _ => return None,
    };
    Some(policy)
}

/// Store-backed cache for immutable RPC responses.
///
/// Stored payloads are correlation-id-agnostic: `get_rpc` substitutes
/// the requesting request's id on every hit, and keys never include it.
/// A key, once written, is never rebound to a different value.
#[derive(Debug)]
pub struct RpcCache<C> {
    store: C,
}

impl<C: Cache> RpcCache<C> {
    /// Create a new RPC cache over the given store.
    #[must_use]
    pub const fn new(store: C) -> Self {
        Self { store }
    }

    /// Derive the cache key for a request, if it is eligible.
    ///
    /// Eligibility depends solely on the method and the shape of the
    /// parameters, never on response content. Params are decoded and
    /// re-encoded so that incidental formatting (whitespace, object key
    /// order) cannot split one logical query across several keys; the
    /// correlation id never enters the key. Classification fails closed:
    /// any parameter shape this function does not recognize is simply
    /// not cached.
    #[must_use]
    pub fn cache_key(request: &RpcRequest) -> Option<String> {
        let policy = method_policy(request.method())?;

        let values = match request.param_values() {
            None => Vec::new(),
            Some(Ok(values)) => values,
            Some(Err(_)) => return None,
        };

        match policy {
            CachePolicy::Constant => {
                if !values.is_empty() {
                    return None;
                }
            }
            CachePolicy::BlockHash { position } => match values.get(position) {
                Some(serde_json::Value::String(s)) if is_block_hash(s) => {}
                _ => return None,
            },
        }

        let params = serde_json::to_string(&values).unwrap_or_else(|_| "[]".to_string());
        Some(format!("{}:{}", request.method(), params))
    }

    /// Check whether a request is eligible for caching.
    #[must_use]
    pub fn is_cacheable(request: &RpcRequest) -> bool {
        Self::cache_key(request).is_some()
    }

    /// Get the cached response for a request.
    ///
    /// Returns `Ok(None)` for ineligible requests and for cache misses;
    /// neither is a fault. On a hit, the stored payload is returned with
    /// the requesting request's correlation id substituted in.
    ///
    /// # Errors
    ///
    /// Returns a `CacheError` only for structural failures: a store read
    /// failure, or a stored payload that does not decode.
    pub async fn get_rpc(&self, request: &RpcRequest) -> Result<Option<RpcResponse>, CacheError> {
        let Some(key) = Self::cache_key(request) else {
            return Ok(None);
        };

        let Some(bytes) = self.store.get(&key).await? else {
            return Ok(None);
        };

        let mut response: RpcResponse = serde_json::from_slice(&bytes)
            .map_err(|e| CacheError::new(format!("malformed cached payload for {key}: {e}")))?;
        response.id = request.correlation_id();
        Ok(Some(response))
    }

    /// Cache a response for a request.
    ///
    /// A silent no-op for ineligible requests; callers need not
    /// pre-check eligibility. The response is stored with its
    /// correlation id stripped.
    ///
    /// # Errors
    ///
    /// Returns a `CacheError` if the store write fails.
    pub async fn put_rpc(
        &self,
        request: &RpcRequest,
        response: &RpcResponse,
    ) -> Result<(), CacheError> {
        let Some(key) = Self::cache_key(request) else {
            return Ok(());
        };

        let mut stored = response.clone();
        stored.id = serde_json::Value::Null;
        let bytes = serde_json::to_vec(&stored)
            .map_err(|e| CacheError::new(format!("failed to encode response: {e}")))?;
        self.store.set(&key, Bytes::from(bytes)).await
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::{json, value::RawValue};

    use super::*;
    use crate::MemoryCache;

    const BLOCK_HASH: &str = "0xc6ef2fc5426d6ad6fd9e2a26abeab0aa2411b7ab17f30a99d3cb96aed1d1055b";

    fn test_cache() -> RpcCache<MemoryCache> {
        RpcCache::new(MemoryCache::new(100))
    }

    fn request(method: &str, params: Option<serde_json::Value>) -> RpcRequest {
        let mut req = RpcRequest::new(method).with_id(1);
        if let Some(params) = params {
            req = req.with_params(
                RawValue::from_string(params.to_string()).expect("valid params json"),
            );
        }
        req
    }

    fn response(result: serde_json::Value) -> RpcResponse {
        RpcResponse::success(json!(1), RawValue::from_string(result.to_string()).unwrap())
    }

    // === Classification tests ===

    #[rstest]
    #[case::chain_id("starknet_chainId", None, true)]
    #[case::net_version("net_version", None, true)]
    #[case::net_version_empty_params("net_version", Some(json!([])), true)]
    #[case::chain_id_with_params("starknet_chainId", Some(json!(["0x1"])), false)]
    #[case::block_by_hash("starknet_getBlockWithTxs", Some(json!([BLOCK_HASH, "false"])), true)]
    #[case::tx_count_by_hash("starknet_getBlockTransactionCount", Some(json!([BLOCK_HASH])), true)]
    #[case::tx_by_index("starknet_getTransactionByBlockIdAndIndex", Some(json!([BLOCK_HASH, "0x0"])), true)]
    #[case::raw_receipts("debug_getRawReceipts", Some(json!([BLOCK_HASH])), true)]
    #[case::consensus_receipts("consensus_getReceipts", Some(json!([BLOCK_HASH])), true)]
    #[case::short_hex("debug_getRawReceipts", Some(json!(["0x100"])), false)]
    #[case::tag("debug_getRawReceipts", Some(json!(["latest"])), false)]
    #[case::missing_params("starknet_getBlockWithTxs", None, false)]
    #[case::empty_params("starknet_getBlockWithTxs", Some(json!([])), false)]
    #[case::numeric_param("debug_getRawReceipts", Some(json!([100])), false)]
    #[case::object_param("starknet_getBlockWithTxs", Some(json!([{"block_hash": BLOCK_HASH}])), false)]
    #[case::syncing("starknet_syncing", None, false)]
    #[case::block_number("starknet_blockNumber", None, false)]
    #[case::call("starknet_call", None, false)]
    #[case::unknown_method("starknet_madeUp", Some(json!([BLOCK_HASH])), false)]
    fn test_cacheability(
        #[case] method: &str,
        #[case] params: Option<serde_json::Value>,
        #[case] expected: bool,
    ) {
        let req = request(method, params);
        assert_eq!(RpcCache::<MemoryCache>::is_cacheable(&req), expected);
    }

    /// Classification fails closed on a params payload that is not an array.
    #[test]
    fn test_non_array_params_not_cacheable() {
        let req = request("debug_getRawReceipts", Some(json!({"block": BLOCK_HASH})));
        assert!(!RpcCache::<MemoryCache>::is_cacheable(&req));
    }

    // === Key derivation tests ===

    /// Two requests that differ only in formatting map to the same key.
    #[test]
    fn test_key_is_formatting_independent() {
        let compact = RpcRequest::new("starknet_getTransactionByBlockIdAndIndex").with_params(
            RawValue::from_string(format!(r#"["{BLOCK_HASH}","0x1"]"#)).unwrap(),
        );
        let spaced = RpcRequest::new("starknet_getTransactionByBlockIdAndIndex").with_params(
            RawValue::from_string(format!(r#"[ "{BLOCK_HASH}" ,  "0x1" ]"#)).unwrap(),
        );

        let key1 = RpcCache::<MemoryCache>::cache_key(&compact).unwrap();
        let key2 = RpcCache::<MemoryCache>::cache_key(&spaced).unwrap();
        assert_eq!(key1, key2);
    }

    /// The correlation id never enters the key.
    #[test]
    fn test_key_ignores_correlation_id() {
        let req1 = request("debug_getRawReceipts", Some(json!([BLOCK_HASH]))).with_id(1);
        let req2 = request("debug_getRawReceipts", Some(json!([BLOCK_HASH]))).with_id("other");

        assert_eq!(
            RpcCache::<MemoryCache>::cache_key(&req1),
            RpcCache::<MemoryCache>::cache_key(&req2)
        );
    }

    /// Absent params and empty params derive the same key for constants.
    #[test]
    fn test_constant_key_normalizes_missing_params() {
        let absent = request("net_version", None);
        let empty = request("net_version", Some(json!([])));

        assert_eq!(
            RpcCache::<MemoryCache>::cache_key(&absent),
            RpcCache::<MemoryCache>::cache_key(&empty)
        );
    }

    // === Round-trip tests ===

    /// Immutable requests round-trip through the cache.
    #[rstest]
    #[case::chain_id("starknet_chainId", None, json!("0xff"))]
    #[case::net_version("net_version", None, json!("9999"))]
    #[case::tx_count(
        "starknet_getBlockTransactionCount",
        Some(json!(["0xb903239f8543d04b5dc1ba6579132b143087c68db1b2168786408fcbce568238"])),
        json!({"starknet_getBlockTransactionCount": "!"})
    )]
    #[case::block_with_txs(
        "starknet_getBlockWithTxs",
        Some(json!([BLOCK_HASH, "false"])),
        json!({"starknet_getBlockWithTxs": "!"})
    )]
    #[case::raw_receipts("debug_getRawReceipts", Some(json!([BLOCK_HASH])), json!(["a"]))]
    #[tokio::test]
    async fn test_immutable_rpcs_round_trip(
        #[case] method: &str,
        #[case] params: Option<serde_json::Value>,
        #[case] result: serde_json::Value,
    ) {
        let cache = test_cache();
        let req = request(method, params);
        let res = response(result.clone());

        cache.put_rpc(&req, &res).await.unwrap();

        let cached = cache.get_rpc(&req).await.unwrap().expect("expected cache hit");
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(cached.result.unwrap().get()).unwrap(),
            result
        );
        assert_eq!(cached.id, json!(1));
    }

    /// Ineligible requests are silently not cached.
    #[rstest]
    #[case::syncing("starknet_syncing", None)]
    #[case::block_number("starknet_blockNumber", None)]
    #[case::block_no_params("starknet_getBlockWithTxs", None)]
    #[case::call("starknet_call", None)]
    #[case::short_hex("debug_getRawReceipts", Some(json!(["0x100"])))]
    #[tokio::test]
    async fn test_unsupported_requests_absent(
        #[case] method: &str,
        #[case] params: Option<serde_json::Value>,
    ) {
        let cache = test_cache();
        let req = request(method, params);
        let res = response(json!([method]));

        cache.put_rpc(&req, &res).await.unwrap();

        let cached = cache.get_rpc(&req).await.unwrap();
        assert!(cached.is_none());
    }

    /// A hit carries the id of the requesting request, not the stored one.
    #[tokio::test]
    async fn test_correlation_id_substitution() {
        let cache = test_cache();
        let req = request("debug_getRawReceipts", Some(json!([BLOCK_HASH]))).with_id(1);
        let res = response(json!(["a"]));

        cache.put_rpc(&req, &res).await.unwrap();

        let other = request("debug_getRawReceipts", Some(json!([BLOCK_HASH]))).with_id("xyz");
        let cached = cache.get_rpc(&other).await.unwrap().unwrap();
        assert_eq!(cached.id, json!("xyz"));
    }

    /// A miss on an eligible request is a clean absent, not an error.
    #[tokio::test]
    async fn test_eligible_miss() {
        let cache = test_cache();
        let req = request("debug_getRawReceipts", Some(json!([BLOCK_HASH])));

        let cached = cache.get_rpc(&req).await.unwrap();
        assert!(cached.is_none());
    }

    /// A malformed stored payload is a structural error, not a miss.
    #[tokio::test]
    async fn test_malformed_stored_payload_errors() {
        let store = MemoryCache::new(10);
        let req = request("debug_getRawReceipts", Some(json!([BLOCK_HASH])));
        let key = RpcCache::<MemoryCache>::cache_key(&req).unwrap();
        store.set(&key, Bytes::from_static(b"not json")).await.unwrap();

        let cache = RpcCache::new(store);
        assert!(cache.get_rpc(&req).await.is_err());
    }

    /// Error payloads round-trip like results; eligibility never
    /// inspects response content.
    #[tokio::test]
    async fn test_error_response_round_trip() {
        let cache = test_cache();
        let req = request("debug_getRawReceipts", Some(json!([BLOCK_HASH])));
        let res = RpcResponse::error(json!(1), kelp_types::RpcErrorPayload::internal_error());

        cache.put_rpc(&req, &res).await.unwrap();

        let cached = cache.get_rpc(&req).await.unwrap().unwrap();
        assert!(cached.is_error());
    }
}
