//! Per-request orchestration: rewrite, cache, backend.

use std::sync::Arc;

use kelp_backend::HeadState;
use kelp_cache::RpcCache;
use kelp_rewrite::{RewriteContext, RewriteOutcome, rewrite_tags};
use kelp_traits::{Backend, Cache};
use kelp_types::{RpcRequest, RpcResponse};
use tracing::{debug, warn};

/// The proxy pipeline.
///
/// For each call: rewrite against a head snapshot (which may answer the
/// call outright), then consult the cache, then the backend, then
/// populate the cache with the response that is actually returned.
///
/// Store failures never fail a call: a read failure falls through to
/// the backend and a write failure is logged, since caching is an
/// optimization rather than a correctness requirement.
#[derive(Debug)]
pub struct Pipeline<C, B> {
    cache: Option<RpcCache<C>>,
    backend: B,
    head: Arc<HeadState>,
    max_block_range: u64,
}

impl<C: Cache, B: Backend> Pipeline<C, B> {
    /// Create a new pipeline.
    #[must_use]
    pub const fn new(
        cache: Option<RpcCache<C>>,
        backend: B,
        head: Arc<HeadState>,
        max_block_range: u64,
    ) -> Self {
        Self { cache, backend, head, max_block_range }
    }

    /// Snapshot the current head pointers into a rewrite context.
    #[must_use]
    pub fn context(&self) -> RewriteContext {
        RewriteContext::from_source(self.head.as_ref(), self.max_block_range)
    }

    /// Process a single request against a fresh head snapshot.
    pub async fn process(&self, request: RpcRequest) -> RpcResponse {
        let ctx = self.context();
        self.process_with_context(&ctx, request).await
    }

    /// Process a request against an existing head snapshot.
    ///
    /// Batches share one snapshot so every request in the packet sees
    /// the same head.
    pub async fn process_with_context(
        &self,
        ctx: &RewriteContext,
        request: RpcRequest,
    ) -> RpcResponse {
        let correlation_id = request.correlation_id();
        let method = request.method().to_string();

        let request = match rewrite_tags(ctx, &request) {
            Ok(RewriteOutcome::Response(response)) => {
                debug!(method = %method, "request answered from head state");
                return response;
            }
            Ok(RewriteOutcome::Request(rewritten)) => rewritten,
            Ok(RewriteOutcome::Unchanged) => request,
            Err(e) => {
                debug!(method = %method, error = %e, "rewrite rejected request");
                return RpcResponse::error(correlation_id, e.to_error_payload());
            }
        };

        if let Some(cache) = &self.cache {
            match cache.get_rpc(&request).await {
                Ok(Some(response)) => {
                    debug!(method = %method, "cache hit");
                    return response;
                }
                Ok(None) => {}
                Err(e) => warn!(method = %method, error = %e, "cache read failed"),
            }
        }

        let response = match self.backend.forward(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(method = %method, error = %e, "backend call failed");
                return RpcResponse::error(correlation_id, e.to_error_payload());
            }
        };

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put_rpc(&request, &response).await {
                warn!(method = %method, error = %e, "cache write failed");
            }
        }

        response
    }
}
