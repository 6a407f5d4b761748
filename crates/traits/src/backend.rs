//! Backend forwarding contract.

use std::future::Future;

use kelp_types::{KelpError, RpcRequest, RpcResponse};

/// A JSON-RPC backend the proxy forwards requests to.
pub trait Backend: Send + Sync + 'static {
    /// Backend identifier.
    fn name(&self) -> &str;

    /// RPC endpoint URL.
    fn rpc_url(&self) -> &str;

    /// Forward a request to the backend and return its response.
    fn forward(
        &self,
        request: &RpcRequest,
    ) -> impl Future<Output = Result<RpcResponse, KelpError>> + Send;
}

impl<B: Backend> Backend for std::sync::Arc<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn rpc_url(&self) -> &str {
        (**self).rpc_url()
    }

    fn forward(
        &self,
        request: &RpcRequest,
    ) -> impl Future<Output = Result<RpcResponse, KelpError>> + Send {
        (**self).forward(request)
    }
}
