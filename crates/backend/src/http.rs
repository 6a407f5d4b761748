//! HTTP backend implementation.

use std::{sync::Arc, time::Duration};

use kelp_traits::Backend;
use kelp_types::{KelpError, RpcRequest, RpcResponse};

/// HTTP backend for RPC forwarding.
///
/// A bare HTTP POST + JSON decode; the pipeline decides when a request
/// reaches it at all.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    name: Arc<str>,
    rpc_url: Arc<str>,
    client: reqwest::Client,
}

impl HttpBackend {
    /// Create a new HTTP backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(name: &str, rpc_url: &str, timeout: Duration) -> Result<Self, KelpError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| KelpError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { name: Arc::from(name), rpc_url: Arc::from(rpc_url), client })
    }
}

impl Backend for HttpBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    async fn forward(&self, request: &RpcRequest) -> Result<RpcResponse, KelpError> {
        let response = self
            .client
            .post(self.rpc_url.as_ref())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    KelpError::BackendTimeout { backend: self.name.to_string() }
                } else {
                    KelpError::BackendUnreachable { backend: self.name.to_string() }
                }
            })?;

        if !response.status().is_success() {
            return Err(KelpError::BackendUnreachable { backend: self.name.to_string() });
        }

        response
            .json()
            .await
            .map_err(|e| KelpError::Internal(format!("failed to decode backend response: {e}")))
    }
}
