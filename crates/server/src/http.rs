//! HTTP handler for JSON-RPC requests.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use kelp_traits::{Backend, Cache};
use kelp_types::{RpcErrorPayload, RpcRequest, RpcResponse};
use tracing::warn;

use crate::Pipeline;

/// Application state shared across all HTTP handlers.
pub struct AppState<C, B> {
    pipeline: Pipeline<C, B>,
    max_request_size: usize,
}

impl<C: Cache, B: Backend> AppState<C, B> {
    /// Create a new application state.
    #[must_use]
    pub const fn new(pipeline: Pipeline<C, B>, max_request_size: usize) -> Self {
        Self { pipeline, max_request_size }
    }

    /// Get the pipeline.
    #[must_use]
    pub const fn pipeline(&self) -> &Pipeline<C, B> {
        &self.pipeline
    }
}

impl<C, B> std::fmt::Debug for AppState<C, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("max_request_size", &self.max_request_size)
            .finish_non_exhaustive()
    }
}

/// A decoded request packet: a single request or a batch.
#[derive(Debug)]
pub enum RpcPacket {
    /// A single request.
    Single(RpcRequest),
    /// A batch of requests.
    Batch(Vec<RpcRequest>),
}

impl RpcPacket {
    /// Decode raw bytes into a packet.
    ///
    /// # Errors
    ///
    /// Returns an error payload for malformed JSON, an empty batch, or
    /// a body that is neither an object nor an array.
    pub fn decode(bytes: &[u8]) -> Result<Self, RpcErrorPayload> {
        let first = bytes.iter().copied().find(|b| !b.is_ascii_whitespace());

        match first {
            Some(b'[') => {
                let requests: Vec<RpcRequest> =
                    serde_json::from_slice(bytes).map_err(|_| RpcErrorPayload::parse_error())?;
                if requests.is_empty() {
                    return Err(RpcErrorPayload::invalid_request());
                }
                Ok(Self::Batch(requests))
            }
            Some(b'{') => {
                let request: RpcRequest =
                    serde_json::from_slice(bytes).map_err(|_| RpcErrorPayload::parse_error())?;
                Ok(Self::Single(request))
            }
            _ => Err(RpcErrorPayload::parse_error()),
        }
    }
}

/// Create the axum router with all endpoints.
///
/// # Endpoints
///
/// - `POST /` - Main RPC endpoint for JSON-RPC requests
/// - `GET /health` - Health check endpoint
pub fn create_router<C: Cache, B: Backend>(state: Arc<AppState<C, B>>) -> Router {
    Router::new()
        .route("/", post(handle_rpc::<C, B>))
        .route("/health", get(health_check))
        .with_state(state)
}

/// Health check endpoint.
///
/// Returns 200 OK if the server is healthy.
pub async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Main RPC handler.
///
/// Decodes the packet and runs each request through the pipeline. A
/// batch shares a single head snapshot so all of its requests observe
/// the same chain state.
pub async fn handle_rpc<C: Cache, B: Backend>(
    State(state): State<Arc<AppState<C, B>>>,
    body: Bytes,
) -> Response {
    if body.len() > state.max_request_size {
        warn!(size = body.len(), "request body exceeds configured maximum");
        let payload = RpcErrorPayload::new(
            -32600,
            format!("request size {} exceeds maximum {}", body.len(), state.max_request_size),
        );
        return Json(RpcResponse::error(serde_json::Value::Null, payload)).into_response();
    }

    match RpcPacket::decode(&body) {
        Err(payload) => {
            Json(RpcResponse::error(serde_json::Value::Null, payload)).into_response()
        }
        Ok(RpcPacket::Single(request)) => {
            Json(state.pipeline.process(request).await).into_response()
        }
        Ok(RpcPacket::Batch(requests)) => {
            let ctx = state.pipeline.context();
            let mut responses = Vec::with_capacity(requests.len());
            for request in requests {
                responses.push(state.pipeline.process_with_context(&ctx, request).await);
            }
            Json(responses).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_decode_single() {
        let packet =
            RpcPacket::decode(br#"{"jsonrpc":"2.0","method":"starknet_chainId","id":1}"#).unwrap();
        assert!(matches!(packet, RpcPacket::Single(req) if req.method() == "starknet_chainId"));
    }

    #[test]
    fn test_decode_batch() {
        let packet = RpcPacket::decode(
            br#"[{"jsonrpc":"2.0","method":"starknet_chainId","id":1},
                 {"jsonrpc":"2.0","method":"net_version","id":2}]"#,
        )
        .unwrap();
        assert!(matches!(packet, RpcPacket::Batch(reqs) if reqs.len() == 2));
    }

    #[test]
    fn test_decode_with_leading_whitespace() {
        let packet =
            RpcPacket::decode(b"  \n\t{\"jsonrpc\":\"2.0\",\"method\":\"m\",\"id\":1}").unwrap();
        assert!(matches!(packet, RpcPacket::Single(_)));
    }

    #[test]
    fn test_decode_empty_batch_rejected() {
        let err = RpcPacket::decode(b"[]").unwrap_err();
        assert_eq!(err.code, -32600);
    }

    #[rstest]
    #[case::empty(b"".as_slice())]
    #[case::not_json(b"not json at all".as_slice())]
    #[case::bare_number(b"123".as_slice())]
    #[case::truncated(br#"{"jsonrpc":"2.0""#.as_slice())]
    fn test_decode_malformed_rejected(#[case] bytes: &[u8]) {
        let err = RpcPacket::decode(bytes).unwrap_err();
        assert_eq!(err.code, -32700);
    }
}
