//! Error types for the kelp proxy.

use derive_more::{Debug, Display, Error};

use crate::RpcErrorPayload;

/// Custom error codes for the kelp proxy.
pub mod error_codes {
    /// Backend offline error code.
    pub const BACKEND_OFFLINE: i64 = -32010;
    /// Backend timeout error code.
    pub const BACKEND_TIMEOUT: i64 = -32011;
    /// Block out of range error code.
    pub const BLOCK_OUT_OF_RANGE: i64 = -32019;
    /// Block range too large error code.
    pub const RANGE_TOO_LARGE: i64 = -32020;
}

/// Error type for the kelp proxy.
#[derive(Debug, Display, Error)]
#[error(ignore)]
pub enum KelpError {
    /// Backend unreachable error.
    #[display("backend unreachable: {backend}")]
    BackendUnreachable {
        /// Name of the unreachable backend.
        backend: String,
    },

    /// Backend timeout error.
    #[display("backend timeout: {backend}")]
    BackendTimeout {
        /// Name of the timed out backend.
        backend: String,
    },

    /// Invalid request error.
    #[display("invalid request: {_0}")]
    InvalidRequest(String),

    /// Internal error.
    #[display("internal error: {_0}")]
    Internal(String),
}

impl KelpError {
    /// Convert to a JSON-RPC error payload.
    #[must_use]
    pub fn to_error_payload(&self) -> RpcErrorPayload {
        match self {
            Self::BackendUnreachable { backend } => RpcErrorPayload::new(
                error_codes::BACKEND_OFFLINE,
                format!("backend {backend} is unreachable"),
            ),
            Self::BackendTimeout { backend } => {
                RpcErrorPayload::new(error_codes::BACKEND_TIMEOUT, format!("backend {backend} timed out"))
            }
            Self::InvalidRequest(msg) => RpcErrorPayload::new(-32600, msg.clone()),
            Self::Internal(_) => RpcErrorPayload::internal_error(),
        }
    }
}
