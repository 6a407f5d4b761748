//! Rewrite error taxonomy.

use alloy_primitives::BlockNumber;
use derive_more::{Debug, Display, Error};
use kelp_types::{RpcErrorPayload, error_codes};

/// Error from a failed rewrite.
///
/// Out-of-range and range-too-large are distinguished values so the
/// pipeline can map them to protocol errors rather than internal faults.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
#[error(ignore)]
pub enum RewriteError {
    /// A parameter slot has the wrong shape or type for its position.
    #[display("invalid block parameter: {_0}")]
    InvalidParams(String),

    /// A concrete height exceeds the current latest block.
    #[display("block {height} is out of range (latest is {latest})")]
    BlockOutOfRange {
        /// The requested height.
        height: BlockNumber,
        /// The latest known height.
        latest: BlockNumber,
    },

    /// A requested span exceeds the configured maximum block range.
    #[display("block range {span} is too large (max is {max})")]
    RangeTooLarge {
        /// The requested span.
        span: u64,
        /// The configured maximum span.
        max: u64,
    },
}

impl RewriteError {
    /// Convert to a JSON-RPC error payload.
    #[must_use]
    pub fn to_error_payload(&self) -> RpcErrorPayload {
        match self {
            Self::InvalidParams(msg) => RpcErrorPayload::new(-32602, msg.clone()),
            Self::BlockOutOfRange { .. } => {
                RpcErrorPayload::new(error_codes::BLOCK_OUT_OF_RANGE, "block is out of range")
            }
            Self::RangeTooLarge { .. } => {
                RpcErrorPayload::new(error_codes::RANGE_TOO_LARGE, "block range is too large")
            }
        }
    }
}
