//! Head-pointer provider contract.

use alloy_primitives::BlockNumber;

/// Provider of the chain head pointers consumed by the rewriter.
///
/// Each pointer is a concrete block height, monotonically non-decreasing
/// over the provider's lifetime. How the pointers are kept fresh
/// (polling, subscription) is the implementor's concern.
pub trait HeadSource: Send + Sync {
    /// The latest reported block height.
    fn latest(&self) -> BlockNumber;

    /// The safe block height.
    fn safe(&self) -> BlockNumber;

    /// The finalized block height.
    fn finalized(&self) -> BlockNumber;
}
