//! Per-request head-pointer snapshot.

use alloy_primitives::BlockNumber;
use kelp_traits::HeadSource;

/// A per-request snapshot of the chain head pointers.
///
/// Built fresh for each inbound call (or short batch) from externally
/// maintained head state, and never mutated afterwards: every resolution
/// within one context is deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteContext {
    latest: BlockNumber,
    safe: BlockNumber,
    finalized: BlockNumber,
    max_block_range: u64,
}

impl RewriteContext {
    /// Create a new context from explicit head pointers.
    #[must_use]
    pub const fn new(
        latest: BlockNumber,
        safe: BlockNumber,
        finalized: BlockNumber,
        max_block_range: u64,
    ) -> Self {
        Self { latest, safe, finalized, max_block_range }
    }

    /// Snapshot the current head pointers from a [`HeadSource`].
    #[must_use]
    pub fn from_source(source: &impl HeadSource, max_block_range: u64) -> Self {
        Self::new(source.latest(), source.safe(), source.finalized(), max_block_range)
    }

    /// The latest block height.
    #[must_use]
    pub const fn latest(&self) -> BlockNumber {
        self.latest
    }

    /// The safe block height.
    #[must_use]
    pub const fn safe(&self) -> BlockNumber {
        self.safe
    }

    /// The finalized block height.
    #[must_use]
    pub const fn finalized(&self) -> BlockNumber {
        self.finalized
    }

    /// The maximum span between a range's start and end heights.
    /// Zero disables the span check.
    #[must_use]
    pub const fn max_block_range(&self) -> u64 {
        self.max_block_range
    }
}
