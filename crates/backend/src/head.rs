//! Shared head-pointer state and background poller.
//!
//! [`HeadState`] holds the latest/safe/finalized heights behind atomics;
//! [`HeadPoller`] refreshes them by periodically querying
//! `starknet_blockNumber` on the backend. The rewriter only ever sees
//! per-request snapshots of this state.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use alloy_primitives::BlockNumber;
use kelp_traits::{Backend, HeadSource};
use kelp_types::{KelpError, RpcRequest, hex::parse_height};
use tracing::{debug, warn};

/// Shared head-pointer state with atomic block heights.
///
/// Heights only move forward: updates below the current value are
/// ignored, so readers observe monotonically non-decreasing pointers.
#[derive(Debug)]
pub struct HeadState {
    latest: AtomicU64,
    safe: AtomicU64,
    finalized: AtomicU64,
}

impl Default for HeadState {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadState {
    /// Create a new head state with all pointers at 0.
    #[must_use]
    pub const fn new() -> Self {
        Self { latest: AtomicU64::new(0), safe: AtomicU64::new(0), finalized: AtomicU64::new(0) }
    }

    /// Update all pointers from a polled tip.
    ///
    /// Safe and finalized track the polled tip for now; a
    /// confirmation-depth feed could refine them independently via
    /// [`Self::set_safe`] and [`Self::set_finalized`].
    pub fn update_tip(&self, tip: BlockNumber) {
        self.latest.fetch_max(tip, Ordering::Relaxed);
        self.safe.fetch_max(tip, Ordering::Relaxed);
        self.finalized.fetch_max(tip, Ordering::Relaxed);
    }

    /// Update the safe pointer.
    pub fn set_safe(&self, height: BlockNumber) {
        self.safe.fetch_max(height, Ordering::Relaxed);
    }

    /// Update the finalized pointer.
    pub fn set_finalized(&self, height: BlockNumber) {
        self.finalized.fetch_max(height, Ordering::Relaxed);
    }
}

impl HeadSource for HeadState {
    fn latest(&self) -> BlockNumber {
        self.latest.load(Ordering::Relaxed)
    }

    fn safe(&self) -> BlockNumber {
        self.safe.load(Ordering::Relaxed)
    }

    fn finalized(&self) -> BlockNumber {
        self.finalized.load(Ordering::Relaxed)
    }
}

/// Background poller that keeps a [`HeadState`] fresh.
#[derive(Debug)]
pub struct HeadPoller<B> {
    backend: B,
    state: Arc<HeadState>,
    interval: Duration,
}

impl<B: Backend> HeadPoller<B> {
    /// Create a new head poller.
    #[must_use]
    pub const fn new(backend: B, state: Arc<HeadState>, interval: Duration) -> Self {
        Self { backend, state, interval }
    }

    /// Run the poll loop forever.
    ///
    /// Poll failures are logged and retried on the next tick; stale head
    /// pointers degrade rewriting, they do not break it.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            ticker.tick().await;
            match self.poll_once().await {
                Ok(tip) => {
                    self.state.update_tip(tip);
                    debug!(tip, "refreshed head pointers");
                }
                Err(e) => warn!(error = %e, "head poll failed"),
            }
        }
    }

    /// Query the backend for the current block height.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails or its result is not
    /// a block height.
    pub async fn poll_once(&self) -> Result<BlockNumber, KelpError> {
        let request = RpcRequest::new("starknet_blockNumber").with_id(1);
        let response = self.backend.forward(&request).await?;

        if let Some(error) = response.error {
            return Err(KelpError::Internal(format!(
                "backend error {}: {}",
                error.code, error.message
            )));
        }
        let result = response
            .result
            .ok_or_else(|| KelpError::Internal("empty block number result".to_string()))?;
        parse_tip(result.get())
    }
}

/// Parse a block-height result, accepting both JSON integers and hex
/// strings.
fn parse_tip(raw: &str) -> Result<BlockNumber, KelpError> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| KelpError::Internal(format!("malformed block number result: {e}")))?;

    match &value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => parse_height(s),
        _ => None,
    }
    .ok_or_else(|| KelpError::Internal(format!("not a block height: {value}")))
}

#[cfg(test)]
mod tests {
    use kelp_test_utils::{MockBackend, MockResponse, ResponseBuilder};
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_head_state_starts_at_zero() {
        let state = HeadState::new();
        assert_eq!(state.latest(), 0);
        assert_eq!(state.safe(), 0);
        assert_eq!(state.finalized(), 0);
    }

    #[test]
    fn test_update_tip_moves_all_pointers() {
        let state = HeadState::new();
        state.update_tip(100);

        assert_eq!(state.latest(), 100);
        assert_eq!(state.safe(), 100);
        assert_eq!(state.finalized(), 100);
    }

    /// Pointers never move backwards.
    #[test]
    fn test_update_tip_is_monotonic() {
        let state = HeadState::new();
        state.update_tip(100);
        state.update_tip(50);

        assert_eq!(state.latest(), 100);
    }

    #[test]
    fn test_individual_setters() {
        let state = HeadState::new();
        state.update_tip(100);
        state.set_safe(90);
        state.set_finalized(80);

        // fetch_max keeps the tip-driven values, which are higher.
        assert_eq!(state.safe(), 100);
        assert_eq!(state.finalized(), 100);
    }

    #[rstest]
    #[case::integer("1234", Some(1234))]
    #[case::hex_string("\"0x4d2\"", Some(1234))]
    #[case::zero("0", Some(0))]
    #[case::bool("true", None)]
    #[case::garbage_string("\"not-a-height\"", None)]
    #[case::negative("-1", None)]
    fn test_parse_tip(#[case] raw: &str, #[case] expected: Option<u64>) {
        let parsed = parse_tip(raw).ok();
        assert_eq!(parsed, expected);
    }

    #[tokio::test]
    async fn test_poll_once_reads_tip() {
        let backend = MockBackend::new("mock")
            .with_response(MockResponse::Success(ResponseBuilder::success(1, json!(4321)).build()));
        let poller = HeadPoller::new(backend, Arc::new(HeadState::new()), Duration::from_secs(1));

        let tip = poller.poll_once().await.unwrap();
        assert_eq!(tip, 4321);
    }

    #[tokio::test]
    async fn test_poll_once_propagates_backend_error() {
        let backend =
            MockBackend::new("mock").with_response(MockResponse::Error("offline".to_string()));
        let poller = HeadPoller::new(backend, Arc::new(HeadState::new()), Duration::from_secs(1));

        assert!(poller.poll_once().await.is_err());
    }

    #[tokio::test]
    async fn test_poll_once_rejects_error_payload() {
        let backend = MockBackend::new("mock").with_response(MockResponse::Success(
            ResponseBuilder::error(1, -32603, "node out of sync").build(),
        ));
        let poller = HeadPoller::new(backend, Arc::new(HeadState::new()), Duration::from_secs(1));

        assert!(poller.poll_once().await.is_err());
    }
}
