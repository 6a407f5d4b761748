#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/refcell/kelp/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

use bytes::Bytes;
use kelp_traits::{Backend, Cache, CacheError};
use kelp_types::{KelpError, RpcRequest, RpcResponse};
use serde_json::value::RawValue;

// ============================================================================
// Mock Backend
// ============================================================================

/// Response type for the mock backend.
///
/// # Example
///
/// ```
/// use kelp_test_utils::MockResponse;
///
/// let success = MockResponse::Success(r#"{"jsonrpc":"2.0","id":1,"result":"0x1"}"#.to_string());
/// let error = MockResponse::Error("connection refused".to_string());
/// ```
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Successful JSON response.
    Success(String),
    /// Backend-unreachable error with message.
    Error(String),
}

/// A mock backend for testing.
///
/// Provides scripted responses, call counting, and capture of the last
/// forwarded request.
///
/// # Example
///
/// ```
/// use kelp_test_utils::{MockBackend, MockResponse};
///
/// let backend = MockBackend::new("test-backend")
///     .with_response(MockResponse::Success(r#"{"jsonrpc":"2.0","id":1,"result":"0x1"}"#.to_string()));
///
/// assert_eq!(backend.call_count(), 0);
/// ```
#[derive(Debug)]
pub struct MockBackend {
    name: String,
    url: String,
    responses: Mutex<Vec<MockResponse>>,
    call_count: AtomicUsize,
    last_request: Mutex<Option<RpcRequest>>,
}

impl MockBackend {
    /// Create a new mock backend with the given name.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            url: format!("http://mock-{name}.local"),
            responses: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Add a single response to the queue.
    ///
    /// Responses are consumed in FIFO order. If no responses remain, the
    /// backend returns a default success response echoing the request id.
    #[must_use]
    pub fn with_response(self, response: MockResponse) -> Self {
        self.responses.lock().unwrap().push(response);
        self
    }

    /// Set multiple responses at once.
    #[must_use]
    pub fn with_responses(self, responses: Vec<MockResponse>) -> Self {
        *self.responses.lock().unwrap() = responses;
        self
    }

    /// Get the number of times this backend has been called.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Get the most recently forwarded request, if any.
    pub fn last_request(&self) -> Option<RpcRequest> {
        self.last_request.lock().unwrap().clone()
    }

    /// Get the next response from the queue.
    fn next_response(&self) -> Option<MockResponse> {
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() { None } else { Some(responses.remove(0)) }
    }
}

impl Backend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn rpc_url(&self) -> &str {
        &self.url
    }

    async fn forward(&self, request: &RpcRequest) -> Result<RpcResponse, KelpError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());

        match self.next_response() {
            None => {
                let result = RawValue::from_string("\"0x1\"".to_string()).expect("valid JSON");
                Ok(RpcResponse::success(request.correlation_id(), result))
            }
            Some(MockResponse::Success(json)) => serde_json::from_str(&json)
                .map_err(|e| KelpError::Internal(format!("failed to parse mock response: {e}"))),
            Some(MockResponse::Error(backend)) => Err(KelpError::BackendUnreachable { backend }),
        }
    }
}

// ============================================================================
// Failing Store
// ============================================================================

/// A store whose every operation fails.
///
/// Useful for exercising the pipeline's store-failure tolerance.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingStore;

impl Cache for FailingStore {
    async fn get(&self, _key: &str) -> Result<Option<Bytes>, CacheError> {
        Err(CacheError::new("store is down"))
    }

    async fn set(&self, _key: &str, _value: Bytes) -> Result<(), CacheError> {
        Err(CacheError::new("store is down"))
    }
}

// ============================================================================
// Request Builder
// ============================================================================

/// Builder for JSON-RPC test requests.
///
/// # Example
///
/// ```
/// use kelp_test_utils::RequestBuilder;
/// use serde_json::json;
///
/// let request = RequestBuilder::new("starknet_call")
///     .with_params(json!([{ "to": "0x1" }, "latest"]))
///     .with_id(2)
///     .build();
///
/// assert_eq!(request.method(), "starknet_call");
/// ```
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: String,
    params: Option<serde_json::Value>,
    id: serde_json::Value,
}

impl RequestBuilder {
    /// Create a new request builder with the given method.
    #[must_use]
    pub fn new(method: &str) -> Self {
        Self { method: method.to_string(), params: None, id: serde_json::Value::Number(1.into()) }
    }

    /// Set the request parameters.
    #[must_use]
    pub fn with_params(mut self, params: serde_json::Value) -> Self {
        self.params = Some(params);
        self
    }

    /// Set the request ID.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<serde_json::Value>) -> Self {
        self.id = id.into();
        self
    }

    /// Build the request.
    #[must_use]
    pub fn build(self) -> RpcRequest {
        let mut request = RpcRequest::new(self.method).with_id(self.id);
        if let Some(params) = self.params {
            request = request.with_params(
                RawValue::from_string(params.to_string()).expect("params are valid JSON"),
            );
        }
        request
    }

    /// Build the request as a JSON string.
    #[must_use]
    pub fn build_json(self) -> String {
        serde_json::to_string(&self.build()).expect("requests serialize")
    }
}

// ============================================================================
// Response Builder
// ============================================================================

/// Builder for JSON-RPC test responses.
///
/// # Example
///
/// ```
/// use kelp_test_utils::ResponseBuilder;
/// use serde_json::json;
///
/// let response = ResponseBuilder::success(1, json!("0x1234")).build();
/// assert!(response.contains("result"));
///
/// let error = ResponseBuilder::error(1, -32600, "Invalid Request").build();
/// assert!(error.contains("error"));
/// ```
#[derive(Debug, Clone)]
pub struct ResponseBuilder {
    id: serde_json::Value,
    result: Option<serde_json::Value>,
    error: Option<(i64, String)>,
}

impl ResponseBuilder {
    /// Create a success response builder.
    #[must_use]
    pub fn success(id: impl Into<serde_json::Value>, result: serde_json::Value) -> Self {
        Self { id: id.into(), result: Some(result), error: None }
    }

    /// Create an error response builder.
    #[must_use]
    pub fn error(id: impl Into<serde_json::Value>, code: i64, message: &str) -> Self {
        Self { id: id.into(), result: None, error: Some((code, message.to_string())) }
    }

    /// Build the response as a JSON string.
    #[must_use]
    pub fn build(self) -> String {
        let mut obj = serde_json::json!({
            "jsonrpc": "2.0",
            "id": self.id,
        });

        if let Some(result) = self.result {
            obj["result"] = result;
        }

        if let Some((code, message)) = self.error {
            obj["error"] = serde_json::json!({ "code": code, "message": message });
        }

        serde_json::to_string(&obj).expect("responses serialize")
    }

    /// Build the response as a typed [`RpcResponse`].
    #[must_use]
    pub fn build_response(self) -> RpcResponse {
        serde_json::from_str(&self.build()).expect("built responses parse")
    }
}

// ============================================================================
// Tests
// ============================================================================
