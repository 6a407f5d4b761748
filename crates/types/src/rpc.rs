//! JSON-RPC request and response envelopes.
//!
//! Parameters and results are kept as raw JSON ([`RawValue`]) so the
//! proxy never deserializes payloads it does not need to inspect.

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

/// A JSON-RPC request envelope.
///
/// The `params` payload is untyped: its element types vary per method.
/// The `id` is an opaque correlation value echoed back by responses; it
/// never participates in cache keys.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RpcRequest {
    /// The JSON-RPC version (should be "2.0").
    pub jsonrpc: String,
    /// The method name.
    pub method: String,
    /// The request parameters (kept as raw JSON).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Box<RawValue>>,
    /// The request ID (optional for notifications).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
}

impl RpcRequest {
    /// Create a new request with no parameters and no id.
    #[must_use]
    pub fn new(method: impl Into<String>) -> Self {
        Self { jsonrpc: "2.0".to_string(), method: method.into(), params: None, id: None }
    }

    /// Set the raw parameter payload.
    #[must_use]
    pub fn with_params(mut self, params: Box<RawValue>) -> Self {
        self.params = Some(params);
        self
    }

    /// Set the request id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<serde_json::Value>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Get the method name.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Check if this is a notification (no id or null id).
    #[must_use]
    pub const fn is_notification(&self) -> bool {
        self.id.is_none() || matches!(&self.id, Some(serde_json::Value::Null))
    }

    /// The correlation id of this request, with a missing id read as null.
    #[must_use]
    pub fn correlation_id(&self) -> serde_json::Value {
        self.id.clone().unwrap_or(serde_json::Value::Null)
    }

    /// Decode the parameter payload as an ordered sequence of values.
    ///
    /// Returns `None` if the request carries no `params` field at all.
    ///
    /// # Errors
    ///
    /// Returns the decode error if `params` is present but not a JSON array.
    pub fn param_values(&self) -> Option<Result<Vec<serde_json::Value>, serde_json::Error>> {
        self.params.as_ref().map(|raw| serde_json::from_str(raw.get()))
    }
}

/// A JSON-RPC response envelope.
///
/// Exactly one of `result` and `error` is present. The `id` must echo
/// the correlation id of the request it answers; callers enforce this.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RpcResponse {
    /// The JSON-RPC version (always "2.0").
    pub jsonrpc: String,
    /// The response result (mutually exclusive with error).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Box<RawValue>>,
    /// The response error (mutually exclusive with result).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorPayload>,
    /// The request ID.
    #[serde(default)]
    pub id: serde_json::Value,
}

impl RpcResponse {
    /// Create a successful response.
    #[must_use]
    pub fn success(id: serde_json::Value, result: Box<RawValue>) -> Self {
        Self { jsonrpc: "2.0".to_string(), result: Some(result), error: None, id }
    }

    /// Create an error response.
    #[must_use]
    pub fn error(id: serde_json::Value, error: RpcErrorPayload) -> Self {
        Self { jsonrpc: "2.0".to_string(), result: None, error: Some(error), id }
    }

    /// Check if this response is an error.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// A JSON-RPC error object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RpcErrorPayload {
    /// The error code.
    pub code: i64,
    /// The error message.
    pub message: String,
    /// Optional additional data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Box<RawValue>>,
}

impl RpcErrorPayload {
    /// Create a new error payload.
    #[must_use]
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), data: None }
    }

    /// Create a new error payload with data.
    #[must_use]
    pub fn with_data(code: i64, message: impl Into<String>, data: Box<RawValue>) -> Self {
        Self { code, message: message.into(), data: Some(data) }
    }

    /// Parse error (-32700).
    #[must_use]
    pub fn parse_error() -> Self {
        Self::new(-32700, "Parse error")
    }

    /// Invalid request (-32600).
    #[must_use]
    pub fn invalid_request() -> Self {
        Self::new(-32600, "Invalid Request")
    }

    /// Method not found (-32601).
    #[must_use]
    pub fn method_not_found() -> Self {
        Self::new(-32601, "Method not found")
    }

    /// Invalid params (-32602).
    #[must_use]
    pub fn invalid_params() -> Self {
        Self::new(-32602, "Invalid params")
    }

    /// Internal error (-32603).
    #[must_use]
    pub fn internal_error() -> Self {
        Self::new(-32603, "Internal error")
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_request_round_trip() {
        let raw = r#"{"jsonrpc":"2.0","method":"starknet_call","params":[{"to":"0x1"},"latest"],"id":1}"#;
        let req: RpcRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(req.method(), "starknet_call");
        assert!(!req.is_notification());

        let encoded = serde_json::to_string(&req).unwrap();
        let reparsed: RpcRequest = serde_json::from_str(&encoded).unwrap();
        assert_eq!(reparsed.method(), "starknet_call");
        assert_eq!(reparsed.id, Some(json!(1)));
    }

    #[test]
    fn test_request_without_params() {
        let raw = r#"{"jsonrpc":"2.0","method":"starknet_chainId","id":1}"#;
        let req: RpcRequest = serde_json::from_str(raw).unwrap();
        assert!(req.params.is_none());
        assert!(req.param_values().is_none());
    }

    #[test]
    fn test_param_values_decodes_sequence() {
        let raw = r#"{"jsonrpc":"2.0","method":"starknet_getStorageAt","params":["0x1","0x2","latest"],"id":1}"#;
        let req: RpcRequest = serde_json::from_str(raw).unwrap();
        let values = req.param_values().unwrap().unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(values[2], json!("latest"));
    }

    #[test]
    fn test_param_values_rejects_non_array() {
        let raw = r#"{"jsonrpc":"2.0","method":"starknet_call","params":{"to":"0x1"},"id":1}"#;
        let req: RpcRequest = serde_json::from_str(raw).unwrap();
        assert!(req.param_values().unwrap().is_err());
    }

    #[rstest]
    #[case::missing_id(r#"{"jsonrpc":"2.0","method":"m"}"#, true)]
    #[case::null_id(r#"{"jsonrpc":"2.0","method":"m","id":null}"#, true)]
    #[case::numeric_id(r#"{"jsonrpc":"2.0","method":"m","id":7}"#, false)]
    #[case::string_id(r#"{"jsonrpc":"2.0","method":"m","id":"abc"}"#, false)]
    fn test_is_notification(#[case] raw: &str, #[case] expected: bool) {
        let req: RpcRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(req.is_notification(), expected);
    }

    #[test]
    fn test_correlation_id_defaults_to_null() {
        let req = RpcRequest::new("starknet_chainId");
        assert_eq!(req.correlation_id(), serde_json::Value::Null);

        let req = req.with_id(3);
        assert_eq!(req.correlation_id(), json!(3));
    }

    #[test]
    fn test_response_success() {
        let result = RawValue::from_string("\"0x1\"".to_string()).unwrap();
        let res = RpcResponse::success(json!(1), result);
        assert!(!res.is_error());

        let encoded = serde_json::to_string(&res).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(parsed["result"], "0x1");
        assert_eq!(parsed["id"], 1);
        assert!(parsed.get("error").is_none());
    }

    #[test]
    fn test_response_error() {
        let res = RpcResponse::error(json!(1), RpcErrorPayload::method_not_found());
        assert!(res.is_error());

        let encoded = serde_json::to_string(&res).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(parsed["error"]["code"], -32601);
        assert!(parsed.get("result").is_none());
    }

    #[rstest]
    #[case::parse(RpcErrorPayload::parse_error(), -32700)]
    #[case::invalid_request(RpcErrorPayload::invalid_request(), -32600)]
    #[case::method_not_found(RpcErrorPayload::method_not_found(), -32601)]
    #[case::invalid_params(RpcErrorPayload::invalid_params(), -32602)]
    #[case::internal(RpcErrorPayload::internal_error(), -32603)]
    fn test_error_payload_codes(#[case] payload: RpcErrorPayload, #[case] expected: i64) {
        assert_eq!(payload.code, expected);
    }

    #[test]
    fn test_error_payload_with_data() {
        let data = RawValue::from_string(r#"{"detail":"info"}"#.to_string()).unwrap();
        let payload = RpcErrorPayload::with_data(-32000, "custom", data);
        assert_eq!(payload.code, -32000);
        assert!(payload.data.is_some());
    }
}
