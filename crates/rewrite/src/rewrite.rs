//! Request and response rewriting.
//!
//! The entry point is [`rewrite_tags`]: response synthesis runs first
//! and short-circuits the backend entirely when it produces an answer;
//! otherwise the per-method parameter descriptors drive request
//! canonicalization.

use kelp_types::{RpcRequest, RpcResponse, hex::encode_height};
use serde_json::{Value, value::RawValue};

use crate::{RewriteContext, RewriteError, resolve_block_ref, resolve_tag};

/// Outcome of a rewrite pass.
///
/// Rewriting never mutates the inbound request: a changed request is
/// returned as a new value and the original stays untouched, so a
/// cached or retried request can never carry a prior rewrite.
#[derive(Debug, Clone)]
pub enum RewriteOutcome {
    /// The request needs no rewriting; forward it as-is.
    Unchanged,
    /// Dispatch this rewritten request to the backend instead of the
    /// original.
    Request(RpcRequest),
    /// A complete response was synthesized; the backend must not be
    /// called.
    Response(RpcResponse),
}

impl RewriteOutcome {
    /// Returns `true` if the request was left unchanged.
    #[must_use]
    pub const fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }
}

/// Parameter-rewrite descriptor for a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamRewrite {
    /// Position of the block-reference parameter.
    pub position: usize,
    /// Whether the parameter must be present for a rewrite to apply.
    pub required: bool,
    /// Whether the parameter uses the extended "number or hash" form.
    pub block_id_form: bool,
}

impl ParamRewrite {
    const fn new(position: usize, required: bool, block_id_form: bool) -> Self {
        Self { position, required, block_id_form }
    }
}

/// Look up the parameter-rewrite descriptor for a method.
///
/// Methods absent from this table are forwarded untouched.
#[must_use]
pub fn rewrite_descriptor(method: &str) -> Option<ParamRewrite> {
    let descriptor = match method {
        "debug_getRawReceipts" | "consensus_getReceipts" => ParamRewrite::new(0, true, false),
        "starknet_call" => ParamRewrite::new(1, false, true),
        "starknet_getStorageAt" => ParamRewrite::new(2, false, true),
        "starknet_getBlockTransactionCount"
        | "starknet_getBlockByNumber"
        | "starknet_getTransactionByBlockIdAndIndex" => ParamRewrite::new(0, false, false),
        _ => return None,
    };
    Some(descriptor)
}

/// Rewrite a request/response pair against the given head snapshot.
///
/// Runs response synthesis first; when it reports a synthesized
/// response, request rewriting is never consulted and the backend must
/// be skipped. Otherwise the request is canonicalized.
///
/// # Errors
///
/// Propagates [`RewriteError`] from request rewriting; the caller
/// should surface it as a call failure rather than dispatching.
pub fn rewrite_tags(
    ctx: &RewriteContext,
    request: &RpcRequest,
) -> Result<RewriteOutcome, RewriteError> {
    if let Some(response) = rewrite_response(ctx, request) {
        return Ok(RewriteOutcome::Response(response));
    }
    rewrite_request(ctx, request)
}

/// Synthesize a response directly from the head snapshot, if the method
/// allows it.
///
/// `starknet_blockNumber` is answered from `ctx.latest` without a
/// backend round trip, keeping the answer consistent with the head
/// value every other in-flight rewrite is using.
#[must_use]
pub fn rewrite_response(ctx: &RewriteContext, request: &RpcRequest) -> Option<RpcResponse> {
    match request.method() {
        "starknet_blockNumber" => {
            let result = RawValue::from_string(format!("\"{}\"", encode_height(ctx.latest())))
                .expect("hex heights are valid JSON strings");
            Some(RpcResponse::success(request.correlation_id(), result))
        }
        _ => None,
    }
}

/// Canonicalize a request's block-reference parameter, if its method
/// has one.
///
/// # Errors
///
/// Returns [`RewriteError`] when the parameter slot is malformed, a
/// concrete height is out of range, or a range span is too large.
pub fn rewrite_request(
    ctx: &RewriteContext,
    request: &RpcRequest,
) -> Result<RewriteOutcome, RewriteError> {
    match rewrite_descriptor(request.method()) {
        Some(descriptor) => rewrite_param(ctx, request, descriptor),
        None => Ok(RewriteOutcome::Unchanged),
    }
}

fn rewrite_param(
    ctx: &RewriteContext,
    request: &RpcRequest,
    descriptor: ParamRewrite,
) -> Result<RewriteOutcome, RewriteError> {
    let ParamRewrite { position, required, block_id_form } = descriptor;

    let Some(decoded) = request.param_values() else {
        return Err(RewriteError::InvalidParams("missing params".to_string()));
    };
    let mut values = decoded
        .map_err(|e| RewriteError::InvalidParams(format!("params are not a sequence: {e}")))?;

    // An omitted block argument defaults to head; a sequence that is
    // genuinely too short passes through for the backend to judge.
    if values.len() == position && !required {
        values.push(Value::String("latest".to_string()));
    } else if values.len() <= position {
        return Ok(RewriteOutcome::Unchanged);
    }

    let replacement = if block_id_form {
        resolve_block_ref(ctx, &values[position])?
    } else {
        match &values[position] {
            Value::String(tag) => resolve_tag(ctx, tag)?.map(Value::String),
            _ => {
                return Err(RewriteError::InvalidParams(
                    "expected a string block reference".to_string(),
                ));
            }
        }
    };

    let Some(resolved) = replacement else {
        return Ok(RewriteOutcome::Unchanged);
    };

    values[position] = resolved;
    let params = serde_json::value::to_raw_value(&values)
        .map_err(|e| RewriteError::InvalidParams(format!("failed to re-encode params: {e}")))?;

    let mut rewritten = request.clone();
    rewritten.params = Some(params);
    Ok(RewriteOutcome::Request(rewritten))
}
