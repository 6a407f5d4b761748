//! Tag and block-reference resolution.
//!
//! Symbolic tags resolve to concrete heights from the context; concrete
//! heights are validated against the head; full block hashes are
//! inherently canonical and pass through untouched.

use alloy_primitives::BlockNumber;
use kelp_types::hex::{encode_height, is_block_hash, parse_height};
use serde_json::Value;

use crate::{RewriteContext, RewriteError};

/// Resolve a plain string block reference.
///
/// Returns `Some(resolved)` when the value changed (a symbolic tag was
/// replaced by a concrete hex height) and `None` when the value was
/// already concrete and valid.
///
/// # Errors
///
/// Returns [`RewriteError::BlockOutOfRange`] for a concrete height above
/// the context's latest, and [`RewriteError::InvalidParams`] for strings
/// that are neither a tag, a height, nor a hash.
pub fn resolve_tag(ctx: &RewriteContext, tag: &str) -> Result<Option<String>, RewriteError> {
    match tag {
        "latest" => Ok(Some(encode_height(ctx.latest()))),
        "safe" => Ok(Some(encode_height(ctx.safe()))),
        "finalized" => Ok(Some(encode_height(ctx.finalized()))),
        "earliest" => Ok(Some(encode_height(0))),
        "pending" => Ok(Some(encode_height(ctx.latest() + 1))),
        concrete => {
            // Hashes are self-describing; only heights are range-checked.
            if is_block_hash(concrete) {
                return Ok(None);
            }
            let height = parse_height(concrete).ok_or_else(|| {
                RewriteError::InvalidParams(format!(
                    "expected a block tag, height, or hash, got {concrete:?}"
                ))
            })?;
            ensure_in_range(ctx, height)?;
            Ok(None)
        }
    }
}

/// Resolve a block reference in the extended "number or hash" form.
///
/// Accepts a structured object (`block_hash`, `block_number`, or a
/// `from_block`/`to_block` range) or falls back to the plain string
/// disposition. Returns `Some(resolved)` when the value changed.
///
/// # Errors
///
/// Returns [`RewriteError::RangeTooLarge`] when a range's span exceeds
/// the context's maximum, [`RewriteError::BlockOutOfRange`] for heights
/// above latest, and [`RewriteError::InvalidParams`] for anything that
/// is neither a recognized object nor a string.
pub fn resolve_block_ref(
    ctx: &RewriteContext,
    value: &Value,
) -> Result<Option<Value>, RewriteError> {
    match value {
        Value::Object(fields) => resolve_block_object(ctx, fields),
        Value::String(tag) => Ok(resolve_tag(ctx, tag)?.map(Value::String)),
        _ => Err(RewriteError::InvalidParams(
            "expected a structured block reference or a string".to_string(),
        )),
    }
}

fn resolve_block_object(
    ctx: &RewriteContext,
    fields: &serde_json::Map<String, Value>,
) -> Result<Option<Value>, RewriteError> {
    if let Some(hash) = fields.get("block_hash") {
        let Value::String(hash) = hash else {
            return Err(RewriteError::InvalidParams("expected a string block hash".to_string()));
        };
        if !is_block_hash(hash) {
            return Err(RewriteError::InvalidParams(format!("malformed block hash: {hash:?}")));
        }
        return Ok(None);
    }

    if let Some(height) = fields.get("block_number") {
        let (resolved, changed) = resolve_height_bound(ctx, height)?;
        if !changed {
            return Ok(None);
        }
        return Ok(Some(serde_json::json!({ "block_number": encode_height(resolved) })));
    }

    if let (Some(from), Some(to)) = (fields.get("from_block"), fields.get("to_block")) {
        let (from, from_changed) = resolve_height_bound(ctx, from)?;
        let (to, to_changed) = resolve_height_bound(ctx, to)?;

        let span = to.checked_sub(from).ok_or_else(|| {
            RewriteError::InvalidParams(format!("block range is inverted: {from} > {to}"))
        })?;
        if ctx.max_block_range() > 0 && span > ctx.max_block_range() {
            return Err(RewriteError::RangeTooLarge { span, max: ctx.max_block_range() });
        }

        if !(from_changed || to_changed) {
            return Ok(None);
        }
        return Ok(Some(serde_json::json!({
            "from_block": encode_height(from),
            "to_block": encode_height(to),
        })));
    }

    Err(RewriteError::InvalidParams("unrecognized block reference object".to_string()))
}

/// Resolve a range bound or structured height to a concrete value.
///
/// Unlike [`resolve_tag`], bounds must be heights: a hash cannot anchor
/// a range.
fn resolve_height_bound(
    ctx: &RewriteContext,
    value: &Value,
) -> Result<(BlockNumber, bool), RewriteError> {
    match value {
        Value::Number(n) => {
            let height = n.as_u64().ok_or_else(|| {
                RewriteError::InvalidParams(format!("expected an unsigned block height, got {n}"))
            })?;
            ensure_in_range(ctx, height)?;
            Ok((height, false))
        }
        Value::String(s) => match s.as_str() {
            "latest" => Ok((ctx.latest(), true)),
            "safe" => Ok((ctx.safe(), true)),
            "finalized" => Ok((ctx.finalized(), true)),
            "earliest" => Ok((0, true)),
            "pending" => Ok((ctx.latest() + 1, true)),
            concrete => {
                let height = parse_height(concrete).ok_or_else(|| {
                    RewriteError::InvalidParams(format!("expected a block height, got {concrete:?}"))
                })?;
                ensure_in_range(ctx, height)?;
                Ok((height, false))
            }
        },
        _ => Err(RewriteError::InvalidParams("expected a block height or tag".to_string())),
    }
}

fn ensure_in_range(ctx: &RewriteContext, height: BlockNumber) -> Result<(), RewriteError> {
    if height > ctx.latest() {
        return Err(RewriteError::BlockOutOfRange { height, latest: ctx.latest() });
    }
    Ok(())
}
