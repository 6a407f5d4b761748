//! Wire conventions for block references.
//!
//! Block heights are unsigned integers rendered as `0x`-prefixed hex
//! strings; block hashes are fixed-length hex strings.

/// Length of a hex-encoded block hash including the `0x` prefix.
const BLOCK_HASH_LEN: usize = 66;

/// Render a block height as a hex string.
#[must_use]
pub fn encode_height(height: u64) -> String {
    format!("0x{height:x}")
}

/// Parse a `0x`-prefixed hex block height.
///
/// Returns `None` for anything that is not a hex quantity that fits a u64.
#[must_use]
pub fn parse_height(s: &str) -> Option<u64> {
    let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))?;
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(digits, 16).ok()
}

/// Check whether a string is a full, fixed-length block hash.
///
/// A hash uniquely and permanently identifies one block; shorter hex
/// quantities are heights, not hashes.
#[must_use]
pub fn is_block_hash(s: &str) -> bool {
    s.len() == BLOCK_HASH_LEN
        && (s.starts_with("0x") || s.starts_with("0X"))
        && s[2..].bytes().all(|b| b.is_ascii_hexdigit())
}
