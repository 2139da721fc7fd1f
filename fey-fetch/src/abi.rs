//! Minimal ABI helpers for zero- and uint-argument calls.
//!
//! Only what the dashboard needs: function selectors, `uint256` argument
//! words and decoding a single `uint256` return word into a `u64`.

use sha3::{Digest, Keccak256};

use fey_core::error::{FeyError, Result};

/// Computes the 4-byte selector for a canonical function signature,
/// e.g. `"tokenCount()"`.
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash[..4]);
    selector
}

/// Encodes call data: selector followed by one 32-byte word per argument.
pub fn encode_call(selector: [u8; 4], args: &[u64]) -> String {
    let mut data = format!("0x{}", hex::encode(selector));
    for arg in args {
        data.push_str(&format!("{arg:064x}"));
    }
    data
}

/// Decodes a hex quantity or `uint256` word into a `u64`.
///
/// Returns `None` for an empty result (`"0x"`), which is what a call to a
/// missing function on a contract without a fallback yields.
pub fn decode_uint(data: &str) -> Result<Option<u64>> {
    let trimmed = data.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.is_empty() {
        return Ok(None);
    }

    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(FeyError::MalformedResponse(format!("not a hex quantity: {trimmed}")));
    }

    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return Ok(Some(0));
    }
    if significant.len() > 16 {
        return Err(FeyError::Overflow {
            target: "u64",
            value: trimmed.to_string(),
        });
    }

    u64::from_str_radix(significant, 16)
        .map(Some)
        .map_err(|e| FeyError::MalformedResponse(e.to_string()))
}
