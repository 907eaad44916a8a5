//! Helpers for the ABI encoding of token call results.

use alloy_primitives::{Address, B256, Bytes, U256, keccak256};

/// Interface name under which send-style tokens register themselves.
pub const SEND_TOKEN_INTERFACE: &str = "ERC777Token";

/// Hash of [`SEND_TOKEN_INTERFACE`] as used by the interface registry.
pub fn send_token_interface() -> B256 {
    keccak256(SEND_TOKEN_INTERFACE)
}

/// ABI-encode a boolean as a single 32 byte word.
pub fn encode_bool(b: bool) -> Bytes {
    Bytes::from(U256::from(u8::from(b)).to_be_bytes::<32>().to_vec())
}

/// Decode a single-word boolean. Anything but a canonical 0 or 1 is rejected.
pub fn decode_bool(data: &[u8]) -> Option<bool> {
    if data.len() != 32 {
        return None;
    }
    match U256::from_be_slice(data) {
        x if x.is_zero() => Some(false),
        x if x == U256::from(1) => Some(true),
        _ => None,
    }
}

/// Did a token call succeed?
///
/// Tokens that return nothing are accepted, as are tokens returning `true`.
/// A revert, a `false` return or malformed return data are failures.
pub fn call_succeeded(result: &Result<Bytes, Bytes>) -> bool {
    match result {
        Ok(data) => data.is_empty() || decode_bool(data) == Some(true),
        Err(_) => false,
    }
}

/// Storage key of a (owner, token) pair: `keccak256(owner ‖ token)`.
pub fn pair_key(owner: Address, token: Address) -> B256 {
    let mut buf = [0u8; 40];
    buf[..20].copy_from_slice(owner.as_slice());
    buf[20..].copy_from_slice(token.as_slice());
    keccak256(buf)
}
