//! Base58 byte-string codec.
//!
//! The wire format and the custody-service API both speak Base58 for account
//! keys and blockhashes. Encoding treats the input as a big-endian integer
//! over the standard Bitcoin alphabet (no `0`, `O`, `I`, `l`) and preserves
//! each leading zero byte as a leading `'1'`. The heavy lifting is done by
//! the `bs58` crate; this module pins the error mapping.

use crate::error::SolError;

/// Encode arbitrary bytes as Base58 text.
pub fn encode(bytes: &[u8]) -> String {
    bs58::encode(bytes).into_string()
}

/// Decode Base58 text back into bytes.
///
/// Any character outside the alphabet is a [`SolError::Decode`].
pub fn decode(text: &str) -> Result<Vec<u8>, SolError> {
    bs58::decode(text)
        .into_vec()
        .map_err(|e| SolError::Decode(format!("base58: {e}")))
}
