//! 32-byte account keys and the well-known program addresses.
//!
//! A Solana address is the Base58 encoding of a raw 32-byte public key; no
//! hashing step is involved. [`Pubkey`] wraps the raw bytes and carries the
//! Base58 conversions, so address validation happens exactly once at the
//! string boundary.

use std::fmt;
use std::str::FromStr;

use crate::base58;
use crate::error::SolError;

/// A raw 32-byte account key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pubkey(pub [u8; 32]);

impl Pubkey {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Base58 form of the key.
    pub fn to_base58(&self) -> String {
        base58::encode(&self.0)
    }
}

impl FromStr for Pubkey {
    type Err = SolError;

    /// Parse a Base58 address, requiring exactly 32 bytes after decode.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = base58::decode(s)
            .map_err(|e| SolError::InvalidAddress(format!("{s:?}: {e}")))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|v: Vec<u8>| {
                SolError::InvalidAddress(format!("expected 32 bytes, got {}", v.len()))
            })?;
        Ok(Self(arr))
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl AsRef<[u8]> for Pubkey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Well-known addresses
// ---------------------------------------------------------------------------

/// System Program: 32 zero bytes, `11111111111111111111111111111111`.
pub const SYSTEM_PROGRAM: Pubkey = Pubkey::new([0u8; 32]);

/// SPL Token Program: `TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA`.
pub const TOKEN_PROGRAM: Pubkey = Pubkey::new([
    0x06, 0xdd, 0xf6, 0xe1, 0xd7, 0x65, 0xa1, 0x93, 0xd9, 0xcb, 0xe1, 0x46, 0xce, 0xeb, 0x79,
    0xac, 0x1c, 0xb4, 0x85, 0xed, 0x5f, 0x5b, 0x37, 0x91, 0x3a, 0x8c, 0xf5, 0x85, 0x7e, 0xff,
    0x00, 0xa9,
]);

/// Associated Token Account Program: `ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL`.
pub const ASSOCIATED_TOKEN_PROGRAM: Pubkey = Pubkey::new([
    0x8c, 0x97, 0x25, 0x8f, 0x4e, 0x24, 0x89, 0xf1, 0xbb, 0x3d, 0x10, 0x29, 0x14, 0x8e, 0x0d,
    0x83, 0x0b, 0x5a, 0x13, 0x99, 0xda, 0xff, 0x10, 0x84, 0x04, 0x8e, 0x7b, 0xd8, 0xdb, 0xe9,
    0xf8, 0x59,
]);

/// Compressed-asset (Bubblegum) program: `BGUMAp9Gq7iTEuizy4pqaxsTyUCbc68BEFgBMRrLFVo`.
pub const COMPRESSED_ASSET_PROGRAM: Pubkey = Pubkey::new([
    0x02, 0xa1, 0x4d, 0x41, 0xda, 0x5d, 0x9b, 0x2d, 0xf5, 0xd4, 0x7d, 0x97, 0xb6, 0x83, 0xd2,
    0xc0, 0x2c, 0xcc, 0x90, 0xb9, 0xce, 0xf6, 0x08, 0xf0, 0xd7, 0x35, 0x27, 0x34, 0x83, 0x47,
    0x83, 0x86,
]);

/// EURC mint on devnet: `HzwqbKZw8HxMN6bF2yFZNrht3c2iXXzpKcFu7uBEDKtr`.
pub const EURC_MINT_DEVNET: Pubkey = Pubkey::new([
    0xfc, 0x93, 0x1a, 0x2b, 0x58, 0xcd, 0x23, 0xdb, 0x2d, 0x91, 0xd2, 0x96, 0xd9, 0x65, 0x05,
    0xa0, 0x6f, 0x80, 0x94, 0x20, 0x83, 0xf8, 0x41, 0xe8, 0xa8, 0x87, 0xf1, 0x38, 0xac, 0x03,
    0x04, 0x37,
]);

/// Decimals of the EURC mint.
pub const EURC_DECIMALS: u8 = 6;

/// Placeholder blockhash sent when the custody service re-stamps the
/// transaction at prepare time: `11111111111111111111111111111111`.
pub const PLACEHOLDER_BLOCKHASH: [u8; 32] = [0u8; 32];
