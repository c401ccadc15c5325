//! Solana protocol layer for the remote-custody signing client.
//!
//! Implements the legacy transaction wire format by hand, with no
//! `solana-sdk` dependency: Base58 and shortvec codecs, 32-byte account
//! keys, program-derived address search, per-operation instruction encoders,
//! and the unsigned message serializer the custody service consumes.

pub mod base58;
pub mod error;
pub mod instruction;
pub mod message;
pub mod pda;
pub mod pubkey;
pub mod shortvec;

pub use error::SolError;
pub use instruction::{AccountMeta, AssetMetadata, Instruction};
pub use message::{compile_instructions, CompiledInstruction, Message};
pub use pda::{derive_associated_token_address, derive_tree_authority, find_program_address};
pub use pubkey::{
    Pubkey, ASSOCIATED_TOKEN_PROGRAM, COMPRESSED_ASSET_PROGRAM, EURC_DECIMALS, EURC_MINT_DEVNET,
    PLACEHOLDER_BLOCKHASH, SYSTEM_PROGRAM, TOKEN_PROGRAM,
};
