//! Legacy transaction message assembly and wire serialization.
//!
//! The unsigned wire form sent to the custody service:
//!
//! ```text
//! num_signatures          shortvec
//! signatures              64 zero bytes * num_signatures (placeholders)
//! message:
//!   num_required_sigs     u8
//!   num_readonly_signed   u8
//!   num_readonly_unsigned u8
//!   num_accounts          shortvec
//!   account_keys          32 bytes * num_accounts
//!   recent_blockhash      32 bytes
//!   num_instructions      shortvec
//!   instructions[]        (see below)
//!
//! Instruction:
//!   program_id_index      u8
//!   num_accounts          shortvec
//!   account_indices       u8 * num_accounts
//!   data_len              shortvec
//!   data                  u8 * data_len
//! ```

use crate::error::SolError;
use crate::instruction::Instruction;
use crate::pubkey::Pubkey;
use crate::shortvec;

/// An instruction with account references compiled down to u8 indices into
/// the message's account table.
#[derive(Debug, Clone)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub account_indices: Vec<u8>,
    pub data: Vec<u8>,
}

/// An unsigned transaction message.
///
/// Account keys are held in canonical order:
///   1. writable signers (fee payer first)
///   2. read-only signers
///   3. writable non-signers
///   4. read-only non-signers
#[derive(Debug, Clone)]
pub struct Message {
    pub account_keys: Vec<Pubkey>,
    pub num_required_signatures: u8,
    pub num_readonly_signed: u8,
    pub num_readonly_unsigned: u8,
    pub recent_blockhash: [u8; 32],
    pub instructions: Vec<CompiledInstruction>,
}

impl Message {
    /// Compile `instructions` into a message with `fee_payer` at index 0.
    ///
    /// Accounts are deduplicated with signer/writable bits merged; program
    /// ids join the table as read-only non-signers. An instruction whose
    /// program id somehow fails table lookup is
    /// [`SolError::ProgramNotInAccountTable`] rather than corrupt output.
    pub fn compile(
        instructions: &[Instruction],
        fee_payer: &Pubkey,
        recent_blockhash: &[u8; 32],
    ) -> Result<Self, SolError> {
        struct Entry {
            pubkey: Pubkey,
            is_signer: bool,
            is_writable: bool,
        }

        let mut entries: Vec<Entry> = Vec::new();
        let mut upsert = |pubkey: Pubkey, signer: bool, writable: bool| {
            if let Some(entry) = entries.iter_mut().find(|e| e.pubkey == pubkey) {
                entry.is_signer |= signer;
                entry.is_writable |= writable;
            } else {
                entries.push(Entry { pubkey, is_signer: signer, is_writable: writable });
            }
        };

        // Fee payer is always a writable signer.
        upsert(*fee_payer, true, true);

        for ix in instructions {
            for meta in &ix.accounts {
                upsert(meta.pubkey, meta.is_signer, meta.is_writable);
            }
            upsert(ix.program_id, false, false);
        }

        fn rank(signer: bool, writable: bool) -> u8 {
            match (signer, writable) {
                (true, true) => 0,
                (true, false) => 1,
                (false, true) => 2,
                (false, false) => 3,
            }
        }
        // Stable sort keeps insertion order within a category, so the fee
        // payer stays at index 0 of the writable-signer block.
        entries.sort_by_key(|e| rank(e.is_signer, e.is_writable));

        let num_required_signatures = entries.iter().filter(|e| e.is_signer).count() as u8;
        let num_readonly_signed = entries
            .iter()
            .filter(|e| e.is_signer && !e.is_writable)
            .count() as u8;
        let num_readonly_unsigned = entries
            .iter()
            .filter(|e| !e.is_signer && !e.is_writable)
            .count() as u8;

        let account_keys: Vec<Pubkey> = entries.iter().map(|e| e.pubkey).collect();
        let compiled = compile_instructions(instructions, &account_keys)?;

        Ok(Self {
            account_keys,
            num_required_signatures,
            num_readonly_signed,
            num_readonly_unsigned,
            recent_blockhash: *recent_blockhash,
            instructions: compiled,
        })
    }

    /// Serialize the message body (everything after the signature block).
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(256);

        buf.push(self.num_required_signatures);
        buf.push(self.num_readonly_signed);
        buf.push(self.num_readonly_unsigned);

        buf.extend_from_slice(&shortvec::encode(self.account_keys.len() as u32));
        for key in &self.account_keys {
            buf.extend_from_slice(key.as_bytes());
        }

        buf.extend_from_slice(&self.recent_blockhash);

        buf.extend_from_slice(&shortvec::encode(self.instructions.len() as u32));
        for ix in &self.instructions {
            buf.push(ix.program_id_index);
            buf.extend_from_slice(&shortvec::encode(ix.account_indices.len() as u32));
            buf.extend_from_slice(&ix.account_indices);
            buf.extend_from_slice(&shortvec::encode(ix.data.len() as u32));
            buf.extend_from_slice(&ix.data);
        }

        buf
    }

    /// Serialize the full unsigned wire form: a shortvec signature count
    /// followed by one 64-zero-byte placeholder per required signature, then
    /// the message body. This is the base64 payload the custody service's
    /// prepare endpoint expects.
    pub fn serialize_unsigned(&self) -> Vec<u8> {
        let message = self.serialize();
        let n = self.num_required_signatures as usize;

        let mut wire = Vec::with_capacity(1 + n * 64 + message.len());
        wire.extend_from_slice(&shortvec::encode(n as u32));
        wire.resize(wire.len() + n * 64, 0);
        wire.extend_from_slice(&message);
        wire
    }

    /// The accounts that must sign, in table order (fee payer first).
    pub fn signer_keys(&self) -> &[Pubkey] {
        &self.account_keys[..self.num_required_signatures as usize]
    }
}

/// Replace every account reference in `instructions` with its index into
/// `account_keys`.
///
/// A program id absent from the table is
/// [`SolError::ProgramNotInAccountTable`]; a missing instruction account is a
/// [`SolError::TransactionBuild`]. [`Message::compile`] always passes a table
/// it built itself, so these only fire for callers supplying their own.
pub fn compile_instructions(
    instructions: &[Instruction],
    account_keys: &[Pubkey],
) -> Result<Vec<CompiledInstruction>, SolError> {
    let index_of = |key: &Pubkey| account_keys.iter().position(|k| k == key);

    let mut compiled = Vec::with_capacity(instructions.len());
    for ix in instructions {
        let program_id_index = index_of(&ix.program_id)
            .ok_or_else(|| SolError::ProgramNotInAccountTable(ix.program_id.to_base58()))?
            as u8;

        let mut account_indices = Vec::with_capacity(ix.accounts.len());
        for meta in &ix.accounts {
            let idx = index_of(&meta.pubkey).ok_or_else(|| {
                SolError::TransactionBuild(format!(
                    "account {} not in account table",
                    meta.pubkey
                ))
            })? as u8;
            account_indices.push(idx);
        }

        compiled.push(CompiledInstruction {
            program_id_index,
            account_indices,
            data: ix.data.clone(),
        });
    }

    Ok(compiled)
}
