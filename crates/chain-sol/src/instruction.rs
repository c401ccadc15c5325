//! Per-operation instruction encoders.
//!
//! Each encoder is a pure function from typed parameters to an
//! [`Instruction`]; none of them touches the network. Byte layouts:
//!
//! ```text
//! system transfer          u32 LE 2 | u64 LE lamports
//! token transfer-checked   u8 12 | u64 LE amount | u8 decimals
//! ata create               u8 0
//! ata create (idempotent)  u8 1
//! tree init                u8 depth | u8 max_buffer_size | owner (32)
//! asset mint               u8 1 | packed metadata
//! metadata update          u8 2 | status (u32 LE len | utf8)
//! asset burn               u8 3
//! ```

use crate::error::SolError;
use crate::pubkey::{
    Pubkey, ASSOCIATED_TOKEN_PROGRAM, COMPRESSED_ASSET_PROGRAM, SYSTEM_PROGRAM, TOKEN_PROGRAM,
};

// ---------------------------------------------------------------------------
// Instruction data model
// ---------------------------------------------------------------------------

/// A single account reference inside an instruction.
#[derive(Debug, Clone)]
pub struct AccountMeta {
    pub pubkey: Pubkey,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    pub fn writable(pubkey: Pubkey, is_signer: bool) -> Self {
        Self { pubkey, is_signer, is_writable: true }
    }

    pub fn readonly(pubkey: Pubkey, is_signer: bool) -> Self {
        Self { pubkey, is_signer, is_writable: false }
    }
}

/// An instruction before compilation into a transaction message.
#[derive(Debug, Clone)]
pub struct Instruction {
    pub program_id: Pubkey,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Opcodes
// ---------------------------------------------------------------------------

/// System Program `Transfer` index (u32 LE).
const SYSTEM_TRANSFER_INDEX: u32 = 2;

/// SPL Token `TransferChecked` instruction byte.
const TOKEN_TRANSFER_CHECKED: u8 = 12;

/// Associated-token-account program discriminators.
const ATA_CREATE: u8 = 0;
const ATA_CREATE_IDEMPOTENT: u8 = 1;

/// Compressed-asset program opcodes.
const ASSET_MINT: u8 = 1;
const ASSET_UPDATE: u8 = 2;
const ASSET_BURN: u8 = 3;

// ---------------------------------------------------------------------------
// Native and token transfers
// ---------------------------------------------------------------------------

/// Build a System Program transfer of `lamports` from `from` to `to`.
pub fn system_transfer(
    from: &Pubkey,
    to: &Pubkey,
    lamports: u64,
) -> Result<Instruction, SolError> {
    if lamports == 0 {
        return Err(SolError::TransactionBuild("lamports must be > 0".into()));
    }

    let mut data = Vec::with_capacity(12);
    data.extend_from_slice(&SYSTEM_TRANSFER_INDEX.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());

    Ok(Instruction {
        program_id: SYSTEM_PROGRAM,
        accounts: vec![
            AccountMeta::writable(*from, true),
            AccountMeta::writable(*to, false),
        ],
        data,
    })
}

/// Build an SPL Token `TransferChecked` instruction.
///
/// `amount` is in base units of the mint; `decimals` must match the mint or
/// the on-chain program rejects the transfer.
pub fn token_transfer_checked(
    source: &Pubkey,
    mint: &Pubkey,
    destination: &Pubkey,
    owner: &Pubkey,
    amount: u64,
    decimals: u8,
) -> Result<Instruction, SolError> {
    if amount == 0 {
        return Err(SolError::TransactionBuild("token amount must be > 0".into()));
    }

    let mut data = Vec::with_capacity(10);
    data.push(TOKEN_TRANSFER_CHECKED);
    data.extend_from_slice(&amount.to_le_bytes());
    data.push(decimals);

    Ok(Instruction {
        program_id: TOKEN_PROGRAM,
        accounts: vec![
            AccountMeta::writable(*source, false),
            AccountMeta::readonly(*mint, false),
            AccountMeta::writable(*destination, false),
            AccountMeta::readonly(*owner, true),
        ],
        data,
    })
}

/// Build a `Create` instruction for an associated token account.
pub fn create_associated_token_account(
    payer: &Pubkey,
    ata: &Pubkey,
    owner: &Pubkey,
    mint: &Pubkey,
) -> Instruction {
    ata_create_with_discriminator(payer, ata, owner, mint, ATA_CREATE)
}

/// Build a `CreateIdempotent` instruction for an associated token account.
///
/// Safe to include even when the account already exists.
pub fn create_associated_token_account_idempotent(
    payer: &Pubkey,
    ata: &Pubkey,
    owner: &Pubkey,
    mint: &Pubkey,
) -> Instruction {
    ata_create_with_discriminator(payer, ata, owner, mint, ATA_CREATE_IDEMPOTENT)
}

fn ata_create_with_discriminator(
    payer: &Pubkey,
    ata: &Pubkey,
    owner: &Pubkey,
    mint: &Pubkey,
    discriminator: u8,
) -> Instruction {
    Instruction {
        program_id: ASSOCIATED_TOKEN_PROGRAM,
        accounts: vec![
            AccountMeta::writable(*payer, true),
            AccountMeta::writable(*ata, false),
            AccountMeta::readonly(*owner, false),
            AccountMeta::readonly(*mint, false),
            AccountMeta::readonly(SYSTEM_PROGRAM, false),
            AccountMeta::readonly(TOKEN_PROGRAM, false),
        ],
        data: vec![discriminator],
    }
}

// ---------------------------------------------------------------------------
// Compressed-asset operations
// ---------------------------------------------------------------------------

/// Metadata attached to a compressed asset at mint time.
#[derive(Debug, Clone)]
pub struct AssetMetadata {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub seller_fee_basis_points: u16,
    pub is_mutable: bool,
}

/// Pack metadata fields into the mint instruction layout: each string is
/// u32 LE length-prefixed UTF-8, followed by u16 LE fee and a bool byte.
fn pack_metadata(metadata: &AssetMetadata) -> Vec<u8> {
    let mut out = Vec::with_capacity(
        12 + metadata.name.len() + metadata.symbol.len() + metadata.uri.len() + 3,
    );
    put_str(&mut out, &metadata.name);
    put_str(&mut out, &metadata.symbol);
    put_str(&mut out, &metadata.uri);
    out.extend_from_slice(&metadata.seller_fee_basis_points.to_le_bytes());
    out.push(metadata.is_mutable as u8);
    out
}

fn put_str(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(&(s.len() as u32).to_le_bytes());
    buf.extend_from_slice(s.as_bytes());
}

/// Initialize an empty asset tree owned by `owner`.
pub fn init_tree(
    tree: &Pubkey,
    owner: &Pubkey,
    depth: u8,
    max_buffer_size: u8,
) -> Instruction {
    let mut data = Vec::with_capacity(34);
    data.push(depth);
    data.push(max_buffer_size);
    data.extend_from_slice(owner.as_bytes());

    Instruction {
        program_id: COMPRESSED_ASSET_PROGRAM,
        accounts: vec![
            AccountMeta::writable(*tree, false),
            AccountMeta::readonly(*owner, true),
        ],
        data,
    }
}

/// Mint a compressed asset into `tree`, delivered to `recipient`.
pub fn mint_compressed_asset(
    tree: &Pubkey,
    tree_authority: &Pubkey,
    owner: &Pubkey,
    recipient: &Pubkey,
    metadata: &AssetMetadata,
) -> Instruction {
    let packed = pack_metadata(metadata);
    let mut data = Vec::with_capacity(1 + packed.len());
    data.push(ASSET_MINT);
    data.extend_from_slice(&packed);

    Instruction {
        program_id: COMPRESSED_ASSET_PROGRAM,
        accounts: vec![
            AccountMeta::writable(*tree, false),
            AccountMeta::writable(*tree_authority, false),
            AccountMeta::readonly(*owner, true),
            AccountMeta::readonly(*recipient, false),
        ],
        data,
    }
}

/// Update the status field of a compressed asset's metadata.
pub fn update_compressed_metadata(
    asset: &Pubkey,
    recipient: &Pubkey,
    new_status: &str,
) -> Instruction {
    let mut data = Vec::with_capacity(5 + new_status.len());
    data.push(ASSET_UPDATE);
    put_str(&mut data, new_status);

    Instruction {
        program_id: COMPRESSED_ASSET_PROGRAM,
        accounts: vec![
            AccountMeta::writable(*asset, false),
            AccountMeta::readonly(*recipient, false),
        ],
        data,
    }
}

/// Burn a compressed asset and pay out a token amount in the same
/// transaction. Returns the burn instruction followed by the payment.
pub fn burn_and_pay(
    asset: &Pubkey,
    payment_source: &Pubkey,
    payment_mint: &Pubkey,
    payment_destination: &Pubkey,
    payer: &Pubkey,
    amount: u64,
    decimals: u8,
) -> Result<Vec<Instruction>, SolError> {
    let burn = Instruction {
        program_id: COMPRESSED_ASSET_PROGRAM,
        accounts: vec![AccountMeta::writable(*asset, false)],
        data: vec![ASSET_BURN],
    };
    let pay = token_transfer_checked(
        payment_source,
        payment_mint,
        payment_destination,
        payer,
        amount,
        decimals,
    )?;
    Ok(vec![burn, pay])
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- system transfer ----------------------------------------------------

    #[test]
    fn system_transfer_data_is_12_bytes() {
        let ix = system_transfer(&Pubkey::new([1; 32]), &Pubkey::new([2; 32]), 1_000_000)
            .unwrap();
        assert_eq!(ix.data.len(), 12);
        assert_eq!(&ix.data[..4], &[2, 0, 0, 0]);
        assert_eq!(&ix.data[4..], &1_000_000u64.to_le_bytes());
    }

    #[test]
    fn system_transfer_account_roles() {
        let from = Pubkey::new([0xaa; 32]);
        let to = Pubkey::new([0xbb; 32]);
        let ix = system_transfer(&from, &to, 500).unwrap();

        assert_eq!(ix.program_id, SYSTEM_PROGRAM);
        assert_eq!(ix.accounts.len(), 2);
        assert!(ix.accounts[0].is_signer && ix.accounts[0].is_writable);
        assert!(!ix.accounts[1].is_signer && ix.accounts[1].is_writable);
    }

    #[test]
    fn system_transfer_zero_lamports_fails() {
        let result = system_transfer(&Pubkey::new([1; 32]), &Pubkey::new([2; 32]), 0);
        assert!(result.is_err());
    }

    // -- token transfer-checked ---------------------------------------------

    #[test]
    fn transfer_checked_layout() {
        let ix = token_transfer_checked(
            &Pubkey::new([1; 32]),
            &Pubkey::new([2; 32]),
            &Pubkey::new([3; 32]),
            &Pubkey::new([4; 32]),
            500_000,
            6,
        )
        .unwrap();

        assert_eq!(ix.program_id, TOKEN_PROGRAM);
        assert_eq!(ix.data.len(), 10);
        assert_eq!(ix.data[0], 12);
        assert_eq!(u64::from_le_bytes(ix.data[1..9].try_into().unwrap()), 500_000);
        assert_eq!(ix.data[9], 6);
    }

    #[test]
    fn transfer_checked_account_roles() {
        let ix = token_transfer_checked(
            &Pubkey::new([1; 32]),
            &Pubkey::new([2; 32]),
            &Pubkey::new([3; 32]),
            &Pubkey::new([4; 32]),
            1,
            9,
        )
        .unwrap();

        // source writable, mint readonly, destination writable, owner signs.
        assert!(ix.accounts[0].is_writable && !ix.accounts[0].is_signer);
        assert!(!ix.accounts[1].is_writable && !ix.accounts[1].is_signer);
        assert!(ix.accounts[2].is_writable && !ix.accounts[2].is_signer);
        assert!(!ix.accounts[3].is_writable && ix.accounts[3].is_signer);
    }

    #[test]
    fn transfer_checked_zero_amount_fails() {
        let k = Pubkey::new([0; 32]);
        assert!(token_transfer_checked(&k, &k, &k, &k, 0, 6).is_err());
    }

    // -- associated token account creation -----------------------------------

    #[test]
    fn ata_create_discriminators() {
        let k = Pubkey::new([7; 32]);
        let create = create_associated_token_account(&k, &k, &k, &k);
        let idempotent = create_associated_token_account_idempotent(&k, &k, &k, &k);
        assert_eq!(create.data, vec![0]);
        assert_eq!(idempotent.data, vec![1]);
    }

    #[test]
    fn ata_create_account_list() {
        let payer = Pubkey::new([1; 32]);
        let ata = Pubkey::new([2; 32]);
        let owner = Pubkey::new([3; 32]);
        let mint = Pubkey::new([4; 32]);

        let ix = create_associated_token_account_idempotent(&payer, &ata, &owner, &mint);

        assert_eq!(ix.program_id, ASSOCIATED_TOKEN_PROGRAM);
        assert_eq!(ix.accounts.len(), 6);
        assert_eq!(ix.accounts[0].pubkey, payer);
        assert!(ix.accounts[0].is_signer && ix.accounts[0].is_writable);
        assert_eq!(ix.accounts[1].pubkey, ata);
        assert!(ix.accounts[1].is_writable && !ix.accounts[1].is_signer);
        assert_eq!(ix.accounts[4].pubkey, SYSTEM_PROGRAM);
        assert_eq!(ix.accounts[5].pubkey, TOKEN_PROGRAM);
    }

    // -- compressed-asset operations -----------------------------------------

    #[test]
    fn init_tree_layout() {
        let tree = Pubkey::new([0x11; 32]);
        let owner = Pubkey::new([0x22; 32]);
        let ix = init_tree(&tree, &owner, 14, 64);

        assert_eq!(ix.program_id, COMPRESSED_ASSET_PROGRAM);
        assert_eq!(ix.data.len(), 34);
        assert_eq!(ix.data[0], 14);
        assert_eq!(ix.data[1], 64);
        assert_eq!(&ix.data[2..], owner.as_bytes());
        assert!(ix.accounts[1].is_signer);
    }

    #[test]
    fn mint_data_starts_with_opcode_and_name() {
        let k = Pubkey::new([5; 32]);
        let metadata = AssetMetadata {
            name: "Lawn".into(),
            symbol: "TASK".into(),
            uri: "data:application/json;base64,e30=".into(),
            seller_fee_basis_points: 0,
            is_mutable: true,
        };
        let ix = mint_compressed_asset(&k, &k, &k, &k, &metadata);

        assert_eq!(ix.data[0], 1);
        // First packed field: u32 LE length of "Lawn", then the bytes.
        assert_eq!(&ix.data[1..5], &4u32.to_le_bytes());
        assert_eq!(&ix.data[5..9], b"Lawn");
        // Trailing bool byte reflects mutability.
        assert_eq!(*ix.data.last().unwrap(), 1);
    }

    #[test]
    fn mint_packing_is_deterministic() {
        let k = Pubkey::new([5; 32]);
        let metadata = AssetMetadata {
            name: "a".into(),
            symbol: "b".into(),
            uri: "c".into(),
            seller_fee_basis_points: 250,
            is_mutable: false,
        };
        let a = mint_compressed_asset(&k, &k, &k, &k, &metadata);
        let b = mint_compressed_asset(&k, &k, &k, &k, &metadata);
        assert_eq!(a.data, b.data);
    }

    #[test]
    fn update_metadata_layout() {
        let asset = Pubkey::new([9; 32]);
        let recipient = Pubkey::new([8; 32]);
        let ix = update_compressed_metadata(&asset, &recipient, "done");

        assert_eq!(ix.data[0], 2);
        assert_eq!(&ix.data[1..5], &4u32.to_le_bytes());
        assert_eq!(&ix.data[5..], b"done");
        assert!(ix.accounts[0].is_writable);
    }

    #[test]
    fn burn_and_pay_produces_two_instructions() {
        let k = Pubkey::new([3; 32]);
        let ixs = burn_and_pay(&k, &k, &k, &k, &k, 1_000, 6).unwrap();

        assert_eq!(ixs.len(), 2);
        assert_eq!(ixs[0].program_id, COMPRESSED_ASSET_PROGRAM);
        assert_eq!(ixs[0].data, vec![3]);
        assert_eq!(ixs[1].program_id, TOKEN_PROGRAM);
        assert_eq!(ixs[1].data[0], 12);
    }

    #[test]
    fn burn_and_pay_zero_amount_fails() {
        let k = Pubkey::new([3; 32]);
        assert!(burn_and_pay(&k, &k, &k, &k, &k, 0, 6).is_err());
    }
}
