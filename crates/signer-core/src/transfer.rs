//! Token transfer composition.
//!
//! The only instruction encoder that needs network state: whether the
//! destination's associated token account already exists decides whether an
//! idempotent-create instruction is prepended. Address validation happens
//! before the lookup so bad input never costs a network call.

use chain_sol::instruction::{
    create_associated_token_account_idempotent, token_transfer_checked, Instruction,
};
use chain_sol::pda::derive_associated_token_address;
use chain_sol::pubkey::{Pubkey, EURC_DECIMALS, EURC_MINT_DEVNET};

use crate::client::CustodyApi;
use crate::error::SignerError;

/// Build the instruction list for a token transfer between two wallets.
///
/// Derives both associated accounts, prepends an idempotent create for the
/// destination when the collaborator reports it missing, then appends the
/// checked transfer. The sender pays for any account creation.
pub async fn build_token_transfer<A: CustodyApi>(
    api: &A,
    from: &str,
    to: &str,
    mint: &Pubkey,
    amount: u64,
    decimals: u8,
) -> Result<Vec<Instruction>, SignerError> {
    let from_key: Pubkey = from.parse()?;
    let to_key: Pubkey = to.parse()?;

    let (from_ata, _) = derive_associated_token_address(&from_key, mint)?;
    let (to_ata, _) = derive_associated_token_address(&to_key, mint)?;

    let mut instructions = Vec::with_capacity(2);
    if !api.account_exists(&to_ata.to_base58()).await? {
        tracing::debug!(destination = %to_ata, "destination account missing, adding create");
        instructions.push(create_associated_token_account_idempotent(
            &from_key, &to_ata, &to_key, mint,
        ));
    }
    instructions.push(token_transfer_checked(
        &from_ata, mint, &to_ata, &from_key, amount, decimals,
    )?);

    Ok(instructions)
}

/// EURC transfer on devnet: [`build_token_transfer`] against the EURC mint.
pub async fn build_eurc_transfer<A: CustodyApi>(
    api: &A,
    from: &str,
    to: &str,
    amount: u64,
) -> Result<Vec<Instruction>, SignerError> {
    build_token_transfer(api, from, to, &EURC_MINT_DEVNET, amount, EURC_DECIMALS).await
}
