//! Program-derived address (PDA) search.
//!
//! A PDA is a deterministic address owned by a program, required to be off
//! the Ed25519 curve so that no private key can ever exist for it. The
//! search hashes `seeds || [bump] || program_id || "ProgramDerivedAddress"`
//! with SHA-256, walking the bump from 255 down to 1 and accepting the first
//! digest that fails point decompression.

use sha2::{Digest, Sha256};

use crate::error::SolError;
use crate::pubkey::{Pubkey, ASSOCIATED_TOKEN_PROGRAM, COMPRESSED_ASSET_PROGRAM, TOKEN_PROGRAM};

/// Domain separator appended to every PDA hash.
const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Find the program-derived address for `seeds` under `program`.
///
/// Returns the address together with the bump seed that produced it. If no
/// bump in 1..=255 yields an off-curve digest, returns
/// [`SolError::DerivationExhausted`]; this cannot happen for realistic seeds
/// but is a representable error rather than a panic.
pub fn find_program_address(
    seeds: &[&[u8]],
    program: &Pubkey,
) -> Result<(Pubkey, u8), SolError> {
    (1u8..=255)
        .rev()
        .find_map(|bump| try_derive(seeds, bump, program).map(|addr| (addr, bump)))
        .ok_or(SolError::DerivationExhausted)
}

/// One candidate derivation. `None` means the digest landed on the curve and
/// the next bump must be tried.
fn try_derive(seeds: &[&[u8]], bump: u8, program: &Pubkey) -> Option<Pubkey> {
    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update([bump]);
    hasher.update(program.as_bytes());
    hasher.update(PDA_MARKER);

    let digest: [u8; 32] = hasher.finalize().into();
    if is_on_curve(&digest) {
        None
    } else {
        Some(Pubkey::new(digest))
    }
}

/// Whether 32 bytes decompress to a valid Ed25519 point.
///
/// This is the full decompression check, not a sign-bit shortcut; a PDA is
/// valid only when this returns false.
pub fn is_on_curve(bytes: &[u8; 32]) -> bool {
    curve25519_dalek::edwards::CompressedEdwardsY(*bytes)
        .decompress()
        .is_some()
}

/// Derive the associated token account for an `owner` and `mint` pair.
///
/// Seeds are `[owner, token_program, mint]` under the associated-token
/// program.
pub fn derive_associated_token_address(
    owner: &Pubkey,
    mint: &Pubkey,
) -> Result<(Pubkey, u8), SolError> {
    find_program_address(
        &[owner.as_ref(), TOKEN_PROGRAM.as_ref(), mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM,
    )
}

/// Derive the authority account for a compressed-asset tree.
pub fn derive_tree_authority(tree: &Pubkey) -> Result<(Pubkey, u8), SolError> {
    find_program_address(&[tree.as_ref()], &COMPRESSED_ASSET_PROGRAM)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let owner = Pubkey::new([0x11; 32]);
        let mint = Pubkey::new([0x22; 32]);

        let a = derive_associated_token_address(&owner, &mint).unwrap();
        let b = derive_associated_token_address(&owner, &mint).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn derived_address_is_off_curve() {
        let owner = Pubkey::new([0xaa; 32]);
        let mint = Pubkey::new([0xbb; 32]);

        let (ata, _bump) = derive_associated_token_address(&owner, &mint).unwrap();
        assert!(!is_on_curve(ata.as_bytes()));
    }

    #[test]
    fn bump_is_in_range() {
        let (_, bump) =
            find_program_address(&[b"seed"], &TOKEN_PROGRAM).unwrap();
        assert!(bump >= 1);
    }

    #[test]
    fn different_owners_give_different_atas() {
        let mint = Pubkey::new([0xff; 32]);
        let a = derive_associated_token_address(&Pubkey::new([0x01; 32]), &mint).unwrap();
        let b = derive_associated_token_address(&Pubkey::new([0x02; 32]), &mint).unwrap();
        assert_ne!(a.0, b.0);
    }

    #[test]
    fn different_mints_give_different_atas() {
        let owner = Pubkey::new([0xaa; 32]);
        let a = derive_associated_token_address(&owner, &Pubkey::new([0x01; 32])).unwrap();
        let b = derive_associated_token_address(&owner, &Pubkey::new([0x02; 32])).unwrap();
        assert_ne!(a.0, b.0);
    }

    #[test]
    fn tree_authority_differs_from_tree() {
        let tree = Pubkey::new([0x42; 32]);
        let (authority, _) = derive_tree_authority(&tree).unwrap();
        assert_ne!(authority, tree);
        assert!(!is_on_curve(authority.as_bytes()));
    }

    #[test]
    fn is_on_curve_accepts_basepoint() {
        // The Ed25519 basepoint in compressed form.
        let basepoint: [u8; 32] = [
            0x58, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66,
            0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66,
            0x66, 0x66, 0x66, 0x66,
        ];
        assert!(is_on_curve(&basepoint));
    }

    #[test]
    fn is_on_curve_rejects_non_point() {
        assert!(!is_on_curve(&[0x02; 32]));
    }
}
