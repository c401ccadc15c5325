use thiserror::Error;

/// Solana protocol-layer errors.
#[derive(Debug, Error)]
pub enum SolError {
    #[error("decode error: {0}")]
    Decode(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("no off-curve bump seed in 1..=255")]
    DerivationExhausted,

    #[error("program {0} not in account table")]
    ProgramNotInAccountTable(String),

    #[error("transaction build error: {0}")]
    TransactionBuild(String),
}
