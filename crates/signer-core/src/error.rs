use std::fmt;

use thiserror::Error;

/// The pipeline stage an error was raised in. Failures are terminal; the
/// stage travels with the error so callers can report where the run died.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Prepare,
    Sign,
    Submit,
    Lookup,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Prepare => "prepare",
            Stage::Sign => "sign",
            Stage::Submit => "submit",
            Stage::Lookup => "lookup",
        })
    }
}

/// Signing-pipeline errors. All are recoverable by the caller; nothing here
/// is retried automatically and nothing aborts the process.
#[derive(Debug, Error)]
pub enum SignerError {
    #[error("authorization key not yet unwrapped")]
    MissingAuthorizationKey,

    #[error("{stage} returned status {status}: {body}")]
    Remote {
        stage: Stage,
        status: u16,
        body: String,
    },

    #[error("{stage} transport error: {detail}")]
    Transport { stage: Stage, detail: String },

    #[error("decode error: {0}")]
    Decode(String),

    #[error(transparent)]
    Protocol(#[from] chain_sol::SolError),

    #[error(transparent)]
    Crypto(#[from] crypto_utils::CryptoError),
}
