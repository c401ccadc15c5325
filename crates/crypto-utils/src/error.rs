use thiserror::Error;

/// Cryptographic and codec errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("decode error: {0}")]
    Decode(String),

    #[error("invalid number: {0}")]
    InvalidNumber(String),

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("invalid key material: {0}")]
    KeyMaterial(String),
}
