//! KMS payload signing.
//!
//! The prepare step returns a list of signable payload stubs; each is signed
//! locally with the unwrapped authorization key and handed back at submit
//! time. The custody service correlates signatures to stubs by position, so
//! output order always equals input order.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use crypto_utils::canonical;
use p256::ecdsa::signature::DigestSigner;
use p256::ecdsa::{Signature, SigningKey};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::api::SignedPayload;
use crate::error::SignerError;
use crate::session::KeySession;

/// Provider tag the custody service expects on every signed payload.
pub const KMS_PROVIDER: &str = "privy";

/// Sign every stub in `stubs`, preserving order.
///
/// Fails with [`SignerError::MissingAuthorizationKey`] before touching any
/// stub if the session has no unwrapped key.
pub fn sign_payloads(
    session: &KeySession,
    stubs: &[String],
) -> Result<Vec<SignedPayload>, SignerError> {
    let key = session.authorization_key()?;
    let signing_key = SigningKey::from_slice(key)
        .map_err(|e| SignerError::Decode(format!("authorization key: {e}")))?;

    stubs.iter().map(|stub| sign_stub(&signing_key, stub)).collect()
}

/// Sign one base64 stub.
///
/// A stub that decodes into JSON is canonicalized first so both sides hash
/// identical bytes; anything else is signed as the raw decoded blob.
fn sign_stub(signing_key: &SigningKey, stub: &str) -> Result<SignedPayload, SignerError> {
    let raw = BASE64
        .decode(stub)
        .map_err(|e| SignerError::Decode(format!("payload stub base64: {e}")))?;

    let preimage = match serde_json::from_slice::<Value>(&raw) {
        Ok(value) => canonical::to_bytes(&value)?,
        Err(_) => raw,
    };

    let signature: Signature = signing_key.sign_digest(Sha256::new_with_prefix(&preimage));
    Ok(SignedPayload {
        provider: KMS_PROVIDER.into(),
        signature: BASE64.encode(signature.to_der().as_bytes()),
    })
}
