//! Hybrid public-key encryption (RFC 9180), base mode only, with the one
//! ciphersuite the custody service speaks:
//!
//! ```text
//! KEM   0x0010  DHKEM(P-256, HKDF-SHA256)
//! KDF   0x0001  HKDF-SHA256
//! AEAD  0x0003  ChaCha20-Poly1305
//! ```
//!
//! The service seals the authorization key to the device's P-256 public key;
//! [`open`] recovers it. Info and AAD are empty on both sides. Every failure
//! mode collapses to [`CryptoError::DecryptionFailed`] so no partial
//! plaintext or oracle detail leaks to callers.

use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use hkdf::Hkdf;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::{PublicKey, SecretKey};
use rand_core::OsRng;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::der;
use crate::error::CryptoError;

const KEM_ID: u16 = 0x0010;
const KDF_ID: u16 = 0x0001;
const AEAD_ID: u16 = 0x0003;

/// AEAD key and nonce sizes for ChaCha20-Poly1305.
const NK: usize = 32;
const NN: usize = 12;

const VERSION_LABEL: &[u8] = b"HPKE-v1";

fn kem_suite_id() -> [u8; 5] {
    let id = KEM_ID.to_be_bytes();
    [b'K', b'E', b'M', id[0], id[1]]
}

fn hpke_suite_id() -> [u8; 10] {
    let kem = KEM_ID.to_be_bytes();
    let kdf = KDF_ID.to_be_bytes();
    let aead = AEAD_ID.to_be_bytes();
    [
        b'H', b'P', b'K', b'E', kem[0], kem[1], kdf[0], kdf[1], aead[0], aead[1],
    ]
}

/// `LabeledExtract` from RFC 9180 §4: HKDF-Extract over
/// `"HPKE-v1" || suite_id || label || ikm`.
fn labeled_extract(
    suite_id: &[u8],
    salt: &[u8],
    label: &[u8],
    ikm: &[u8],
) -> ([u8; 32], Hkdf<Sha256>) {
    let mut labeled_ikm = Vec::with_capacity(VERSION_LABEL.len() + suite_id.len() + label.len() + ikm.len());
    labeled_ikm.extend_from_slice(VERSION_LABEL);
    labeled_ikm.extend_from_slice(suite_id);
    labeled_ikm.extend_from_slice(label);
    labeled_ikm.extend_from_slice(ikm);

    let salt = if salt.is_empty() { None } else { Some(salt) };
    let (prk, hk) = Hkdf::<Sha256>::extract(salt, &labeled_ikm);
    (prk.into(), hk)
}

/// `LabeledExpand` from RFC 9180 §4: HKDF-Expand with
/// `I2OSP(L, 2) || "HPKE-v1" || suite_id || label || info`.
fn labeled_expand(
    hk: &Hkdf<Sha256>,
    suite_id: &[u8],
    label: &[u8],
    info: &[u8],
    out: &mut [u8],
) -> Result<(), CryptoError> {
    let mut labeled_info =
        Vec::with_capacity(2 + VERSION_LABEL.len() + suite_id.len() + label.len() + info.len());
    labeled_info.extend_from_slice(&(out.len() as u16).to_be_bytes());
    labeled_info.extend_from_slice(VERSION_LABEL);
    labeled_info.extend_from_slice(suite_id);
    labeled_info.extend_from_slice(label);
    labeled_info.extend_from_slice(info);

    hk.expand(&labeled_info, out)
        .map_err(|e| CryptoError::DecryptionFailed(format!("hkdf expand: {e}")))
}

/// DHKEM ExtractAndExpand: DH output plus `enc || pkRm` context into the
/// 32-byte KEM shared secret.
fn kem_shared_secret(
    dh: &[u8],
    enc: &[u8; 65],
    recipient_public: &[u8; 65],
) -> Result<Zeroizing<[u8; 32]>, CryptoError> {
    let suite_id = kem_suite_id();

    let mut kem_context = [0u8; 130];
    kem_context[..65].copy_from_slice(enc);
    kem_context[65..].copy_from_slice(recipient_public);

    let (_, hk) = labeled_extract(&suite_id, b"", b"eae_prk", dh);
    let mut shared = Zeroizing::new([0u8; 32]);
    labeled_expand(&hk, &suite_id, b"shared_secret", &kem_context, shared.as_mut())?;
    Ok(shared)
}

/// Base-mode key schedule with empty info and no PSK. Returns the AEAD key
/// and the sequence-zero nonce (the only one a single-shot open/seal needs).
fn key_schedule(
    shared_secret: &[u8; 32],
) -> Result<(Zeroizing<[u8; NK]>, [u8; NN]), CryptoError> {
    let suite_id = hpke_suite_id();

    let (psk_id_hash, _) = labeled_extract(&suite_id, b"", b"psk_id_hash", b"");
    let (info_hash, _) = labeled_extract(&suite_id, b"", b"info_hash", b"");

    // mode_base = 0x00
    let mut context = [0u8; 65];
    context[1..33].copy_from_slice(&psk_id_hash);
    context[33..].copy_from_slice(&info_hash);

    let (_, secret) = labeled_extract(&suite_id, shared_secret, b"secret", b"");

    let mut key = Zeroizing::new([0u8; NK]);
    labeled_expand(&secret, &suite_id, b"key", &context, key.as_mut())?;

    let mut base_nonce = [0u8; NN];
    labeled_expand(&secret, &suite_id, b"base_nonce", &context, &mut base_nonce)?;

    Ok((key, base_nonce))
}

/// Accept either a raw 65-byte X9.63 point or a DER SPKI wrapper around one.
fn normalize_encapsulated_key(enc: &[u8]) -> Result<[u8; 65], CryptoError> {
    if enc.len() == 65 && enc[0] == 0x04 {
        let mut out = [0u8; 65];
        out.copy_from_slice(enc);
        return Ok(out);
    }
    der::parse_spki(enc)
        .map_err(|e| CryptoError::DecryptionFailed(format!("encapsulated key: {e}")))
}

/// Decrypt a sealed payload with the recipient's 32-byte private scalar.
///
/// Fails closed: malformed points, wrong-length inputs, and AEAD tag
/// mismatches are all [`CryptoError::DecryptionFailed`].
pub fn open(
    recipient_secret: &[u8; 32],
    enc: &[u8],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let enc = normalize_encapsulated_key(enc)?;

    let secret = SecretKey::from_slice(recipient_secret)
        .map_err(|e| CryptoError::DecryptionFailed(format!("recipient key: {e}")))?;
    let ephemeral = PublicKey::from_sec1_bytes(&enc)
        .map_err(|e| CryptoError::DecryptionFailed(format!("ephemeral point: {e}")))?;

    let dh = p256::ecdh::diffie_hellman(secret.to_nonzero_scalar(), ephemeral.as_affine());

    let recipient_point = secret.public_key().to_encoded_point(false);
    let recipient_public: [u8; 65] = recipient_point
        .as_bytes()
        .try_into()
        .map_err(|_| CryptoError::DecryptionFailed("recipient point length".into()))?;

    let shared = kem_shared_secret(dh.raw_secret_bytes().as_slice(), &enc, &recipient_public)?;
    let (key, nonce) = key_schedule(&shared)?;

    let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_ref()));
    let plaintext = cipher
        .decrypt(Nonce::from_slice(&nonce), ciphertext)
        .map_err(|_| CryptoError::DecryptionFailed("aead open failed".into()))?;

    Ok(Zeroizing::new(plaintext))
}

/// Seal `plaintext` to a recipient public key (raw point or SPKI DER).
///
/// Returns the encapsulated ephemeral key and the ciphertext. This is the
/// encryption side of [`open`], used to exercise the round-trip and by any
/// caller that needs to hand secrets back through the same channel.
pub fn seal(
    recipient_public: &[u8],
    plaintext: &[u8],
) -> Result<(Vec<u8>, Vec<u8>), CryptoError> {
    let recipient_point = normalize_encapsulated_key(recipient_public)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
    let recipient = PublicKey::from_sec1_bytes(&recipient_point)
        .map_err(|e| CryptoError::EncryptionFailed(format!("recipient point: {e}")))?;

    let ephemeral = SecretKey::random(&mut OsRng);
    let enc_point = ephemeral.public_key().to_encoded_point(false);
    let enc: [u8; 65] = enc_point
        .as_bytes()
        .try_into()
        .map_err(|_| CryptoError::EncryptionFailed("ephemeral point length".into()))?;

    let dh = p256::ecdh::diffie_hellman(ephemeral.to_nonzero_scalar(), recipient.as_affine());

    let shared = kem_shared_secret(dh.raw_secret_bytes().as_slice(), &enc, &recipient_point)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
    let (key, nonce) =
        key_schedule(&shared).map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_ref()));
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|_| CryptoError::EncryptionFailed("aead seal failed".into()))?;

    Ok((enc.to_vec(), ciphertext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use p256::elliptic_curve::sec1::ToEncodedPoint;

    fn test_recipient() -> (SecretKey, [u8; 32], [u8; 65]) {
        let secret = SecretKey::from_slice(&[0x17u8; 32]).unwrap();
        let scalar: [u8; 32] = secret.to_bytes().into();
        let public: [u8; 65] = secret
            .public_key()
            .to_encoded_point(false)
            .as_bytes()
            .try_into()
            .unwrap();
        (secret, scalar, public)
    }

    #[test]
    fn seal_open_roundtrip() {
        let (_, scalar, public) = test_recipient();
        let plaintext = b"authorization key material";

        let (enc, ciphertext) = seal(&public, plaintext).unwrap();
        let recovered = open(&scalar, &enc, &ciphertext).unwrap();

        assert_eq!(recovered.as_slice(), plaintext);
    }

    #[test]
    fn roundtrip_with_empty_plaintext() {
        let (_, scalar, public) = test_recipient();
        let (enc, ciphertext) = seal(&public, b"").unwrap();
        assert_eq!(open(&scalar, &enc, &ciphertext).unwrap().as_slice(), b"");
    }

    #[test]
    fn spki_wrapped_encapsulated_key_is_accepted() {
        let (_, scalar, public) = test_recipient();
        let (enc, ciphertext) = seal(&public, b"wrapped").unwrap();

        let enc_arr: [u8; 65] = enc.as_slice().try_into().unwrap();
        let wrapped = der::encode_spki(&enc_arr);
        let recovered = open(&scalar, &wrapped, &ciphertext).unwrap();
        assert_eq!(recovered.as_slice(), b"wrapped");
    }

    #[test]
    fn sealing_to_spki_public_key_works() {
        let (_, scalar, public) = test_recipient();
        let spki = der::encode_spki(&public);

        let (enc, ciphertext) = seal(&spki, b"via spki").unwrap();
        assert_eq!(open(&scalar, &enc, &ciphertext).unwrap().as_slice(), b"via spki");
    }

    #[test]
    fn single_bit_corruption_fails_closed() {
        let (_, scalar, public) = test_recipient();
        let (enc, mut ciphertext) = seal(&public, b"fragile").unwrap();

        ciphertext[0] ^= 0x01;
        let err = open(&scalar, &enc, &ciphertext).unwrap_err();
        assert!(matches!(err, CryptoError::DecryptionFailed(_)));
    }

    #[test]
    fn truncated_ciphertext_fails() {
        let (_, scalar, public) = test_recipient();
        let (enc, ciphertext) = seal(&public, b"short").unwrap();
        assert!(open(&scalar, &enc, &ciphertext[..4]).is_err());
    }

    #[test]
    fn malformed_encapsulated_key_fails() {
        let (_, scalar, _) = test_recipient();
        assert!(open(&scalar, &[0x04; 10], b"irrelevant").is_err());
        assert!(open(&scalar, &[0xff; 65], b"irrelevant").is_err());
    }

    #[test]
    fn wrong_recipient_key_fails() {
        let (_, _, public) = test_recipient();
        let (enc, ciphertext) = seal(&public, b"for someone else").unwrap();

        let other: [u8; 32] = SecretKey::from_slice(&[0x29u8; 32])
            .unwrap()
            .to_bytes()
            .into();
        assert!(open(&other, &enc, &ciphertext).is_err());
    }

    #[test]
    fn seal_is_randomized() {
        let (_, _, public) = test_recipient();
        let (enc1, ct1) = seal(&public, b"same plaintext").unwrap();
        let (enc2, ct2) = seal(&public, b"same plaintext").unwrap();
        // Fresh ephemeral keys mean both components differ between calls.
        assert_ne!(enc1, enc2);
        assert_ne!(ct1, ct2);
    }
}
