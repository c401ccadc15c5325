//! Device P-256 keypair.
//!
//! Generated once per account holder; the public half travels to the custody
//! service (base64 SPKI DER) so the service can HPKE-seal the authorization
//! key back to this device. The private scalar never leaves the process.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::SecretKey;
use rand_core::OsRng;
use zeroize::Zeroizing;

use crate::der;
use crate::error::CryptoError;

/// A locally held P-256 keypair.
pub struct DeviceKeypair {
    secret: SecretKey,
}

impl DeviceKeypair {
    /// Generate a fresh keypair from the OS RNG.
    pub fn generate() -> Self {
        Self { secret: SecretKey::random(&mut OsRng) }
    }

    /// Rebuild a keypair from a stored 32-byte scalar.
    pub fn from_scalar(scalar: &[u8; 32]) -> Result<Self, CryptoError> {
        let secret = SecretKey::from_slice(scalar)
            .map_err(|e| CryptoError::KeyMaterial(format!("scalar: {e}")))?;
        Ok(Self { secret })
    }

    /// The raw private scalar, zeroized when the returned guard drops.
    pub fn scalar_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.secret.to_bytes().into())
    }

    /// Uncompressed public point, `0x04 || X || Y`.
    pub fn public_point(&self) -> [u8; 65] {
        self.secret
            .public_key()
            .to_encoded_point(false)
            .as_bytes()
            .try_into()
            .expect("uncompressed P-256 point is 65 bytes")
    }

    /// Public key as SubjectPublicKeyInfo DER.
    pub fn public_key_spki_der(&self) -> Vec<u8> {
        der::encode_spki(&self.public_point())
    }

    /// Base64 of the SPKI DER, the exact string the custody service expects
    /// as `kms_provider_config.encryption_public_key` at registration.
    pub fn registration_public_key(&self) -> String {
        BASE64.encode(self.public_key_spki_der())
    }
}
