//! Key session: the device keypair plus the unwrapped authorization key.
//!
//! The session is an explicit object passed by reference wherever signing
//! happens; there is no ambient global key cache. The authorization key,
//! once unwrapped, stays in memory for the life of the session until
//! [`KeySession::clear`] is called. There is no implicit expiry.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use crypto_utils::{der, hpke, DeviceKeypair};
use serde_json::Value;
use zeroize::Zeroizing;

use crate::api::find_json_field;
use crate::error::SignerError;
use crate::store::SecretStore;

/// Store key under which the device scalar is persisted.
const DEVICE_SCALAR_KEY: &str = "device_p256_scalar";

pub struct KeySession {
    device: DeviceKeypair,
    authorization_key: Option<Zeroizing<[u8; 32]>>,
}

impl KeySession {
    pub fn new(device: DeviceKeypair) -> Self {
        Self { device, authorization_key: None }
    }

    /// Load the device keypair from `store`, generating and persisting a
    /// fresh one on first use.
    pub fn load_or_generate(store: &mut dyn SecretStore) -> Result<Self, SignerError> {
        if let Some(bytes) = store.get(DEVICE_SCALAR_KEY) {
            let scalar: [u8; 32] = bytes
                .as_slice()
                .try_into()
                .map_err(|_| SignerError::Decode("stored device scalar length".into()))?;
            return Ok(Self::new(DeviceKeypair::from_scalar(&scalar)?));
        }

        let device = DeviceKeypair::generate();
        store.set(DEVICE_SCALAR_KEY, device.scalar_bytes().as_slice());
        tracing::info!("generated new device keypair");
        Ok(Self::new(device))
    }

    pub fn device(&self) -> &DeviceKeypair {
        &self.device
    }

    /// Decrypt a custody-delivered authorization key and cache it.
    ///
    /// `enc` is the encapsulated ephemeral key (raw X9.63 point or SPKI
    /// DER); `ciphertext` is the sealed key material, which may be a bare
    /// 32-byte scalar or a DER ECPrivateKey once decrypted. A key already in
    /// the cache short-circuits; call [`clear`](Self::clear) first to force
    /// a re-unwrap.
    pub fn unwrap_authorization_key(
        &mut self,
        enc: &[u8],
        ciphertext: &[u8],
    ) -> Result<(), SignerError> {
        if self.authorization_key.is_some() {
            return Ok(());
        }

        let scalar_bytes = self.device.scalar_bytes();
        let plaintext = hpke::open(&scalar_bytes, enc, ciphertext)?;
        let scalar = der::private_scalar_from_blob(&plaintext)?;
        self.authorization_key = Some(Zeroizing::new(scalar));
        tracing::debug!("authorization key unwrapped and cached");
        Ok(())
    }

    /// Locate and unwrap the authorization key inside a raw custody-service
    /// response.
    ///
    /// The key arrives nested at varying depths depending on the flow, so
    /// this walks the response depth-first for the first object carrying
    /// both `encapsulated_public_key` and `ciphertext` (base64 strings).
    /// A response without one is a [`SignerError::Decode`], not a silent
    /// no-op.
    pub fn unwrap_from_response(&mut self, response: &Value) -> Result<(), SignerError> {
        let enc = find_json_field(response, "encapsulated_public_key")
            .and_then(Value::as_str)
            .ok_or_else(|| SignerError::Decode("no encapsulated_public_key in response".into()))?;
        let ciphertext = find_json_field(response, "ciphertext")
            .and_then(Value::as_str)
            .ok_or_else(|| SignerError::Decode("no ciphertext in response".into()))?;

        let enc = BASE64
            .decode(enc)
            .map_err(|e| SignerError::Decode(format!("encapsulated key base64: {e}")))?;
        let ciphertext = BASE64
            .decode(ciphertext)
            .map_err(|e| SignerError::Decode(format!("ciphertext base64: {e}")))?;

        self.unwrap_authorization_key(&enc, &ciphertext)
    }

    /// The cached authorization scalar, or [`SignerError::MissingAuthorizationKey`]
    /// if no unwrap has succeeded yet.
    pub fn authorization_key(&self) -> Result<&[u8; 32], SignerError> {
        self.authorization_key
            .as_deref()
            .ok_or(SignerError::MissingAuthorizationKey)
    }

    pub fn has_authorization_key(&self) -> bool {
        self.authorization_key.is_some()
    }

    /// Drop the cached authorization key, zeroizing it.
    pub fn clear(&mut self) {
        self.authorization_key = None;
    }
}
