//! # crypto-utils
//!
//! Key codecs and hybrid encryption for the remote-custody signing client:
//! minimal DER/SPKI handling, canonical JSON for signing pre-images, the
//! HPKE ciphersuite the custody service uses to deliver authorization keys,
//! and the device P-256 keypair.

pub mod canonical;
pub mod der;
pub mod error;
pub mod hpke;
pub mod keys;

pub use error::CryptoError;
pub use keys::DeviceKeypair;
