//! # signer-core
//!
//! Client-side signing pipeline for accounts held at a remote custody
//! service. The device keeps a P-256 keypair, unwraps an HPKE-delivered
//! authorization key into an explicit [`KeySession`], builds transactions
//! with `chain-sol`, and drives the service's two-phase prepare/sign/submit
//! protocol. Raw private key material never leaves the process.

pub mod api;
pub mod client;
pub mod error;
pub mod kms;
pub mod orchestrate;
pub mod session;
pub mod store;
pub mod transfer;

pub use api::{FeeConfig, PrepareRequest, SignedPayload, SubmitRequest};
pub use client::{CustodyApi, CustodyConfig, HttpCustodyClient};
pub use error::{SignerError, Stage};
pub use kms::{sign_payloads, KMS_PROVIDER};
pub use orchestrate::{execute, Outcome};
pub use session::KeySession;
pub use store::{MemoryStore, SecretStore};
pub use transfer::{build_eurc_transfer, build_token_transfer};
