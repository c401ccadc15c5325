//! Two-phase execution against the custody service.
//!
//! State machine: Building -> Prepared -> Signed -> Submitted -> Confirmed
//! or Failed. Every transition either advances or terminates; nothing is
//! retried here. A retry means starting over from Building, because the
//! blockhash and payload stubs of a dead run are stale.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chain_sol::message::Message;

use crate::api::{FeeConfig, PrepareRequest, SubmitRequest};
use crate::client::CustodyApi;
use crate::error::{SignerError, Stage};
use crate::kms;
use crate::session::KeySession;

/// Terminal result of one execution.
#[derive(Debug)]
pub enum Outcome {
    Confirmed { transaction_signature: String },
    Failed { stage: Stage, error: SignerError },
}

impl Outcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Outcome::Confirmed { .. })
    }

    /// The stage a failed run died in, if it failed.
    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            Outcome::Failed { stage, .. } => Some(*stage),
            Outcome::Confirmed { .. } => None,
        }
    }
}

/// Drive a locally built message through prepare, sign, and submit.
///
/// The session must already hold the unwrapped authorization key; the signer
/// is never invoked when prepare fails, and a missing key fails the run at
/// the sign stage. Abandoning the future after prepare needs no compensation:
/// the staged server-side transaction expires with its blockhash.
pub async fn execute<A: CustodyApi>(
    api: &A,
    session: &KeySession,
    account: &str,
    message: &Message,
    fee_config: FeeConfig,
) -> Outcome {
    // Building -> Prepared
    let request = PrepareRequest {
        transaction: BASE64.encode(message.serialize_unsigned()),
        transaction_signers: Some(
            message.signer_keys().iter().map(|k| k.to_base58()).collect(),
        ),
        fee_config,
    };
    let prepared = match api.prepare(account, &request).await {
        Ok(response) => response.data,
        Err(error) => {
            tracing::warn!(%error, "prepare failed");
            return Outcome::Failed { stage: Stage::Prepare, error };
        }
    };
    tracing::debug!(payloads = prepared.kms_payloads.len(), "transaction prepared");

    // Prepared -> Signed
    let signed = match kms::sign_payloads(session, &prepared.kms_payloads) {
        Ok(signed) => signed,
        Err(error) => {
            tracing::warn!(%error, "payload signing failed");
            return Outcome::Failed { stage: Stage::Sign, error };
        }
    };

    // Signed -> Submitted
    let request = SubmitRequest {
        transaction: prepared.transaction,
        kms_payloads: signed,
    };
    let submitted = match api.submit(account, &request).await {
        Ok(response) => response.data,
        Err(error) => {
            tracing::warn!(%error, "submit failed");
            return Outcome::Failed { stage: Stage::Submit, error };
        }
    };

    // Submitted -> Confirmed, but only with a signature in hand.
    match submitted.transaction_signature {
        Some(transaction_signature) => {
            tracing::info!(%transaction_signature, "transaction confirmed");
            Outcome::Confirmed { transaction_signature }
        }
        None => Outcome::Failed {
            stage: Stage::Submit,
            error: SignerError::Decode(
                "submit succeeded without a transaction signature".into(),
            ),
        },
    }
}
