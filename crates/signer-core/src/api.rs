//! Request and response shapes for the custody service's transaction
//! endpoints, plus a small search helper for digging fields out of its
//! loosely structured responses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fee configuration attached to every prepare call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeConfig {
    pub currency: String,
    pub payer_address: String,
}

/// Body of `POST /accounts/{address}/transactions`.
#[derive(Debug, Clone, Serialize)]
pub struct PrepareRequest {
    /// Unsigned transaction, base64.
    pub transaction: String,
    pub transaction_signers: Option<Vec<String>>,
    pub fee_config: FeeConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrepareResponse {
    pub data: PrepareData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrepareData {
    /// Fee-adjusted transaction rebuilt by the service, base64.
    pub transaction: String,
    /// Signable payload stubs, each base64. Signatures must be returned in
    /// this exact order.
    #[serde(default)]
    pub kms_payloads: Vec<String>,
    #[serde(default)]
    pub transaction_signers: Vec<String>,
}

/// One signed payload returned at submit time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignedPayload {
    pub provider: String,
    /// DER-encoded ECDSA signature, base64.
    pub signature: String,
}

/// Body of `POST /accounts/{address}/submit`.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitRequest {
    pub transaction: String,
    pub kms_payloads: Vec<SignedPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    pub data: SubmitData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitData {
    pub transaction_signature: Option<String>,
}

/// Find the first value under `field` anywhere in `value`, searching
/// depth-first with object fields visited in the order they arrived.
pub fn find_json_field<'a>(value: &'a Value, field: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => {
            if let Some(found) = map.get(field) {
                return Some(found);
            }
            map.values().find_map(|v| find_json_field(v, field))
        }
        Value::Array(items) => items.iter().find_map(|v| find_json_field(v, field)),
        _ => None,
    }
}
