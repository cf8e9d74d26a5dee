use crate::core::{ChainAudit, HashRecord};
use serde::{Deserialize, Serialize};

/// Body of the uniform rejection sent for any failed request.
pub const GENERIC_REJECTION: &str = "Error In Request";

/// Generic error reply. Authentication failures always use
/// [`GENERIC_REJECTION`] regardless of which check failed; parse and
/// ledger errors carry their own short message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    #[serde(rename = "Error")]
    pub error: String,
}

impl ErrorResponse {
    pub fn rejection() -> ErrorResponse {
        ErrorResponse {
            error: GENERIC_REJECTION.to_string(),
        }
    }
}

/// Reply to op 0. The nonce travels as a decimal string since it is
/// arbitrary precision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(rename = "Operation")]
    pub operation: u8,
    #[serde(rename = "Current size of chain")]
    pub chain_size: usize,
    #[serde(rename = "Current hashes per second by this machine")]
    pub hashes_per_second: u64,
    #[serde(rename = "Difficulty of most recent block")]
    pub latest_difficulty: u32,
    #[serde(rename = "Nonce for most recent block")]
    pub latest_nonce: String,
    #[serde(rename = "Chain hash")]
    pub chain_hash: String,
}

/// Reply to ops 1 and 5: the operation echo and how long it took.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimedResponse {
    #[serde(rename = "Operation")]
    pub operation: u8,
    #[serde(rename = "Execution Time")]
    pub execution_time_ms: u64,
}

/// Reply to op 2. `hash_target` is present only when the chain is invalid
/// and the fault pins down a record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
    #[serde(rename = "Operation")]
    pub operation: u8,
    #[serde(rename = "Execution Time")]
    pub execution_time_ms: u64,
    #[serde(rename = "isValid")]
    pub is_valid: bool,
    #[serde(rename = "invalidBlockIndex")]
    pub invalid_block_index: usize,
    #[serde(rename = "hashTarget", default, skip_serializing_if = "Option::is_none")]
    pub hash_target: Option<String>,
}

impl VerifyResponse {
    pub fn from_audit(audit: &ChainAudit, execution_time_ms: u64) -> VerifyResponse {
        let (is_valid, invalid_block_index, hash_target) = match audit {
            ChainAudit::Valid => (true, 0, None),
            ChainAudit::Invalid(fault) => (
                false,
                fault.index().unwrap_or(0),
                fault.target().map(str::to_string),
            ),
        };
        VerifyResponse {
            operation: 2,
            execution_time_ms,
            is_valid,
            invalid_block_index,
            hash_target,
        }
    }
}

/// One record as rendered by the view operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordView {
    pub index: usize,
    #[serde(rename = "time stamp")]
    pub timestamp: i64,
    #[serde(rename = "Tx")]
    pub tx: String,
    #[serde(rename = "PrevHash")]
    pub prev_hash: String,
    pub nonce: String,
    pub difficulty: u32,
}

impl From<&HashRecord> for RecordView {
    fn from(record: &HashRecord) -> Self {
        RecordView {
            index: record.get_index(),
            timestamp: record.get_timestamp(),
            tx: record.get_payload().to_string(),
            prev_hash: record.get_prev_hash().to_string(),
            nonce: record.get_nonce().to_str_radix(10),
            difficulty: record.get_difficulty(),
        }
    }
}

/// Reply to op 3: every record plus the cached chain hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewChainResponse {
    pub ds_chain: Vec<RecordView>,
    #[serde(rename = "chainHash")]
    pub chain_hash: String,
}

/// Reply to op 4; the echoed operation confirms the mutation was applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorruptResponse {
    #[serde(rename = "Operation")]
    pub operation: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ChainFault;

    #[test]
    fn test_status_response_key_names() {
        let response = StatusResponse {
            operation: 0,
            chain_size: 3,
            hashes_per_second: 100_000,
            latest_difficulty: 2,
            latest_nonce: "41".to_string(),
            chain_hash: "00ab".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        for key in [
            "\"Operation\"",
            "\"Current size of chain\"",
            "\"Current hashes per second by this machine\"",
            "\"Difficulty of most recent block\"",
            "\"Nonce for most recent block\"",
            "\"Chain hash\"",
        ] {
            assert!(json.contains(key), "missing {key} in {json}");
        }
    }

    #[test]
    fn test_verify_response_omits_target_when_valid() {
        let response = VerifyResponse::from_audit(&ChainAudit::Valid, 1);
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"isValid\":true"));
        assert!(!json.contains("hashTarget"));
    }

    #[test]
    fn test_verify_response_carries_fault_diagnostics() {
        let audit = ChainAudit::Invalid(ChainFault::ProofOfWork {
            index: 1,
            target: "00".to_string(),
        });
        let response = VerifyResponse::from_audit(&audit, 2);
        assert!(!response.is_valid);
        assert_eq!(response.invalid_block_index, 1);
        assert_eq!(response.hash_target.as_deref(), Some("00"));
    }

    #[test]
    fn test_verify_response_tip_mismatch_has_no_target() {
        let response = VerifyResponse::from_audit(&ChainAudit::Invalid(ChainFault::TipMismatch), 0);
        assert!(!response.is_valid);
        assert_eq!(response.hash_target, None);
    }

    #[test]
    fn test_error_response_shape() {
        let json = serde_json::to_string(&ErrorResponse::rejection()).unwrap();
        assert_eq!(json, "{\"Error\":\"Error In Request\"}");
    }

    #[test]
    fn test_view_chain_round_trip() {
        let view = ViewChainResponse {
            ds_chain: vec![RecordView {
                index: 0,
                timestamp: 1_583_000_000_000,
                tx: "Genesis".to_string(),
                prev_hash: String::new(),
                nonce: "17".to_string(),
                difficulty: 2,
            }],
            chain_hash: "00cd".to_string(),
        };
        let json = serde_json::to_string(&view).unwrap();
        assert!(json.contains("\"ds_chain\""));
        assert!(json.contains("\"time stamp\""));
        assert!(json.contains("\"Tx\""));
        assert!(json.contains("\"PrevHash\""));
        assert!(json.contains("\"chainHash\""));
        let decoded: ViewChainResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.ds_chain.len(), 1);
        assert_eq!(decoded.ds_chain[0].tx, "Genesis");
    }
}
