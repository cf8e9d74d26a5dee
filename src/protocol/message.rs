use crate::error::{ChainError, Result};
use crate::identity::Keypair;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

/// The six remote operations, identified on the wire by their code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Status,
    AddTransaction,
    VerifyChain,
    ViewChain,
    Corrupt,
    Repair,
}

impl Operation {
    pub fn code(&self) -> u8 {
        match self {
            Operation::Status => 0,
            Operation::AddTransaction => 1,
            Operation::VerifyChain => 2,
            Operation::ViewChain => 3,
            Operation::Corrupt => 4,
            Operation::Repair => 5,
        }
    }

    pub fn from_code(code: u8) -> Result<Operation> {
        match code {
            0 => Ok(Operation::Status),
            1 => Ok(Operation::AddTransaction),
            2 => Ok(Operation::VerifyChain),
            3 => Ok(Operation::ViewChain),
            4 => Ok(Operation::Corrupt),
            5 => Ok(Operation::Repair),
            other => Err(ChainError::MalformedRequest(format!(
                "Unknown operation code {other}"
            ))),
        }
    }
}

/// One signed request, one line of JSON on the wire.
///
/// Big integers and free text travel as JSON strings, so embedded
/// delimiters cannot corrupt parsing. Field declaration order matches the
/// documented key order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Request {
    #[serde(rename = "clientID")]
    pub client_id: String,
    pub operation: u8,
    pub e: String,
    pub n: String,
    pub sign: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction: Option<String>,
    #[serde(rename = "blockID", default, skip_serializing_if = "Option::is_none")]
    pub block_id: Option<usize>,
    #[serde(rename = "blockData", default, skip_serializing_if = "Option::is_none")]
    pub block_data: Option<String>,
}

impl Request {
    /// Build and sign a status request (op 0).
    pub fn status(keypair: &Keypair) -> Request {
        Self::signed(keypair, Operation::Status, None, None, None, None)
    }

    /// Build and sign an add-transaction request (op 1).
    pub fn add_transaction(keypair: &Keypair, difficulty: u32, transaction: &str) -> Request {
        Self::signed(
            keypair,
            Operation::AddTransaction,
            Some(difficulty),
            Some(transaction.to_string()),
            None,
            None,
        )
    }

    /// Build and sign a verify-chain request (op 2).
    pub fn verify_chain(keypair: &Keypair) -> Request {
        Self::signed(keypair, Operation::VerifyChain, None, None, None, None)
    }

    /// Build and sign a view-chain request (op 3).
    pub fn view_chain(keypair: &Keypair) -> Request {
        Self::signed(keypair, Operation::ViewChain, None, None, None, None)
    }

    /// Build and sign a corrupt request (op 4).
    pub fn corrupt(keypair: &Keypair, block_id: usize, block_data: &str) -> Request {
        Self::signed(
            keypair,
            Operation::Corrupt,
            None,
            None,
            Some(block_id),
            Some(block_data.to_string()),
        )
    }

    /// Build and sign a repair request (op 5).
    pub fn repair(keypair: &Keypair) -> Request {
        Self::signed(keypair, Operation::Repair, None, None, None, None)
    }

    fn signed(
        keypair: &Keypair,
        operation: Operation,
        difficulty: Option<u32>,
        transaction: Option<String>,
        block_id: Option<usize>,
        block_data: Option<String>,
    ) -> Request {
        let mut request = Request {
            client_id: keypair.identifier(),
            operation: operation.code(),
            e: keypair.public_exponent().to_str_radix(10),
            n: keypair.modulus().to_str_radix(10),
            sign: String::new(),
            difficulty,
            transaction,
            block_id,
            block_data,
        };
        let message = request
            .canonical_message()
            .expect("Builder supplies every field its operation needs");
        request.sign = keypair.sign(&message);
        request
    }

    pub fn operation(&self) -> Result<Operation> {
        Operation::from_code(self.operation)
    }

    /// The exact string that is signed and verified for this request:
    /// identifier ++ decimal(e) ++ decimal(n) ++ decimal(op), followed for
    /// op 1 by decimal(difficulty) ++ transaction and for op 4 by
    /// decimal(blockIndex) ++ newPayload. Built from the wire fields as
    /// received, so both sides concatenate identical bytes.
    pub fn canonical_message(&self) -> Result<String> {
        let mut message = format!("{}{}{}{}", self.client_id, self.e, self.n, self.operation);
        match self.operation()? {
            Operation::AddTransaction => {
                let difficulty = self.require_difficulty()?;
                let transaction = self.require_transaction()?;
                message.push_str(&difficulty.to_string());
                message.push_str(transaction);
            }
            Operation::Corrupt => {
                let block_id = self.require_block_id()?;
                let block_data = self.require_block_data()?;
                message.push_str(&block_id.to_string());
                message.push_str(block_data);
            }
            _ => {}
        }
        Ok(message)
    }

    /// Public exponent parsed from its wire representation.
    pub fn public_exponent(&self) -> Result<BigUint> {
        parse_biguint("e", &self.e)
    }

    /// Modulus parsed from its wire representation.
    pub fn modulus(&self) -> Result<BigUint> {
        parse_biguint("n", &self.n)
    }

    pub fn require_difficulty(&self) -> Result<u32> {
        self.difficulty.ok_or_else(|| {
            ChainError::MalformedRequest("Missing 'difficulty' field".to_string())
        })
    }

    pub fn require_transaction(&self) -> Result<&str> {
        self.transaction.as_deref().ok_or_else(|| {
            ChainError::MalformedRequest("Missing 'transaction' field".to_string())
        })
    }

    pub fn require_block_id(&self) -> Result<usize> {
        self.block_id
            .ok_or_else(|| ChainError::MalformedRequest("Missing 'blockID' field".to_string()))
    }

    pub fn require_block_data(&self) -> Result<&str> {
        self.block_data.as_deref().ok_or_else(|| {
            ChainError::MalformedRequest("Missing 'blockData' field".to_string())
        })
    }
}

fn parse_biguint(field: &str, value: &str) -> Result<BigUint> {
    BigUint::parse_bytes(value.as_bytes(), 10).ok_or_else(|| {
        ChainError::MalformedRequest(format!("Field '{field}' is not a decimal integer"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::verify_signature;
    use num_bigint::BigUint;

    fn test_keypair() -> Keypair {
        Keypair::generate_with_retry(160, 20).unwrap()
    }

    #[test]
    fn test_operation_codes_round_trip() {
        for code in 0u8..=5 {
            assert_eq!(Operation::from_code(code).unwrap().code(), code);
        }
        assert!(Operation::from_code(6).is_err());
    }

    #[test]
    fn test_canonical_message_field_order() {
        let keypair = test_keypair();
        let request = Request::add_transaction(&keypair, 3, "pay Bob 5");
        let expected = format!(
            "{}{}{}13pay Bob 5",
            keypair.identifier(),
            keypair.public_exponent(),
            keypair.modulus()
        );
        assert_eq!(request.canonical_message().unwrap(), expected);
    }

    #[test]
    fn test_canonical_message_corrupt_fields() {
        let keypair = test_keypair();
        let request = Request::corrupt(&keypair, 2, "new data");
        let expected = format!(
            "{}{}{}42new data",
            keypair.identifier(),
            keypair.public_exponent(),
            keypair.modulus()
        );
        assert_eq!(request.canonical_message().unwrap(), expected);
    }

    #[test]
    fn test_bare_operations_have_no_trailing_fields() {
        let keypair = test_keypair();
        for (request, code) in [
            (Request::status(&keypair), 0),
            (Request::verify_chain(&keypair), 2),
            (Request::view_chain(&keypair), 3),
            (Request::repair(&keypair), 5),
        ] {
            let expected = format!(
                "{}{}{}{}",
                keypair.identifier(),
                keypair.public_exponent(),
                keypair.modulus(),
                code
            );
            assert_eq!(request.canonical_message().unwrap(), expected);
        }
    }

    #[test]
    fn test_builders_produce_valid_signatures() {
        let keypair = test_keypair();
        let request = Request::add_transaction(&keypair, 2, "tx");
        let message = request.canonical_message().unwrap();
        assert!(verify_signature(
            &message,
            &request.sign,
            keypair.public_exponent(),
            keypair.modulus()
        ));
    }

    #[test]
    fn test_request_json_round_trip() {
        let keypair = test_keypair();
        let request = Request::corrupt(&keypair, 1, "text with , and : and \"quotes\"");
        let json = serde_json::to_string(&request).unwrap();
        let decoded: Request = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn test_request_uses_documented_key_names() {
        let keypair = test_keypair();
        let json = serde_json::to_string(&Request::corrupt(&keypair, 1, "x")).unwrap();
        for key in ["\"clientID\"", "\"operation\"", "\"e\"", "\"n\"", "\"sign\"", "\"blockID\"", "\"blockData\""] {
            assert!(json.contains(key), "missing {key} in {json}");
        }
        // Operation-specific keys of the other branch are absent
        assert!(!json.contains("\"difficulty\""));
        assert!(!json.contains("\"transaction\""));
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        let keypair = test_keypair();
        let mut request = Request::add_transaction(&keypair, 2, "tx");
        request.transaction = None;
        assert!(matches!(
            request.canonical_message(),
            Err(ChainError::MalformedRequest(_))
        ));
    }

    #[test]
    fn test_non_decimal_key_material_is_rejected() {
        let keypair = test_keypair();
        let mut request = Request::status(&keypair);
        request.n = "0x1234".to_string();
        assert!(request.modulus().is_err());
        assert_eq!(
            request.public_exponent().unwrap(),
            BigUint::from(65537u32)
        );
    }
}
