//! Apple receipt verification port.
//!
//! Implementations submit a receipt to Apple's `verifyReceipt` endpoint and
//! return the parsed response. A non-zero status is a normal result, not an
//! error; only transport and decoding failures are errors.

use crate::domain::subscription::ReceiptTransaction;
use async_trait::async_trait;
use thiserror::Error;

/// Port for Apple receipt verification.
#[async_trait]
pub trait AppleReceiptVerifier: Send + Sync {
    /// Verifies a base64 receipt, excluding old transactions.
    async fn verify(&self, receipt: &str) -> Result<AppleVerification, VerificationError>;
}

/// Apple's answer to a receipt verification request.
#[derive(Debug, Clone, PartialEq)]
pub struct AppleVerification {
    /// `0` means the receipt is valid.
    pub status: i64,

    /// Parsed `latest_receipt_info` entries, in Apple's order.
    pub transactions: Vec<ReceiptTransaction>,

    /// Latest base64 receipt, which may differ from the submitted one after a renewal.
    pub latest_receipt: Option<String>,

    /// The response body as received, for surfacing rejections verbatim.
    pub raw: serde_json::Value,
}

impl AppleVerification {
    /// Apple's success status.
    pub const STATUS_OK: i64 = 0;

    pub fn is_ok_status(&self) -> bool {
        self.status == Self::STATUS_OK
    }

    /// Success status with at least one transaction to read dates from.
    pub fn is_valid(&self) -> bool {
        self.is_ok_status() && !self.transactions.is_empty()
    }

    /// Compact JSON of the raw response, keys in the order Apple sent them.
    pub fn raw_json(&self) -> String {
        self.raw.to_string()
    }
}

/// Failure to obtain a usable answer from Apple.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected HTTP status {0} from receipt endpoint")]
    HttpStatus(u16),

    #[error("Invalid receipt response: {0}")]
    InvalidResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;
    use serde_json::json;

    fn verification(status: i64, transactions: usize) -> AppleVerification {
        let tx = ReceiptTransaction {
            expires_at: Timestamp::from_unix_millis(200).unwrap(),
            purchased_at: Timestamp::from_unix_millis(100).unwrap(),
        };
        AppleVerification {
            status,
            transactions: vec![tx; transactions],
            latest_receipt: None,
            raw: json!({ "status": status }),
        }
    }

    #[test]
    fn apple_receipt_verifier_is_object_safe() {
        fn _accepts_dyn(_verifier: &dyn AppleReceiptVerifier) {}
    }

    #[test]
    fn valid_requires_ok_status_and_transactions() {
        assert!(verification(0, 1).is_valid());
        assert!(!verification(0, 0).is_valid());
        assert!(!verification(21007, 1).is_valid());
    }

    #[test]
    fn raw_json_is_compact() {
        assert_eq!(verification(21002, 0).raw_json(), r#"{"status":21002}"#);
    }
}
