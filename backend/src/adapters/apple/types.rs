//! Wire types for Apple's `verifyReceipt` endpoint.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, ValidationError};
use crate::domain::subscription::ReceiptTransaction;

/// Request body for `POST /verifyReceipt`.
#[derive(Debug, Serialize)]
pub struct VerifyReceiptRequest<'a> {
    #[serde(rename = "receipt-data")]
    pub receipt_data: &'a str,
    pub password: &'a str,
    /// Apple expects the string `"true"`, not a JSON boolean.
    #[serde(rename = "exclude-old-transactions")]
    pub exclude_old_transactions: &'static str,
}

impl<'a> VerifyReceiptRequest<'a> {
    pub fn new(receipt_data: &'a str, password: &'a str) -> Self {
        Self {
            receipt_data,
            password,
            exclude_old_transactions: "true",
        }
    }
}

/// The fields of a `verifyReceipt` response this crate reads.
///
/// Rejections carry only `status`, so everything else is optional.
#[derive(Debug, Deserialize)]
pub struct VerifyReceiptResponse {
    pub status: i64,
    #[serde(default)]
    pub latest_receipt: Option<String>,
    #[serde(default)]
    pub latest_receipt_info: Vec<LatestReceiptInfo>,
}

/// One `latest_receipt_info` entry. Dates are decimal millisecond strings.
#[derive(Debug, Deserialize)]
pub struct LatestReceiptInfo {
    pub expires_date_ms: String,
    pub purchase_date_ms: String,
}

impl LatestReceiptInfo {
    pub fn to_transaction(&self) -> Result<ReceiptTransaction, ValidationError> {
        Ok(ReceiptTransaction {
            expires_at: Timestamp::parse_unix_millis("expires_date_ms", &self.expires_date_ms)?,
            purchased_at: Timestamp::parse_unix_millis("purchase_date_ms", &self.purchase_date_ms)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_uses_apple_field_names() {
        let body = serde_json::to_value(VerifyReceiptRequest::new("MIIT", "secret")).unwrap();
        assert_eq!(
            body,
            json!({
                "receipt-data": "MIIT",
                "password": "secret",
                "exclude-old-transactions": "true"
            })
        );
    }

    #[test]
    fn rejection_response_parses_with_status_only() {
        let response: VerifyReceiptResponse =
            serde_json::from_value(json!({ "status": 21007 })).unwrap();
        assert_eq!(response.status, 21007);
        assert!(response.latest_receipt.is_none());
        assert!(response.latest_receipt_info.is_empty());
    }

    #[test]
    fn receipt_info_parses_millisecond_strings() {
        let info = LatestReceiptInfo {
            expires_date_ms: "1700000000000".to_string(),
            purchase_date_ms: "1690000000000".to_string(),
        };
        let tx = info.to_transaction().unwrap();
        assert_eq!(tx.expires_at.as_unix_millis(), 1_700_000_000_000);
        assert_eq!(tx.purchased_at.as_unix_millis(), 1_690_000_000_000);
    }

    #[test]
    fn receipt_info_rejects_non_numeric_dates() {
        let info = LatestReceiptInfo {
            expires_date_ms: "soon".to_string(),
            purchase_date_ms: "0".to_string(),
        };
        assert!(info.to_transaction().is_err());
    }
}
