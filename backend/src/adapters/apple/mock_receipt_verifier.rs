//! Mock Apple receipt verifier for testing.
//!
//! Returns a pre-configured answer for every receipt and records the
//! receipts it was asked to verify.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::json;

use crate::domain::subscription::ReceiptTransaction;
use crate::ports::{AppleReceiptVerifier, AppleVerification, VerificationError};

/// Mock Apple receipt verifier.
///
/// # Example
///
/// ```ignore
/// let mock = MockAppleReceiptVerifier::valid(vec![tx], Some("renewed"));
/// let verification = mock.verify("receipt").await?;
/// assert_eq!(mock.verified_receipts(), vec!["receipt"]);
/// ```
#[derive(Clone)]
pub struct MockAppleReceiptVerifier {
    inner: Arc<Mutex<MockState>>,
}

struct MockState {
    response: Result<AppleVerification, VerificationError>,
    call_log: Vec<String>,
}

impl MockAppleReceiptVerifier {
    /// Answers every receipt with the given verification.
    pub fn responding(verification: AppleVerification) -> Self {
        Self::with_result(Ok(verification))
    }

    /// Answers with status `0` and the given transactions.
    pub fn valid(transactions: Vec<ReceiptTransaction>, latest_receipt: Option<&str>) -> Self {
        let entries: Vec<_> = transactions
            .iter()
            .map(|t| {
                json!({
                    "expires_date_ms": t.expires_at.as_unix_millis().to_string(),
                    "purchase_date_ms": t.purchased_at.as_unix_millis().to_string(),
                })
            })
            .collect();
        let mut raw = json!({ "status": 0, "latest_receipt_info": entries });
        if let Some(receipt) = latest_receipt {
            raw["latest_receipt"] = json!(receipt);
        }

        Self::responding(AppleVerification {
            status: AppleVerification::STATUS_OK,
            transactions,
            latest_receipt: latest_receipt.map(str::to_string),
            raw,
        })
    }

    /// Answers with a bare non-zero status, e.g. `21007` for a sandbox receipt.
    pub fn rejecting(status: i64) -> Self {
        Self::responding(AppleVerification {
            status,
            transactions: Vec::new(),
            latest_receipt: None,
            raw: json!({ "status": status }),
        })
    }

    /// Fails every call with the given error.
    pub fn failing(error: VerificationError) -> Self {
        Self::with_result(Err(error))
    }

    fn with_result(response: Result<AppleVerification, VerificationError>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockState {
                response,
                call_log: Vec::new(),
            })),
        }
    }

    /// Receipts submitted so far, in call order.
    pub fn verified_receipts(&self) -> Vec<String> {
        self.state().call_log.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state().call_log.len()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl AppleReceiptVerifier for MockAppleReceiptVerifier {
    async fn verify(&self, receipt: &str) -> Result<AppleVerification, VerificationError> {
        let mut state = self.state();
        state.call_log.push(receipt.to_string());
        state.response.clone()
    }
}
