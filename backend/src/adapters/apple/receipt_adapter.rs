//! Apple receipt verification adapter.
//!
//! Implements `AppleReceiptVerifier` against Apple's `verifyReceipt`
//! endpoint. The host is `{subdomain}.itunes.apple.com`, where the subdomain
//! is `buy` for production and `sandbox` for test receipts.
//!
//! # Configuration
//!
//! ```ignore
//! let config = AppleReceiptConfig::new("buy", shared_secret);
//! let adapter = AppleReceiptAdapter::new(config);
//! ```

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::ports::{AppleReceiptVerifier, AppleVerification, VerificationError};

use super::types::{VerifyReceiptRequest, VerifyReceiptResponse};

/// Apple receipt verification configuration.
#[derive(Clone)]
pub struct AppleReceiptConfig {
    /// App-specific shared secret from App Store Connect.
    shared_secret: SecretString,

    /// `buy` or `sandbox`.
    verify_receipt_subdomain: String,

    /// Overrides the Apple host entirely (for testing).
    base_url_override: Option<String>,
}

impl AppleReceiptConfig {
    pub fn new(verify_receipt_subdomain: impl Into<String>, shared_secret: SecretString) -> Self {
        Self {
            shared_secret,
            verify_receipt_subdomain: verify_receipt_subdomain.into(),
            base_url_override: None,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url_override = Some(url.into());
        self
    }

    /// Full `verifyReceipt` URL.
    pub fn verify_receipt_url(&self) -> String {
        match &self.base_url_override {
            Some(base) => format!("{}/verifyReceipt", base.trim_end_matches('/')),
            None => format!(
                "https://{}.itunes.apple.com/verifyReceipt",
                self.verify_receipt_subdomain
            ),
        }
    }
}

impl std::fmt::Debug for AppleReceiptConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppleReceiptConfig")
            .field("shared_secret", &"[REDACTED]")
            .field("verify_receipt_subdomain", &self.verify_receipt_subdomain)
            .field("base_url_override", &self.base_url_override)
            .finish()
    }
}

/// Apple `verifyReceipt` adapter.
pub struct AppleReceiptAdapter {
    config: AppleReceiptConfig,
    http_client: reqwest::Client,
}

impl AppleReceiptAdapter {
    pub fn new(config: AppleReceiptConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl AppleReceiptVerifier for AppleReceiptAdapter {
    async fn verify(&self, receipt: &str) -> Result<AppleVerification, VerificationError> {
        let body = VerifyReceiptRequest::new(receipt, self.config.shared_secret.expose_secret());

        let response = self
            .http_client
            .post(self.config.verify_receipt_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| VerificationError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            tracing::warn!(status, "verifyReceipt returned HTTP error");
            return Err(VerificationError::HttpStatus(status));
        }

        let raw: serde_json::Value = response
            .json()
            .await
            .map_err(|e| VerificationError::InvalidResponse(e.to_string()))?;

        let parsed: VerifyReceiptResponse = serde_json::from_value(raw.clone())
            .map_err(|e| VerificationError::InvalidResponse(e.to_string()))?;

        let transactions = parsed
            .latest_receipt_info
            .iter()
            .map(|info| info.to_transaction())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| VerificationError::InvalidResponse(e.to_string()))?;

        Ok(AppleVerification {
            status: parsed.status,
            transactions,
            latest_receipt: parsed.latest_receipt,
            raw,
        })
    }
}
