//! Apple receipt verification configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Apple App Store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppleConfig {
    /// `buy` for production receipts, `sandbox` for test receipts
    #[serde(default = "default_subdomain")]
    pub verify_receipt_subdomain: String,

    /// App-specific shared secret
    pub shared_secret: SecretString,
}

impl AppleConfig {
    /// Check if verifying against the sandbox
    pub fn is_sandbox(&self) -> bool {
        self.verify_receipt_subdomain == "sandbox"
    }

    /// Validate Apple configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.verify_receipt_subdomain.as_str() {
            "buy" | "sandbox" => {}
            other => return Err(ValidationError::InvalidAppleSubdomain(other.to_string())),
        }
        if self.shared_secret.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("APPLE_SHARED_SECRET"));
        }
        Ok(())
    }
}

fn default_subdomain() -> String {
    "buy".to_string()
}
