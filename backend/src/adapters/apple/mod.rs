//! Apple App Store receipt verification adapter.
//!
//! Implements the `AppleReceiptVerifier` port against the legacy
//! `verifyReceipt` endpoint.
//!
//! # Configuration
//!
//! - `APPLE_VERIFY_RECEIPT_SUBDOMAIN`: `buy` (production) or `sandbox`
//! - `APPLE_SHARED_SECRET`: App-specific shared secret

mod mock_receipt_verifier;
mod receipt_adapter;
mod types;

pub use mock_receipt_verifier::MockAppleReceiptVerifier;
pub use receipt_adapter::{AppleReceiptAdapter, AppleReceiptConfig};
pub use types::{LatestReceiptInfo, VerifyReceiptRequest, VerifyReceiptResponse};
