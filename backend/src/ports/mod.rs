//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the handlers and the outside world. Adapters implement these ports.
//!
//! - `SubscriptionStore` - GraphQL data API reads and the create mutation
//! - `AppleReceiptVerifier` - Apple `verifyReceipt`
//! - `GooglePurchaseVerifier` - Google Play Developer API subscription lookup

mod purchase_verifier;
mod receipt_verifier;
mod subscription_store;

pub use purchase_verifier::{GooglePurchaseVerifier, GoogleVerification, SubscriptionPurchase};
pub use receipt_verifier::{AppleReceiptVerifier, AppleVerification, VerificationError};
pub use subscription_store::SubscriptionStore;
