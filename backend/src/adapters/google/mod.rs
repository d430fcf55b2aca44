//! Google Play purchase verification adapter.
//!
//! Implements the `GooglePurchaseVerifier` port against the Play Developer
//! API, authenticated with a service-account key file.
//!
//! # Configuration
//!
//! - `ANDROID_PACKAGE_NAME`: Application id the purchases belong to
//! - `GOOGLE_APPLICATION_CREDENTIALS`: Path to the service-account JSON key

mod mock_purchase_verifier;
mod play_developer;
mod service_account;

pub use mock_purchase_verifier::MockGooglePurchaseVerifier;
pub use play_developer::{PlayDeveloperAdapter, PlayDeveloperConfig};
pub use service_account::{
    GoogleAuthError, ServiceAccountKey, ServiceAccountTokenProvider, ANDROID_PUBLISHER_SCOPE,
};
