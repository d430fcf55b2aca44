//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `apple` - App Store receipt verification
//! - `google` - Google Play Developer API purchase lookups
//! - `graphql` - Subscription store backed by the GraphQL data API
//! - `memory` - In-memory subscription store for tests and local runs
//! - `http` - Function endpoints (isPremium, subscribe)

pub mod apple;
pub mod google;
pub mod graphql;
pub mod http;
pub mod memory;

pub use apple::{AppleReceiptAdapter, AppleReceiptConfig, MockAppleReceiptVerifier};
pub use google::{MockGooglePurchaseVerifier, PlayDeveloperAdapter, PlayDeveloperConfig};
pub use graphql::{GraphQlClient, GraphQlClientConfig, GraphQlSubscriptionStore};
pub use http::{functions_router, FunctionsAppState};
pub use memory::InMemorySubscriptionStore;
