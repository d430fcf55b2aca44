//! Subscription handlers.
//!
//! ## Queries
//! - `IsPremiumHandler` - current premium status, renewing from the stores when the cached record lapsed
//!
//! ## Commands
//! - `SubscribeHandler` - verify a new receipt or purchase token and record it

mod is_premium;
mod renewal_sources;
mod subscribe;

pub use is_premium::{IsPremiumHandler, IsPremiumQuery};
pub use renewal_sources::{AppleRenewal, GoogleRenewal, RenewalSource};
pub use subscribe::{SubscribeCommand, SubscribeHandler, SubscribeResult};
