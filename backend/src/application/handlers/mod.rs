//! Application handlers.
//!
//! Command and query handlers that orchestrate the subscription ports.

pub mod subscription;

pub use subscription::{
    AppleRenewal, GoogleRenewal, IsPremiumHandler, IsPremiumQuery, RenewalSource,
    SubscribeCommand, SubscribeHandler, SubscribeResult,
};
