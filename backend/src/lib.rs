//! Subscription Functions - premium status and store subscriptions
//!
//! Two function endpoints back the mobile apps' premium features: `isPremium`
//! answers whether a user currently holds an active subscription, renewing it
//! from Apple or Google Play when the stored one has lapsed, and `subscribe`
//! records a freshly purchased subscription after verifying it with the store.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
