//! GraphQL data API adapter.
//!
//! Subscription records and users live in an external GraphQL backend.
//! `GraphQlSubscriptionStore` implements the `SubscriptionStore` port on top
//! of a small `GraphQlClient`.

mod client;
mod subscription_store;

pub use client::{GraphQlClient, GraphQlClientConfig, GraphQlError};
pub use subscription_store::GraphQlSubscriptionStore;
