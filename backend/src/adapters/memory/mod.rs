//! In-memory adapters for tests and local runs without a data API.

mod in_memory_subscription_store;

pub use in_memory_subscription_store::InMemorySubscriptionStore;
