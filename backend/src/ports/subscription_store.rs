//! Subscription store port.
//!
//! Defines the contract for reading and writing subscription records in the
//! data API. Every lookup returns at most one record: the one with the latest
//! `expiryDate` among those matching the filter.
//!
//! # Design
//!
//! - **Append-only**: Records are never updated. A renewal is a new record.
//! - **Derived status**: Nothing here stores "premium"; callers compare
//!   `expiryDate` against the current instant.

use crate::domain::foundation::{DomainError, SubscriptionRecordId, Timestamp, UserId};
use crate::domain::subscription::{GooglePurchaseRef, NewSubscription};
use async_trait::async_trait;

/// Port for subscription persistence.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Expiry of the user's most recent subscription, if any.
    async fn last_expiry_date(&self, user_id: &UserId) -> Result<Option<Timestamp>, DomainError>;

    /// Receipt of the most recent Apple-sourced subscription, if any.
    async fn last_receipt(&self, user_id: &UserId) -> Result<Option<String>, DomainError>;

    /// Token pair of the most recent Google-sourced subscription, if any.
    async fn last_purchase_token(
        &self,
        user_id: &UserId,
    ) -> Result<Option<GooglePurchaseRef>, DomainError>;

    /// Looks up the user by id.
    ///
    /// Returns `None` if no such user exists.
    async fn find_user(&self, user_id: &UserId) -> Result<Option<UserId>, DomainError>;

    /// Creates a subscription record.
    ///
    /// Returns the id assigned by the store. `None` means the mutation
    /// completed without creating a record.
    ///
    /// # Errors
    ///
    /// - `DataApiError` on transport or GraphQL failure
    async fn create_subscription(
        &self,
        subscription: NewSubscription,
    ) -> Result<Option<SubscriptionRecordId>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn SubscriptionStore) {}
    }
}
