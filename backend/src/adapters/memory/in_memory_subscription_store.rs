//! In-Memory Subscription Store Adapter
//!
//! Holds users and subscription records in memory with the same
//! "latest by expiry" lookup semantics as the GraphQL data API.
//! Useful for testing and development.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, SubscriptionRecordId, Timestamp, UserId};
use crate::domain::subscription::{GooglePurchaseRef, NewSubscription, SubscriptionRecord};
use crate::ports::SubscriptionStore;

/// In-memory storage for users and subscription records
#[derive(Debug, Clone, Default)]
pub struct InMemorySubscriptionStore {
    users: Arc<RwLock<HashSet<UserId>>>,
    records: Arc<RwLock<Vec<SubscriptionRecord>>>,
    calls: Arc<RwLock<Vec<&'static str>>>,
    reject_creates: bool,
}

impl InMemorySubscriptionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose create mutation completes without returning an id
    pub fn rejecting_creates() -> Self {
        Self {
            reject_creates: true,
            ..Self::default()
        }
    }

    /// Register a user
    pub async fn add_user(&self, user_id: UserId) {
        self.users.write().await.insert(user_id);
    }

    /// Seed an existing record
    pub async fn insert_record(&self, record: SubscriptionRecord) {
        self.records.write().await.push(record);
    }

    /// All records, in insertion order
    pub async fn records(&self) -> Vec<SubscriptionRecord> {
        self.records.read().await.clone()
    }

    /// Names of the port methods called so far
    pub async fn calls(&self) -> Vec<&'static str> {
        self.calls.read().await.clone()
    }

    async fn record_call(&self, method: &'static str) {
        self.calls.write().await.push(method);
    }

    /// Latest-expiring record of the user that passes `filter`.
    async fn latest_where<F>(&self, user_id: &UserId, filter: F) -> Option<SubscriptionRecord>
    where
        F: Fn(&SubscriptionRecord) -> bool,
    {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| &r.user_id == user_id && filter(r))
            .max_by_key(|r| r.expiry_date)
            .cloned()
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn last_expiry_date(&self, user_id: &UserId) -> Result<Option<Timestamp>, DomainError> {
        self.record_call("last_expiry_date").await;
        Ok(self
            .latest_where(user_id, |_| true)
            .await
            .map(|r| r.expiry_date))
    }

    async fn last_receipt(&self, user_id: &UserId) -> Result<Option<String>, DomainError> {
        self.record_call("last_receipt").await;
        Ok(self
            .latest_where(user_id, |r| r.source.receipt().is_some())
            .await
            .and_then(|r| r.source.receipt().map(str::to_string)))
    }

    async fn last_purchase_token(
        &self,
        user_id: &UserId,
    ) -> Result<Option<GooglePurchaseRef>, DomainError> {
        self.record_call("last_purchase_token").await;
        Ok(self
            .latest_where(user_id, |r| r.source.google_purchase().is_some())
            .await
            .and_then(|r| r.source.google_purchase().cloned()))
    }

    async fn find_user(&self, user_id: &UserId) -> Result<Option<UserId>, DomainError> {
        self.record_call("find_user").await;
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn create_subscription(
        &self,
        subscription: NewSubscription,
    ) -> Result<Option<SubscriptionRecordId>, DomainError> {
        self.record_call("create_subscription").await;
        if self.reject_creates {
            return Ok(None);
        }
        let id = SubscriptionRecordId::generate();
        self.records
            .write()
            .await
            .push(SubscriptionRecord::from_new(id.clone(), subscription));
        Ok(Some(id))
    }
}
