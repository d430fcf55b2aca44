//! Renewal sources - store-specific re-verification strategies for `isPremium`.
//!
//! When no cached record is active, `IsPremiumHandler` asks each source in
//! order for a renewed subscription. A source looks up the user's last
//! purchase from its store, re-verifies it, and returns the record to
//! persist if the store reports an expiry in the future.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::subscription::{
    NewSubscription, ReceiptPeriod, StoreSource, SubscriptionError,
};
use crate::ports::{AppleReceiptVerifier, GooglePurchaseVerifier, SubscriptionStore};

/// A store that can re-verify a user's last purchase.
#[async_trait]
pub trait RenewalSource: Send + Sync {
    /// Store name used in logs.
    fn name(&self) -> &'static str;

    /// Returns the renewed subscription to persist, or `None` when this store
    /// has nothing active for the user.
    async fn renew(
        &self,
        store: &dyn SubscriptionStore,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<Option<NewSubscription>, SubscriptionError>;
}

/// Re-submits the last stored Apple receipt.
///
/// Only the first `latest_receipt_info` entry is considered.
pub struct AppleRenewal {
    verifier: Arc<dyn AppleReceiptVerifier>,
}

impl AppleRenewal {
    pub fn new(verifier: Arc<dyn AppleReceiptVerifier>) -> Self {
        Self { verifier }
    }
}

#[async_trait]
impl RenewalSource for AppleRenewal {
    fn name(&self) -> &'static str {
        "apple"
    }

    async fn renew(
        &self,
        store: &dyn SubscriptionStore,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<Option<NewSubscription>, SubscriptionError> {
        let Some(receipt) = store.last_receipt(user_id).await? else {
            return Ok(None);
        };

        let verification = self
            .verifier
            .verify(&receipt)
            .await
            .map_err(|e| SubscriptionError::unexpected(format!("Apple verification: {}", e)))?;

        if !verification.is_ok_status() {
            tracing::info!(
                user_id = %user_id,
                status = verification.status,
                "Stored Apple receipt no longer verifies"
            );
            return Ok(None);
        }

        let Some(period) = ReceiptPeriod::first(&verification.transactions) else {
            return Ok(None);
        };
        if !period.expiry_date.is_after(&now) {
            return Ok(None);
        }

        Ok(Some(NewSubscription {
            user_id: user_id.clone(),
            expiry_date: period.expiry_date,
            purchase_date: period.purchase_date,
            start_date: now,
            source: StoreSource::apple(verification.latest_receipt.unwrap_or(receipt)),
        }))
    }
}

/// Re-verifies the last stored Google purchase token.
pub struct GoogleRenewal {
    verifier: Arc<dyn GooglePurchaseVerifier>,
}

impl GoogleRenewal {
    pub fn new(verifier: Arc<dyn GooglePurchaseVerifier>) -> Self {
        Self { verifier }
    }
}

#[async_trait]
impl RenewalSource for GoogleRenewal {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn renew(
        &self,
        store: &dyn SubscriptionStore,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<Option<NewSubscription>, SubscriptionError> {
        let Some(purchase) = store.last_purchase_token(user_id).await? else {
            return Ok(None);
        };

        let verification = self.verifier.verify(&purchase).await;
        tracing::debug!(
            user_id = %user_id,
            outcome = verification.tag(),
            "Google purchase re-verified"
        );

        match verification.into_purchase() {
            Some(found) if found.expiry_time.is_after(&now) => Ok(Some(NewSubscription {
                user_id: user_id.clone(),
                expiry_date: found.expiry_time,
                purchase_date: now,
                start_date: found.start_time,
                source: StoreSource::google(purchase),
            })),
            _ => Ok(None),
        }
    }
}
