//! Subscription records and the store each one originates from.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{SubscriptionRecordId, Timestamp, UserId, ValidationError};

/// Google Play purchase identifiers, always stored as a pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GooglePurchaseRef {
    pub purchase_token: String,
    pub subscription_id: String,
}

impl GooglePurchaseRef {
    pub fn new(
        purchase_token: impl Into<String>,
        subscription_id: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let purchase_token = purchase_token.into();
        let subscription_id = subscription_id.into();
        if purchase_token.is_empty() {
            return Err(ValidationError::empty_field("purchase_token"));
        }
        if subscription_id.is_empty() {
            return Err(ValidationError::empty_field("subscription_id"));
        }
        Ok(Self {
            purchase_token,
            subscription_id,
        })
    }
}

/// The store a subscription was purchased through.
///
/// A record carries either an Apple receipt or a Google token pair, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "store", rename_all = "snake_case")]
pub enum StoreSource {
    Apple { receipt: String },
    Google(GooglePurchaseRef),
}

impl StoreSource {
    pub fn apple(receipt: impl Into<String>) -> Self {
        StoreSource::Apple {
            receipt: receipt.into(),
        }
    }

    pub fn google(purchase: GooglePurchaseRef) -> Self {
        StoreSource::Google(purchase)
    }

    pub fn receipt(&self) -> Option<&str> {
        match self {
            StoreSource::Apple { receipt } => Some(receipt),
            StoreSource::Google(_) => None,
        }
    }

    pub fn google_purchase(&self) -> Option<&GooglePurchaseRef> {
        match self {
            StoreSource::Apple { .. } => None,
            StoreSource::Google(purchase) => Some(purchase),
        }
    }

    /// Short store name used in logs.
    pub fn store_name(&self) -> &'static str {
        match self {
            StoreSource::Apple { .. } => "apple",
            StoreSource::Google(_) => "google",
        }
    }
}

/// Input for the create-subscription mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscription {
    pub user_id: UserId,
    pub expiry_date: Timestamp,
    pub purchase_date: Timestamp,
    pub start_date: Timestamp,
    pub source: StoreSource,
}

/// A persisted subscription record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionRecord {
    pub id: SubscriptionRecordId,
    pub user_id: UserId,
    pub expiry_date: Timestamp,
    pub purchase_date: Timestamp,
    pub start_date: Timestamp,
    pub source: StoreSource,
}

impl SubscriptionRecord {
    /// Materializes a new record with the id assigned by the store.
    pub fn from_new(id: SubscriptionRecordId, new: NewSubscription) -> Self {
        Self {
            id,
            user_id: new.user_id,
            expiry_date: new.expiry_date,
            purchase_date: new.purchase_date,
            start_date: new.start_date,
            source: new.source,
        }
    }
}
