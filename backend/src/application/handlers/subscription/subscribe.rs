//! SubscribeHandler - Command handler for recording a newly purchased subscription.

use std::sync::Arc;

use crate::domain::foundation::{SubscriptionRecordId, Timestamp, UserId};
use crate::domain::subscription::{
    GooglePurchaseRef, NewSubscription, PersistStage, ReceiptPeriod, StoreSource,
    SubscriptionError,
};
use crate::ports::{AppleReceiptVerifier, GooglePurchaseVerifier, SubscriptionStore};

/// Command to record a purchase from either store.
///
/// Empty strings are treated as absent. A receipt takes precedence over a
/// Google token pair.
#[derive(Debug, Clone, Default)]
pub struct SubscribeCommand {
    pub user_id: Option<UserId>,
    pub receipt: Option<String>,
    pub purchase_token: Option<String>,
    pub subscription_id: Option<String>,
}

/// Result of a recorded subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribeResult {
    pub subscription_id: SubscriptionRecordId,
    pub store: &'static str,
}

/// The purchase proof carried by a command.
enum PurchaseInput {
    Apple(String),
    Google(GooglePurchaseRef),
}

impl SubscribeCommand {
    fn purchase_input(&self) -> Option<PurchaseInput> {
        fn present(value: &Option<String>) -> Option<&str> {
            value.as_deref().filter(|v| !v.is_empty())
        }

        if let Some(receipt) = present(&self.receipt) {
            return Some(PurchaseInput::Apple(receipt.to_string()));
        }
        let token = present(&self.purchase_token)?;
        let subscription_id = present(&self.subscription_id)?;
        GooglePurchaseRef::new(token, subscription_id)
            .ok()
            .map(PurchaseInput::Google)
    }
}

/// Handler for recording purchases.
///
/// Verifies the receipt or token with its store, then persists one record.
pub struct SubscribeHandler {
    store: Arc<dyn SubscriptionStore>,
    apple: Arc<dyn AppleReceiptVerifier>,
    google: Arc<dyn GooglePurchaseVerifier>,
}

impl SubscribeHandler {
    /// Message returned in place of any unexpected failure.
    pub const UNEXPECTED_ERROR_MESSAGE: &'static str =
        "An unexpected error occured during subscribe.";

    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        apple: Arc<dyn AppleReceiptVerifier>,
        google: Arc<dyn GooglePurchaseVerifier>,
    ) -> Self {
        Self {
            store,
            apple,
            google,
        }
    }

    pub async fn handle(&self, cmd: SubscribeCommand) -> Result<SubscribeResult, SubscriptionError> {
        // 1. Identity
        let user_id = cmd.user_id.clone().ok_or(SubscriptionError::LoginRequired)?;

        // 2. User exists
        let Some(user_id) = self.store.find_user(&user_id).await? else {
            return Err(SubscriptionError::user_not_found(user_id));
        };

        // 3. Purchase proof
        let input = cmd.purchase_input().ok_or(SubscriptionError::MissingInput)?;

        match input {
            PurchaseInput::Apple(receipt) => self.subscribe_apple(user_id, receipt).await,
            PurchaseInput::Google(purchase) => self.subscribe_google(user_id, purchase).await,
        }
    }

    async fn subscribe_apple(
        &self,
        user_id: UserId,
        receipt: String,
    ) -> Result<SubscribeResult, SubscriptionError> {
        let verification = self
            .apple
            .verify(&receipt)
            .await
            .map_err(|e| SubscriptionError::unexpected(format!("Apple verification: {}", e)))?;

        let period = verification
            .is_valid()
            .then(|| ReceiptPeriod::spanning(&verification.transactions))
            .flatten();
        let Some(period) = period else {
            tracing::warn!(
                user_id = %user_id,
                status = verification.status,
                "Apple rejected receipt"
            );
            return Err(SubscriptionError::apple_rejected(verification.raw_json()));
        };

        let subscription = NewSubscription {
            user_id,
            expiry_date: period.expiry_date,
            purchase_date: period.purchase_date,
            start_date: period.purchase_date,
            source: StoreSource::apple(verification.latest_receipt.unwrap_or(receipt)),
        };

        self.persist(subscription, PersistStage::AppleReceipt).await
    }

    async fn subscribe_google(
        &self,
        user_id: UserId,
        purchase: GooglePurchaseRef,
    ) -> Result<SubscribeResult, SubscriptionError> {
        let verification = self.google.verify(&purchase).await;
        let outcome = verification.tag();

        let Some(found) = verification.into_purchase() else {
            tracing::warn!(
                user_id = %user_id,
                subscription_id = %purchase.subscription_id,
                outcome,
                "Google purchase could not be verified"
            );
            return Err(SubscriptionError::PurchaseVerificationFailed);
        };

        let subscription = NewSubscription {
            user_id,
            expiry_date: found.expiry_time,
            purchase_date: Timestamp::now(),
            start_date: found.start_time,
            source: StoreSource::google(purchase),
        };

        self.persist(subscription, PersistStage::GooglePurchase).await
    }

    async fn persist(
        &self,
        subscription: NewSubscription,
        stage: PersistStage,
    ) -> Result<SubscribeResult, SubscriptionError> {
        let store = subscription.source.store_name();
        let user_id = subscription.user_id.clone();

        let id = self
            .store
            .create_subscription(subscription)
            .await?
            .ok_or(SubscriptionError::PersistFailed(stage))?;

        tracing::info!(
            user_id = %user_id,
            subscription_id = %id,
            store,
            "Subscription created"
        );

        Ok(SubscribeResult {
            subscription_id: id,
            store,
        })
    }
}
