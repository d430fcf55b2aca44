//! IsPremiumHandler - Query handler for a user's current premium status.

use std::sync::Arc;

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::subscription::{PremiumStatus, SubscriptionError};
use crate::ports::{AppleReceiptVerifier, GooglePurchaseVerifier, SubscriptionStore};

use super::renewal_sources::{AppleRenewal, GoogleRenewal, RenewalSource};

/// Query for the caller's premium status.
///
/// `user_id` is `None` when the invocation carries no authenticated identity.
#[derive(Debug, Clone)]
pub struct IsPremiumQuery {
    pub user_id: Option<UserId>,
}

/// Handler for premium status checks.
///
/// Checks the latest stored record first. When it has lapsed, each renewal
/// source is asked in turn to re-verify the user's last purchase with its
/// store. The first renewal that is persisted wins.
pub struct IsPremiumHandler {
    store: Arc<dyn SubscriptionStore>,
    sources: Vec<Box<dyn RenewalSource>>,
}

impl IsPremiumHandler {
    /// Message returned in place of any unexpected failure.
    pub const UNEXPECTED_ERROR_MESSAGE: &'static str =
        "An unexpected error occured during authentication.";

    /// Apple first, then Google.
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        apple: Arc<dyn AppleReceiptVerifier>,
        google: Arc<dyn GooglePurchaseVerifier>,
    ) -> Self {
        Self::with_sources(
            store,
            vec![
                Box::new(AppleRenewal::new(apple)),
                Box::new(GoogleRenewal::new(google)),
            ],
        )
    }

    pub fn with_sources(
        store: Arc<dyn SubscriptionStore>,
        sources: Vec<Box<dyn RenewalSource>>,
    ) -> Self {
        Self { store, sources }
    }

    pub async fn handle(&self, query: IsPremiumQuery) -> Result<PremiumStatus, SubscriptionError> {
        let user_id = query.user_id.ok_or(SubscriptionError::LoginRequired)?;
        let now = Timestamp::now();

        // 1. Cached record still valid
        if let Some(expiry) = self.store.last_expiry_date(&user_id).await? {
            if expiry.is_after(&now) {
                return Ok(PremiumStatus::active_until(expiry));
            }
        }

        // 2. Re-verify with each store in order
        for source in &self.sources {
            let Some(renewal) = source.renew(self.store.as_ref(), &user_id, now).await? else {
                continue;
            };

            let expiry = renewal.expiry_date;
            match self.store.create_subscription(renewal).await? {
                Some(id) => {
                    tracing::info!(
                        user_id = %user_id,
                        subscription_id = %id,
                        source = source.name(),
                        expiry_date = %expiry,
                        "Subscription renewed"
                    );
                    return Ok(PremiumStatus::active_until(expiry));
                }
                None => {
                    tracing::warn!(
                        user_id = %user_id,
                        source = source.name(),
                        "Renewed subscription was not persisted"
                    );
                }
            }
        }

        // 3. Nothing active
        Ok(PremiumStatus::inactive_at(now))
    }
}
