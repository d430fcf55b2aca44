//! Google Play purchase verification port.
//!
//! Verification never fails from the caller's point of view. Transport,
//! auth and not-found outcomes are reported as tags so callers can log them,
//! then collapsed to "no purchase" with [`GoogleVerification::into_purchase`].

use crate::domain::foundation::Timestamp;
use crate::domain::subscription::GooglePurchaseRef;
use async_trait::async_trait;

/// Port for Google Play subscription lookups.
#[async_trait]
pub trait GooglePurchaseVerifier: Send + Sync {
    /// Fetches the subscription purchase for a token pair.
    async fn verify(&self, purchase: &GooglePurchaseRef) -> GoogleVerification;
}

/// Dates of a Google Play subscription purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionPurchase {
    pub start_time: Timestamp,
    pub expiry_time: Timestamp,
}

/// Outcome of a Google Play lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoogleVerification {
    Verified(SubscriptionPurchase),
    NotFound,
    TransportError(String),
}

impl GoogleVerification {
    /// Short tag for logs.
    pub fn tag(&self) -> &'static str {
        match self {
            GoogleVerification::Verified(_) => "verified",
            GoogleVerification::NotFound => "not_found",
            GoogleVerification::TransportError(_) => "transport_error",
        }
    }

    /// Drops the failure detail.
    pub fn into_purchase(self) -> Option<SubscriptionPurchase> {
        match self {
            GoogleVerification::Verified(purchase) => Some(purchase),
            GoogleVerification::NotFound | GoogleVerification::TransportError(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn google_purchase_verifier_is_object_safe() {
        fn _accepts_dyn(_verifier: &dyn GooglePurchaseVerifier) {}
    }

    #[test]
    fn failures_collapse_to_none() {
        assert_eq!(GoogleVerification::NotFound.into_purchase(), None);
        assert_eq!(
            GoogleVerification::TransportError("timeout".to_string()).into_purchase(),
            None
        );
    }

    #[test]
    fn verified_keeps_purchase() {
        let purchase = SubscriptionPurchase {
            start_time: Timestamp::from_unix_millis(1_000).unwrap(),
            expiry_time: Timestamp::from_unix_millis(2_000).unwrap(),
        };
        let verification = GoogleVerification::Verified(purchase);
        assert_eq!(verification.tag(), "verified");
        assert_eq!(verification.into_purchase(), Some(purchase));
    }
}
