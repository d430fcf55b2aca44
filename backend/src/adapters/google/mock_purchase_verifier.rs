//! Mock Google purchase verifier for testing.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::foundation::Timestamp;
use crate::domain::subscription::GooglePurchaseRef;
use crate::ports::{GooglePurchaseVerifier, GoogleVerification, SubscriptionPurchase};

/// Mock Google purchase verifier.
///
/// Returns the same outcome for every token and records the token pairs it
/// was asked about.
#[derive(Clone)]
pub struct MockGooglePurchaseVerifier {
    inner: Arc<Mutex<MockState>>,
}

struct MockState {
    outcome: GoogleVerification,
    call_log: Vec<GooglePurchaseRef>,
}

impl MockGooglePurchaseVerifier {
    pub fn returning(outcome: GoogleVerification) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockState {
                outcome,
                call_log: Vec::new(),
            })),
        }
    }

    /// Verifies every token with the given start and expiry.
    pub fn verified(start_time: Timestamp, expiry_time: Timestamp) -> Self {
        Self::returning(GoogleVerification::Verified(SubscriptionPurchase {
            start_time,
            expiry_time,
        }))
    }

    pub fn not_found() -> Self {
        Self::returning(GoogleVerification::NotFound)
    }

    pub fn transport_error(reason: impl Into<String>) -> Self {
        Self::returning(GoogleVerification::TransportError(reason.into()))
    }

    /// Token pairs looked up so far, in call order.
    pub fn verified_purchases(&self) -> Vec<GooglePurchaseRef> {
        self.state().call_log.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state().call_log.len()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl GooglePurchaseVerifier for MockGooglePurchaseVerifier {
    async fn verify(&self, purchase: &GooglePurchaseRef) -> GoogleVerification {
        let mut state = self.state();
        state.call_log.push(purchase.clone());
        state.outcome.clone()
    }
}
