//! Subscription domain.
//!
//! A subscription record is an immutable snapshot of one verified store
//! purchase. Renewals append new records; "premium" is derived from the record
//! with the latest expiry.

mod errors;
mod receipt;
mod record;
mod status;

pub use errors::{PersistStage, SubscriptionError};
pub use receipt::{ReceiptPeriod, ReceiptTransaction};
pub use record::{GooglePurchaseRef, NewSubscription, StoreSource, SubscriptionRecord};
pub use status::PremiumStatus;
