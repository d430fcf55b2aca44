//! Apple receipt transactions and the subscription period they describe.
//!
//! Apple returns one `latest_receipt_info` entry per renewal transaction.
//! `subscribe` aggregates all of them; `isPremium` re-verification only looks
//! at the first entry.

use crate::domain::foundation::Timestamp;

/// One transaction from Apple's `latest_receipt_info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptTransaction {
    pub expires_at: Timestamp,
    pub purchased_at: Timestamp,
}

/// Subscription period covered by a set of receipt transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptPeriod {
    pub expiry_date: Timestamp,
    pub purchase_date: Timestamp,
}

impl ReceiptPeriod {
    /// Spans the whole renewal history: latest expiry, earliest purchase.
    ///
    /// Returns `None` for an empty transaction list.
    pub fn spanning(transactions: &[ReceiptTransaction]) -> Option<Self> {
        let expiry_date = transactions.iter().map(|t| t.expires_at).max()?;
        let purchase_date = transactions.iter().map(|t| t.purchased_at).min()?;
        Some(Self {
            expiry_date,
            purchase_date,
        })
    }

    /// Period of the first transaction only.
    pub fn first(transactions: &[ReceiptTransaction]) -> Option<Self> {
        transactions.first().map(|t| Self {
            expiry_date: t.expires_at,
            purchase_date: t.purchased_at,
        })
    }
}
