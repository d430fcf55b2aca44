//! Premium status reported by the `isPremium` function.

use serde::Serialize;

use crate::domain::foundation::Timestamp;

/// Whether a user is premium, and until when.
///
/// Inactive statuses carry the evaluation instant as their expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PremiumStatus {
    #[serde(rename = "result")]
    pub active: bool,
    #[serde(rename = "expiryDate")]
    pub expiry_date: Timestamp,
}

impl PremiumStatus {
    pub fn active_until(expiry_date: Timestamp) -> Self {
        Self {
            active: true,
            expiry_date,
        }
    }

    pub fn inactive_at(now: Timestamp) -> Self {
        Self {
            active: false,
            expiry_date: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_in_function_response_shape() {
        let status = PremiumStatus::active_until(Timestamp::from_unix_millis(200).unwrap());
        assert_eq!(
            serde_json::to_value(status).unwrap(),
            json!({ "result": true, "expiryDate": "1970-01-01T00:00:00.200Z" })
        );
    }

    #[test]
    fn inactive_status_reports_the_given_instant() {
        let now = Timestamp::now();
        let status = PremiumStatus::inactive_at(now);
        assert!(!status.active);
        assert_eq!(status.expiry_date, now);
    }
}
