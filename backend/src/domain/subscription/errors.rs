//! Subscription-specific error types.
//!
//! Every variant except `Unexpected` is user-facing and renders the exact
//! message clients receive. `Unexpected` carries the internal cause for logs;
//! callers see the handler's generic fallback instead.
//!
//! | Error | Category |
//! |-------|----------|
//! | LoginRequired | authentication absence |
//! | UserNotFound, MissingInput | missing or invalid input |
//! | AppleRejected | store rejection |
//! | PurchaseVerificationFailed | store rejection or transport failure |
//! | PersistFailed | persistence failure |
//! | Unexpected | masked internal failure |

use crate::domain::foundation::{DomainError, ErrorCode, UserId, ValidationError};

/// Which write failed to return an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistStage {
    /// Recording a verified Apple receipt.
    AppleReceipt,
    /// Recording a verified Google purchase.
    GooglePurchase,
}

/// Subscription errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// No authenticated identity on the invocation.
    LoginRequired,

    /// The authenticated identity does not exist in the data store.
    UserNotFound(UserId),

    /// Neither a receipt nor a complete Google token pair was supplied.
    MissingInput,

    /// Apple answered with a non-success status; holds the compact response JSON.
    AppleRejected { response: String },

    /// Google returned no purchase for the token.
    PurchaseVerificationFailed,

    /// The create mutation returned no id.
    PersistFailed(PersistStage),

    /// Anything else. The cause is logged, never surfaced.
    Unexpected(String),
}

impl SubscriptionError {
    pub fn login_required() -> Self {
        SubscriptionError::LoginRequired
    }

    pub fn user_not_found(user_id: UserId) -> Self {
        SubscriptionError::UserNotFound(user_id)
    }

    pub fn missing_input() -> Self {
        SubscriptionError::MissingInput
    }

    pub fn apple_rejected(response: impl Into<String>) -> Self {
        SubscriptionError::AppleRejected {
            response: response.into(),
        }
    }

    pub fn purchase_verification_failed() -> Self {
        SubscriptionError::PurchaseVerificationFailed
    }

    pub fn persist_failed(stage: PersistStage) -> Self {
        SubscriptionError::PersistFailed(stage)
    }

    pub fn unexpected(cause: impl Into<String>) -> Self {
        SubscriptionError::Unexpected(cause.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            SubscriptionError::LoginRequired => ErrorCode::Unauthorized,
            SubscriptionError::UserNotFound(_) | SubscriptionError::MissingInput => {
                ErrorCode::ValidationFailed
            }
            SubscriptionError::AppleRejected { .. }
            | SubscriptionError::PurchaseVerificationFailed => ErrorCode::ExternalServiceError,
            SubscriptionError::PersistFailed(_) => ErrorCode::DataApiError,
            SubscriptionError::Unexpected(_) => ErrorCode::InternalError,
        }
    }

    /// True for failures whose cause must be masked.
    pub fn is_unexpected(&self) -> bool {
        matches!(self, SubscriptionError::Unexpected(_))
    }

    /// The message sent to the caller.
    ///
    /// `unexpected` is the handler-specific generic message used for
    /// `Unexpected` errors.
    pub fn user_message(&self, unexpected: &str) -> String {
        match self {
            SubscriptionError::LoginRequired => "Login required!".to_string(),
            SubscriptionError::UserNotFound(_) => "User not found!".to_string(),
            SubscriptionError::MissingInput => "Missing input.".to_string(),
            SubscriptionError::AppleRejected { response } => {
                format!("Apple responded with: {}", response)
            }
            SubscriptionError::PurchaseVerificationFailed => {
                "An error occured while verifying the purchase.".to_string()
            }
            SubscriptionError::PersistFailed(PersistStage::AppleReceipt) => {
                "An error occured while restoring subscription".to_string()
            }
            SubscriptionError::PersistFailed(PersistStage::GooglePurchase) => {
                "An error occured while creating Subscription.".to_string()
            }
            SubscriptionError::Unexpected(_) => unexpected.to_string(),
        }
    }
}

impl std::fmt::Display for SubscriptionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubscriptionError::UserNotFound(user_id) => write!(f, "User not found: {}", user_id),
            SubscriptionError::Unexpected(cause) => write!(f, "Unexpected error: {}", cause),
            other => write!(f, "{}", other.user_message("Unexpected error")),
        }
    }
}

impl std::error::Error for SubscriptionError {}

impl From<DomainError> for SubscriptionError {
    fn from(err: DomainError) -> Self {
        SubscriptionError::Unexpected(err.to_string())
    }
}

impl From<ValidationError> for SubscriptionError {
    fn from(err: ValidationError) -> Self {
        SubscriptionError::Unexpected(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FALLBACK: &str = "An unexpected error occured during subscribe.";

    #[test]
    fn user_facing_messages_match_client_contract() {
        let user_id = UserId::new("user-1").unwrap();

        assert_eq!(SubscriptionError::login_required().user_message(FALLBACK), "Login required!");
        assert_eq!(
            SubscriptionError::user_not_found(user_id).user_message(FALLBACK),
            "User not found!"
        );
        assert_eq!(SubscriptionError::missing_input().user_message(FALLBACK), "Missing input.");
        assert_eq!(
            SubscriptionError::purchase_verification_failed().user_message(FALLBACK),
            "An error occured while verifying the purchase."
        );
        assert_eq!(
            SubscriptionError::persist_failed(PersistStage::AppleReceipt).user_message(FALLBACK),
            "An error occured while restoring subscription"
        );
        assert_eq!(
            SubscriptionError::persist_failed(PersistStage::GooglePurchase).user_message(FALLBACK),
            "An error occured while creating Subscription."
        );
    }

    #[test]
    fn apple_rejection_embeds_response_verbatim() {
        let err = SubscriptionError::apple_rejected(r#"{"status":21007}"#);
        assert_eq!(err.user_message(FALLBACK), r#"Apple responded with: {"status":21007}"#);
    }

    #[test]
    fn unexpected_errors_are_masked() {
        let err = SubscriptionError::unexpected("connection reset by peer");
        assert!(err.is_unexpected());
        assert_eq!(err.user_message(FALLBACK), FALLBACK);
        assert!(err.to_string().contains("connection reset by peer"));
    }

    #[test]
    fn domain_errors_become_unexpected() {
        let err: SubscriptionError = DomainError::data_api("GraphQL timeout").into();
        assert!(err.is_unexpected());
        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[test]
    fn codes_follow_error_category() {
        assert_eq!(SubscriptionError::login_required().code(), ErrorCode::Unauthorized);
        assert_eq!(SubscriptionError::missing_input().code(), ErrorCode::ValidationFailed);
        assert_eq!(
            SubscriptionError::apple_rejected("{}").code(),
            ErrorCode::ExternalServiceError
        );
        assert_eq!(
            SubscriptionError::persist_failed(PersistStage::GooglePurchase).code(),
            ErrorCode::DataApiError
        );
    }
}
