//! HTTP DTOs for the function endpoints.
//!
//! Requests arrive in the shape a serverless function runtime delivers them:
//! the function's input under `data`, and the caller's identity under
//! `context.auth.nodeId`. Responses carry either `data` or `error`.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::UserId;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// A function invocation event.
#[derive(Debug, Clone, Deserialize)]
pub struct FunctionEvent<T> {
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub context: FunctionContext,
}

impl<T> Default for FunctionEvent<T> {
    fn default() -> Self {
        Self {
            data: None,
            context: FunctionContext::default(),
        }
    }
}

impl<T> FunctionEvent<T> {
    /// The authenticated caller, if any. Blank ids count as unauthenticated.
    pub fn user_id(&self) -> Option<UserId> {
        self.context
            .auth
            .as_ref()
            .and_then(|auth| auth.node_id.as_deref())
            .and_then(|id| UserId::new(id).ok())
    }
}

/// Invocation context supplied by the runtime.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FunctionContext {
    #[serde(default)]
    pub auth: Option<FunctionAuth>,
}

/// Authentication section of the context.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FunctionAuth {
    #[serde(default, rename = "nodeId")]
    pub node_id: Option<String>,
}

/// `isPremium` takes no input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IsPremiumData {}

/// `subscribe` input: an Apple receipt, or a Google token pair.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeData {
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub purchase_token: Option<String>,
    #[serde(default)]
    pub subscription_id: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Function result envelope: `{"data": ...}` or `{"error": "..."}`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum FunctionResponse<T> {
    Data { data: T },
    Error { error: String },
}

impl<T> FunctionResponse<T> {
    pub fn data(data: T) -> Self {
        FunctionResponse::Data { data }
    }

    pub fn error(message: impl Into<String>) -> Self {
        FunctionResponse::Error {
            error: message.into(),
        }
    }
}

/// `subscribe` success payload.
#[derive(Debug, Clone, Serialize)]
pub struct SubscribeResponse {
    pub result: bool,
}

/// Health check payload.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_exposes_node_id_as_user() {
        let event: FunctionEvent<SubscribeData> = serde_json::from_value(json!({
            "data": { "receipt": "MIIT" },
            "context": { "auth": { "nodeId": "cjuser1", "typeName": "User", "token": "..." } }
        }))
        .unwrap();

        assert_eq!(event.user_id(), Some(UserId::new("cjuser1").unwrap()));
        assert_eq!(event.data.unwrap().receipt.as_deref(), Some("MIIT"));
    }

    #[test]
    fn missing_or_blank_auth_has_no_user() {
        for raw in [
            json!({ "data": {} }),
            json!({ "data": {}, "context": {} }),
            json!({ "data": {}, "context": { "auth": null } }),
            json!({ "data": {}, "context": { "auth": { "nodeId": "" } } }),
            json!({ "data": {}, "context": { "auth": { "nodeId": "   " } } }),
        ] {
            let event: FunctionEvent<IsPremiumData> = serde_json::from_value(raw).unwrap();
            assert_eq!(event.user_id(), None);
        }
    }

    #[test]
    fn subscribe_data_uses_camel_case_fields() {
        let data: SubscribeData = serde_json::from_value(json!({
            "purchaseToken": "tok",
            "subscriptionId": "premium_monthly"
        }))
        .unwrap();
        assert_eq!(data.purchase_token.as_deref(), Some("tok"));
        assert_eq!(data.subscription_id.as_deref(), Some("premium_monthly"));
        assert!(data.receipt.is_none());
    }

    #[test]
    fn envelope_serializes_data_or_error() {
        let ok = serde_json::to_value(FunctionResponse::data(SubscribeResponse { result: true })).unwrap();
        assert_eq!(ok, json!({ "data": { "result": true } }));

        let err = serde_json::to_value(FunctionResponse::<SubscribeResponse>::error("Missing input.")).unwrap();
        assert_eq!(err, json!({ "error": "Missing input." }));
    }
}
