//! HTTP handlers for the function endpoints.
//!
//! These handlers connect Axum routes to the subscription handlers. Every
//! outcome is answered with `200 OK`; failures travel in the `error` field.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};

use crate::application::handlers::subscription::{
    IsPremiumHandler, IsPremiumQuery, SubscribeCommand, SubscribeHandler,
};
use crate::domain::subscription::{PremiumStatus, SubscriptionError};
use crate::ports::{AppleReceiptVerifier, GooglePurchaseVerifier, SubscriptionStore};

use super::dto::{
    FunctionEvent, FunctionResponse, HealthResponse, IsPremiumData, SubscribeData,
    SubscribeResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// This struct is cloned for each request and contains Arc-wrapped dependencies
/// for efficient sharing across handlers.
#[derive(Clone)]
pub struct FunctionsAppState {
    pub subscription_store: Arc<dyn SubscriptionStore>,
    pub apple_verifier: Arc<dyn AppleReceiptVerifier>,
    pub google_verifier: Arc<dyn GooglePurchaseVerifier>,
}

impl FunctionsAppState {
    pub fn is_premium_handler(&self) -> IsPremiumHandler {
        IsPremiumHandler::new(
            self.subscription_store.clone(),
            self.apple_verifier.clone(),
            self.google_verifier.clone(),
        )
    }

    pub fn subscribe_handler(&self) -> SubscribeHandler {
        SubscribeHandler::new(
            self.subscription_store.clone(),
            self.apple_verifier.clone(),
            self.google_verifier.clone(),
        )
    }
}

/// Reads the event, treating an unreadable body as an anonymous empty event.
fn event_or_default<T>(
    function: &'static str,
    payload: Result<Json<FunctionEvent<T>>, JsonRejection>,
) -> FunctionEvent<T> {
    match payload {
        Ok(Json(event)) => event,
        Err(rejection) => {
            tracing::debug!(function, error = %rejection, "Unreadable function event");
            FunctionEvent::default()
        }
    }
}

/// Wraps a handler outcome in the response envelope, masking unexpected errors.
fn respond<T>(
    function: &'static str,
    unexpected_message: &str,
    result: Result<T, SubscriptionError>,
) -> Json<FunctionResponse<T>> {
    match result {
        Ok(data) => Json(FunctionResponse::data(data)),
        Err(err) => {
            if err.is_unexpected() {
                tracing::error!(function, error = %err, "Function failed unexpectedly");
            } else {
                tracing::info!(function, code = %err.code(), error = %err, "Function returned error");
            }
            Json(FunctionResponse::error(err.user_message(unexpected_message)))
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Function Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /functions/isPremium - Report the caller's premium status
pub async fn is_premium(
    State(state): State<FunctionsAppState>,
    payload: Result<Json<FunctionEvent<IsPremiumData>>, JsonRejection>,
) -> Json<FunctionResponse<PremiumStatus>> {
    let event = event_or_default("isPremium", payload);
    let query = IsPremiumQuery {
        user_id: event.user_id(),
    };

    let result = state.is_premium_handler().handle(query).await;

    respond("isPremium", IsPremiumHandler::UNEXPECTED_ERROR_MESSAGE, result)
}

/// POST /functions/subscribe - Verify and record a purchase
pub async fn subscribe(
    State(state): State<FunctionsAppState>,
    payload: Result<Json<FunctionEvent<SubscribeData>>, JsonRejection>,
) -> Json<FunctionResponse<SubscribeResponse>> {
    let event = event_or_default("subscribe", payload);
    let user_id = event.user_id();
    let data = event.data.unwrap_or_default();
    let cmd = SubscribeCommand {
        user_id,
        receipt: data.receipt,
        purchase_token: data.purchase_token,
        subscription_id: data.subscription_id,
    };

    let result = state
        .subscribe_handler()
        .handle(cmd)
        .await
        .map(|_| SubscribeResponse { result: true });

    respond("subscribe", SubscribeHandler::UNEXPECTED_ERROR_MESSAGE, result)
}

/// GET /health - Liveness probe
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
