//! Google Play Developer API adapter.
//!
//! Implements `GooglePurchaseVerifier` with
//! `purchases.subscriptions.get(packageName, subscriptionId, token)`.
//! No outcome is an error for the caller: 404/410 become `NotFound`, and any
//! other failure (auth, network, HTTP status, bad body) becomes
//! `TransportError`.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;

use crate::domain::foundation::Timestamp;
use crate::domain::subscription::GooglePurchaseRef;
use crate::ports::{GooglePurchaseVerifier, GoogleVerification, SubscriptionPurchase};

use super::service_account::ServiceAccountTokenProvider;

const DEFAULT_BASE_URL: &str = "https://androidpublisher.googleapis.com";

/// Play Developer API configuration.
#[derive(Debug, Clone)]
pub struct PlayDeveloperConfig {
    /// Android application id, e.g. `com.example.app`.
    pub package_name: String,

    /// API base URL (default: https://androidpublisher.googleapis.com).
    pub base_url: String,
}

impl PlayDeveloperConfig {
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Lookup URL with each identifier as its own percent-encoded path segment.
    fn subscription_url(&self, purchase: &GooglePurchaseRef) -> Result<reqwest::Url, String> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| format!("Invalid Play Developer base URL: {}", e))?;
        url.path_segments_mut()
            .map_err(|_| format!("Play Developer base URL cannot hold a path: {}", self.base_url))?
            .pop_if_empty()
            .extend([
                "androidpublisher",
                "v3",
                "applications",
                self.package_name.as_str(),
                "purchases",
                "subscriptions",
                purchase.subscription_id.as_str(),
                "tokens",
                purchase.purchase_token.as_str(),
            ]);
        Ok(url)
    }
}

/// Subset of the `SubscriptionPurchase` resource. Millisecond fields are
/// decimal strings and may be absent.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionPurchaseResource {
    #[serde(default)]
    start_time_millis: Option<String>,
    #[serde(default)]
    expiry_time_millis: Option<String>,
}

impl SubscriptionPurchaseResource {
    /// Absent fields read as the Unix epoch.
    fn into_purchase(self) -> Result<SubscriptionPurchase, String> {
        let parse = |field: &str, value: Option<String>| {
            Timestamp::parse_unix_millis(field, value.as_deref().unwrap_or("0"))
                .map_err(|e| e.to_string())
        };
        Ok(SubscriptionPurchase {
            start_time: parse("startTimeMillis", self.start_time_millis)?,
            expiry_time: parse("expiryTimeMillis", self.expiry_time_millis)?,
        })
    }
}

/// Play Developer API adapter.
pub struct PlayDeveloperAdapter {
    config: PlayDeveloperConfig,
    tokens: Arc<ServiceAccountTokenProvider>,
    http_client: reqwest::Client,
}

impl PlayDeveloperAdapter {
    pub fn new(config: PlayDeveloperConfig, tokens: Arc<ServiceAccountTokenProvider>) -> Self {
        Self {
            config,
            tokens,
            http_client: reqwest::Client::new(),
        }
    }

    async fn fetch(&self, purchase: &GooglePurchaseRef) -> GoogleVerification {
        let token = match self.tokens.access_token().await {
            Ok(token) => token,
            Err(e) => return GoogleVerification::TransportError(e.to_string()),
        };

        let url = match self.config.subscription_url(purchase) {
            Ok(url) => url,
            Err(reason) => return GoogleVerification::TransportError(reason),
        };

        let response = match self
            .http_client
            .get(url)
            .bearer_auth(token.expose_secret())
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return GoogleVerification::TransportError(e.to_string()),
        };

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND || status == reqwest::StatusCode::GONE {
            return GoogleVerification::NotFound;
        }
        if !status.is_success() {
            return GoogleVerification::TransportError(format!("HTTP {}", status.as_u16()));
        }

        match response.json::<SubscriptionPurchaseResource>().await {
            Ok(resource) => match resource.into_purchase() {
                Ok(found) => GoogleVerification::Verified(found),
                Err(reason) => GoogleVerification::TransportError(reason),
            },
            Err(e) => GoogleVerification::TransportError(e.to_string()),
        }
    }
}

#[async_trait]
impl GooglePurchaseVerifier for PlayDeveloperAdapter {
    async fn verify(&self, purchase: &GooglePurchaseRef) -> GoogleVerification {
        let verification = self.fetch(purchase).await;
        if let GoogleVerification::TransportError(reason) = &verification {
            tracing::warn!(
                subscription_id = %purchase.subscription_id,
                reason = %reason,
                "Play Developer API lookup failed"
            );
        }
        verification
    }
}
