//! GraphQL implementation of `SubscriptionStore`.
//!
//! Targets the "simple" API of the backend that owns the `User` and
//! `Subscription` types. Every lookup orders by `expiryDate_DESC` and takes
//! the first row.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::foundation::{DomainError, SubscriptionRecordId, Timestamp, UserId};
use crate::domain::subscription::{GooglePurchaseRef, NewSubscription};
use crate::ports::SubscriptionStore;

use super::client::GraphQlClient;

const LAST_SUBSCRIPTION_QUERY: &str = r#"
query getLastSubscription($id: ID) {
  allSubscriptions(filter: {user: {id: $id}}, orderBy: expiryDate_DESC, first: 1) {
    expiryDate
  }
}
"#;

const LAST_RECEIPT_QUERY: &str = r#"
query getLastReceipt($id: ID!) {
  allSubscriptions(filter: {user: {id: $id}, receipt_not: null}, orderBy: expiryDate_DESC, first: 1) {
    receipt
  }
}
"#;

const LAST_PURCHASE_TOKEN_QUERY: &str = r#"
query getLastPurchaseToken($id: ID!) {
  allSubscriptions(filter: {user: {id: $id}, purchaseToken_not: null}, orderBy: expiryDate_DESC, first: 1) {
    purchaseToken
    subscriptionId
  }
}
"#;

const USER_QUERY: &str = r#"
query getUser($id: ID!) {
  User(id: $id) {
    id
  }
}
"#;

const CREATE_SUBSCRIPTION_MUTATION: &str = r#"
mutation createSubscription(
  $expiryDate: DateTime,
  $purchaseDate: DateTime,
  $startDate: DateTime,
  $receipt: String,
  $userId: ID,
  $purchaseToken: String,
  $subscriptionId: String
) {
  createSubscription(
    expiryDate: $expiryDate,
    purchaseDate: $purchaseDate,
    startDate: $startDate,
    receipt: $receipt,
    userId: $userId,
    purchaseToken: $purchaseToken,
    subscriptionId: $subscriptionId
  ) {
    id
  }
}
"#;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AllSubscriptions<T> {
    all_subscriptions: Vec<T>,
}

impl<T> AllSubscriptions<T> {
    fn first(self) -> Option<T> {
        self.all_subscriptions.into_iter().next()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExpiryRow {
    expiry_date: Option<String>,
}

#[derive(Deserialize)]
struct ReceiptRow {
    receipt: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PurchaseTokenRow {
    purchase_token: Option<String>,
    subscription_id: Option<String>,
}

#[derive(Deserialize)]
struct IdRow {
    id: String,
}

#[derive(Deserialize)]
struct UserResponse {
    #[serde(rename = "User")]
    user: Option<IdRow>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSubscriptionResponse {
    create_subscription: Option<IdRow>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateSubscriptionVariables<'a> {
    user_id: &'a str,
    expiry_date: Timestamp,
    purchase_date: Timestamp,
    start_date: Timestamp,
    receipt: Option<&'a str>,
    purchase_token: Option<&'a str>,
    subscription_id: Option<&'a str>,
}

/// `SubscriptionStore` backed by the GraphQL data API.
pub struct GraphQlSubscriptionStore {
    client: GraphQlClient,
}

impl GraphQlSubscriptionStore {
    pub fn new(client: GraphQlClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SubscriptionStore for GraphQlSubscriptionStore {
    async fn last_expiry_date(&self, user_id: &UserId) -> Result<Option<Timestamp>, DomainError> {
        let rows: AllSubscriptions<ExpiryRow> = self
            .client
            .request(LAST_SUBSCRIPTION_QUERY, json!({ "id": user_id }))
            .await?;

        match rows.first().and_then(|row| row.expiry_date) {
            Some(raw) => Ok(Some(Timestamp::parse_iso(&raw)?)),
            None => Ok(None),
        }
    }

    async fn last_receipt(&self, user_id: &UserId) -> Result<Option<String>, DomainError> {
        let rows: AllSubscriptions<ReceiptRow> = self
            .client
            .request(LAST_RECEIPT_QUERY, json!({ "id": user_id }))
            .await?;

        Ok(rows
            .first()
            .and_then(|row| row.receipt)
            .filter(|receipt| !receipt.is_empty()))
    }

    async fn last_purchase_token(
        &self,
        user_id: &UserId,
    ) -> Result<Option<GooglePurchaseRef>, DomainError> {
        let rows: AllSubscriptions<PurchaseTokenRow> = self
            .client
            .request(LAST_PURCHASE_TOKEN_QUERY, json!({ "id": user_id }))
            .await?;

        let Some(row) = rows.first() else {
            return Ok(None);
        };
        let purchase = GooglePurchaseRef::new(
            row.purchase_token.unwrap_or_default(),
            row.subscription_id.unwrap_or_default(),
        );
        match purchase {
            Ok(purchase) => Ok(Some(purchase)),
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Stored Google purchase is incomplete");
                Ok(None)
            }
        }
    }

    async fn find_user(&self, user_id: &UserId) -> Result<Option<UserId>, DomainError> {
        let response: UserResponse = self
            .client
            .request(USER_QUERY, json!({ "id": user_id }))
            .await?;

        match response.user {
            Some(row) if !row.id.is_empty() => Ok(Some(UserId::new(row.id)?)),
            _ => Ok(None),
        }
    }

    async fn create_subscription(
        &self,
        subscription: NewSubscription,
    ) -> Result<Option<SubscriptionRecordId>, DomainError> {
        let google = subscription.source.google_purchase();
        let variables = CreateSubscriptionVariables {
            user_id: subscription.user_id.as_str(),
            expiry_date: subscription.expiry_date,
            purchase_date: subscription.purchase_date,
            start_date: subscription.start_date,
            receipt: subscription.source.receipt(),
            purchase_token: google.map(|g| g.purchase_token.as_str()),
            subscription_id: google.map(|g| g.subscription_id.as_str()),
        };

        let response: CreateSubscriptionResponse = self
            .client
            .request(CREATE_SUBSCRIPTION_MUTATION, variables)
            .await?;

        match response.create_subscription {
            Some(row) if !row.id.is_empty() => Ok(Some(SubscriptionRecordId::new(row.id)?)),
            _ => Ok(None),
        }
    }
}
