//! Minimal GraphQL-over-HTTP client.
//!
//! Posts `{query, variables}` to a single endpoint and decodes `data` into
//! the caller's type. A non-empty `errors` array fails the request even when
//! partial `data` is present.

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::DomainError;

/// GraphQL request failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphQlError {
    #[error("GraphQL request failed: {0}")]
    Network(String),

    #[error("GraphQL endpoint returned HTTP {0}")]
    HttpStatus(u16),

    #[error("GraphQL response could not be decoded: {0}")]
    Decode(String),

    #[error("GraphQL errors: {}", .0.join("; "))]
    Errors(Vec<String>),

    #[error("GraphQL response had no data")]
    MissingData,
}

impl From<GraphQlError> for DomainError {
    fn from(err: GraphQlError) -> Self {
        DomainError::data_api(err.to_string())
    }
}

/// GraphQL endpoint configuration.
#[derive(Clone)]
pub struct GraphQlClientConfig {
    endpoint: String,
    token: Option<SecretString>,
}

impl GraphQlClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: None,
        }
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn with_token(mut self, token: SecretString) -> Self {
        self.token = Some(token);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl std::fmt::Debug for GraphQlClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphQlClientConfig")
            .field("endpoint", &self.endpoint)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Serialize)]
struct GraphQlRequest<'a, V> {
    query: &'a str,
    variables: V,
}

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlErrorEntry>,
}

#[derive(Deserialize)]
struct GraphQlErrorEntry {
    message: String,
}

/// GraphQL client bound to one endpoint.
pub struct GraphQlClient {
    config: GraphQlClientConfig,
    http_client: reqwest::Client,
}

impl GraphQlClient {
    pub fn new(config: GraphQlClientConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// Runs one query or mutation.
    pub async fn request<V, T>(&self, query: &str, variables: V) -> Result<T, GraphQlError>
    where
        V: Serialize + Send,
        T: DeserializeOwned,
    {
        let mut request = self
            .http_client
            .post(&self.config.endpoint)
            .json(&GraphQlRequest { query, variables });
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|e| GraphQlError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GraphQlError::HttpStatus(response.status().as_u16()));
        }

        let body: GraphQlResponse<T> = response
            .json()
            .await
            .map_err(|e| GraphQlError::Decode(e.to_string()))?;

        if !body.errors.is_empty() {
            return Err(GraphQlError::Errors(
                body.errors.into_iter().map(|e| e.message).collect(),
            ));
        }

        body.data.ok_or(GraphQlError::MissingData)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::HeaderMap, routing::post, Json, Router};
    use serde_json::{json, Value};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    /// Echoes the variables back, or fails when asked to.
    async fn fake_graphql(headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if body["query"].as_str().unwrap_or("").contains("broken") {
            return Json(json!({ "data": null, "errors": [{ "message": "Syntax error" }] }));
        }
        Json(json!({ "data": { "echo": body["variables"], "auth": auth } }))
    }

    #[derive(Deserialize)]
    struct Echo {
        echo: Value,
        auth: String,
    }

    #[tokio::test]
    async fn request_posts_query_and_variables() {
        let base = serve(Router::new().route("/", post(fake_graphql))).await;
        let client = GraphQlClient::new(
            GraphQlClientConfig::new(format!("{}/", base))
                .with_token(SecretString::new("pat-123".to_string())),
        );

        let echo: Echo = client
            .request("query q($id: ID!) { User(id: $id) { id } }", json!({ "id": "u1" }))
            .await
            .unwrap();

        assert_eq!(echo.echo, json!({ "id": "u1" }));
        assert_eq!(echo.auth, "Bearer pat-123");
    }

    #[tokio::test]
    async fn graphql_errors_fail_the_request() {
        let base = serve(Router::new().route("/", post(fake_graphql))).await;
        let client = GraphQlClient::new(GraphQlClientConfig::new(format!("{}/", base)));

        let err = client
            .request::<_, Echo>("query broken {", json!({}))
            .await
            .err()
            .unwrap();

        assert_eq!(err, GraphQlError::Errors(vec!["Syntax error".to_string()]));
    }

    #[test]
    fn errors_become_data_api_domain_errors() {
        let err: DomainError = GraphQlError::HttpStatus(502).into();
        assert_eq!(err.code, crate::domain::foundation::ErrorCode::DataApiError);
    }

    #[test]
    fn debug_redacts_token() {
        let config = GraphQlClientConfig::new("https://api.example.com/simple/v1/project")
            .with_token(SecretString::new("pat-123".to_string()));
        assert!(!format!("{:?}", config).contains("pat-123"));
    }
}
