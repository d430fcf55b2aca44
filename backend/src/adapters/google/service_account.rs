//! Google service-account OAuth for server-to-server API calls.
//!
//! Exchanges a self-signed RS256 JWT assertion for an access token at the
//! key file's `token_uri`, using the JWT-bearer grant:
//!
//! 1. Read the service-account key file (`client_email`, `private_key`, ...)
//! 2. Sign `{iss, scope, aud, iat, exp}` with the private key
//! 3. POST `grant_type=urn:ietf:params:oauth:grant-type:jwt-bearer&assertion=...`
//! 4. Cache the access token until shortly before it expires
//!
//! The key file is read when a token is first needed, so a missing file
//! surfaces as an auth failure on the lookup rather than at startup.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

/// Scope for Play Developer API subscription reads.
pub const ANDROID_PUBLISHER_SCOPE: &str = "https://www.googleapis.com/auth/androidpublisher";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Lifetime requested for each signed assertion.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Tokens are refreshed this long before Google says they expire.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Errors obtaining a Google access token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GoogleAuthError {
    #[error("Failed to read key file {path}: {reason}")]
    KeyFileUnreadable { path: String, reason: String },

    #[error("Invalid service account key file: {0}")]
    InvalidKeyFile(String),

    #[error("Failed to sign assertion: {0}")]
    Signing(String),

    #[error("Token request failed: {0}")]
    Network(String),

    #[error("Token endpoint returned {status}: {body}")]
    TokenRejected { status: u16, body: String },

    #[error("Invalid token response: {0}")]
    InvalidTokenResponse(String),
}

/// The fields of a service-account JSON key this crate uses.
#[derive(Debug, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: SecretString,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_json(raw: &str) -> Result<Self, GoogleAuthError> {
        serde_json::from_str(raw).map_err(|e| GoogleAuthError::InvalidKeyFile(e.to_string()))
    }

    pub async fn from_file(path: &std::path::Path) -> Result<Self, GoogleAuthError> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            GoogleAuthError::KeyFileUnreadable {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
        })?;
        Self::from_json(&raw)
    }

    /// Signs a JWT-bearer assertion for `scope`, issued at `issued_at` (Unix seconds).
    pub fn sign_assertion(&self, scope: &str, issued_at: i64) -> Result<String, GoogleAuthError> {
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope,
            aud: &self.token_uri,
            iat: issued_at,
            exp: issued_at + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.private_key_id.clone();

        let key = EncodingKey::from_rsa_pem(self.private_key.expose_secret().as_bytes())
            .map_err(|e| GoogleAuthError::Signing(e.to_string()))?;

        encode(&header, &claims, &key).map_err(|e| GoogleAuthError::Signing(e.to_string()))
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

/// Cached access token with expiry tracking.
struct CachedToken {
    access_token: SecretString,
    expires_at: Instant,
}

impl CachedToken {
    fn new(access_token: String, expires_in: Duration) -> Self {
        Self {
            access_token: SecretString::new(access_token),
            expires_at: Instant::now() + expires_in,
        }
    }

    fn is_fresh(&self) -> bool {
        Instant::now() + REFRESH_MARGIN < self.expires_at
    }
}

/// Issues access tokens for a service account, caching them across calls.
pub struct ServiceAccountTokenProvider {
    key_file: PathBuf,
    scope: String,
    http_client: reqwest::Client,
    token_uri_override: Option<String>,
    cache: Arc<RwLock<Option<CachedToken>>>,
}

impl ServiceAccountTokenProvider {
    pub fn new(key_file: impl Into<PathBuf>, scope: impl Into<String>) -> Self {
        Self {
            key_file: key_file.into(),
            scope: scope.into(),
            http_client: reqwest::Client::new(),
            token_uri_override: None,
            cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Send the token request here instead of the key file's `token_uri` (for testing).
    pub fn with_token_uri(mut self, uri: impl Into<String>) -> Self {
        self.token_uri_override = Some(uri.into());
        self
    }

    /// Returns a valid access token, fetching a new one when the cache is stale.
    pub async fn access_token(&self) -> Result<SecretString, GoogleAuthError> {
        {
            let cache = self.cache.read().await;
            if let Some(ref cached) = *cache {
                if cached.is_fresh() {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        let fetched = self.fetch_token().await?;
        let token = fetched.access_token.clone();
        *self.cache.write().await = Some(fetched);
        Ok(token)
    }

    async fn fetch_token(&self) -> Result<CachedToken, GoogleAuthError> {
        let key = ServiceAccountKey::from_file(&self.key_file).await?;
        let assertion = key.sign_assertion(&self.scope, chrono::Utc::now().timestamp())?;
        let token_uri = self.token_uri_override.as_deref().unwrap_or(&key.token_uri);

        let response = self
            .http_client
            .post(token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| GoogleAuthError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GoogleAuthError::TokenRejected {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| GoogleAuthError::InvalidTokenResponse(e.to_string()))?;

        tracing::debug!(
            client_email = %key.client_email,
            expires_in = token.expires_in,
            "Fetched Google access token"
        );

        Ok(CachedToken::new(
            token.access_token,
            Duration::from_secs(token.expires_in),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, routing::post, Form, Json, Router};
    use jsonwebtoken::{decode, DecodingKey, Validation};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::NamedTempFile;

    const TEST_KEY_PEM: &str = include_str!("../../../tests/fixtures/test_service_account_key.pem");

    fn key_json(token_uri: &str) -> String {
        json!({
            "type": "service_account",
            "client_email": "play-verifier@example.iam.gserviceaccount.com",
            "private_key_id": "key-1",
            "private_key": TEST_KEY_PEM,
            "token_uri": token_uri,
        })
        .to_string()
    }

    fn key_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    /// Token endpoint that counts exchanges and checks the grant type.
    async fn fake_token_endpoint(
        State(calls): State<Arc<AtomicUsize>>,
        Form(form): Form<HashMap<String, String>>,
    ) -> Json<Value> {
        let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
        assert_eq!(form.get("grant_type").map(String::as_str), Some(JWT_BEARER_GRANT));
        assert!(form.get("assertion").is_some());
        Json(json!({ "access_token": format!("token-{}", n), "expires_in": 3599, "token_type": "Bearer" }))
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Key File Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn key_file_is_loaded_from_disk() {
        let file = key_file(&key_json("https://oauth2.googleapis.com/token"));

        let key = ServiceAccountKey::from_file(file.path()).await.unwrap();

        assert_eq!(key.client_email, "play-verifier@example.iam.gserviceaccount.com");
        assert_eq!(key.private_key_id.as_deref(), Some("key-1"));
    }

    #[tokio::test]
    async fn missing_key_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keyfile.json");

        let err = ServiceAccountKey::from_file(&path).await.unwrap_err();

        assert!(matches!(err, GoogleAuthError::KeyFileUnreadable { .. }));
    }

    #[test]
    fn token_uri_defaults_to_google() {
        let key = ServiceAccountKey::from_json(
            &json!({ "client_email": "a@b", "private_key": TEST_KEY_PEM }).to_string(),
        )
        .unwrap();
        assert_eq!(key.token_uri, DEFAULT_TOKEN_URI);
    }

    #[test]
    fn malformed_key_file_is_rejected() {
        let err = ServiceAccountKey::from_json("{ not json").unwrap_err();
        assert!(matches!(err, GoogleAuthError::InvalidKeyFile(_)));
    }

    #[test]
    fn debug_output_redacts_private_key() {
        let key = ServiceAccountKey::from_json(&key_json("https://t")).unwrap();
        assert!(!format!("{:?}", key).contains("BEGIN PRIVATE KEY"));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Assertion Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn assertion_carries_scope_audience_and_kid() {
        let key = ServiceAccountKey::from_json(&key_json("https://oauth2.googleapis.com/token")).unwrap();

        let jwt = key.sign_assertion(ANDROID_PUBLISHER_SCOPE, 1_700_000_000).unwrap();

        let header = jsonwebtoken::decode_header(&jwt).unwrap();
        assert_eq!(header.alg, Algorithm::RS256);
        assert_eq!(header.kid.as_deref(), Some("key-1"));

        let mut validation = Validation::new(Algorithm::RS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.set_audience(&["https://oauth2.googleapis.com/token"]);
        let claims = decode::<Value>(&jwt, &DecodingKey::from_secret(&[]), &validation)
            .unwrap()
            .claims;
        assert_eq!(claims["iss"], "play-verifier@example.iam.gserviceaccount.com");
        assert_eq!(claims["scope"], ANDROID_PUBLISHER_SCOPE);
        assert_eq!(claims["iat"], 1_700_000_000);
        assert_eq!(claims["exp"], 1_700_003_600);
    }

    #[test]
    fn invalid_private_key_fails_signing() {
        let key = ServiceAccountKey::from_json(
            &json!({ "client_email": "a@b", "private_key": "not a pem" }).to_string(),
        )
        .unwrap();

        let err = key.sign_assertion(ANDROID_PUBLISHER_SCOPE, 0).unwrap_err();

        assert!(matches!(err, GoogleAuthError::Signing(_)));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Token Exchange Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn token_is_fetched_once_and_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let base = serve(
            Router::new()
                .route("/token", post(fake_token_endpoint))
                .with_state(calls.clone()),
        )
        .await;
        let file = key_file(&key_json(&format!("{}/token", base)));
        let provider = ServiceAccountTokenProvider::new(file.path(), ANDROID_PUBLISHER_SCOPE);

        let first = provider.access_token().await.unwrap();
        let second = provider.access_token().await.unwrap();

        assert_eq!(first.expose_secret(), "token-1");
        assert_eq!(second.expose_secret(), "token-1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rejected_exchange_is_reported() {
        let base = serve(Router::new().route(
            "/token",
            post(|| async {
                (
                    axum::http::StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "invalid_grant" })),
                )
            }),
        ))
        .await;
        let file = key_file(&key_json("https://unused.example"));
        let provider = ServiceAccountTokenProvider::new(file.path(), ANDROID_PUBLISHER_SCOPE)
            .with_token_uri(format!("{}/token", base));

        let err = provider.access_token().await.unwrap_err();

        match err {
            GoogleAuthError::TokenRejected { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("invalid_grant"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn cached_token_goes_stale_inside_refresh_margin() {
        assert!(CachedToken::new("t".into(), Duration::from_secs(3600)).is_fresh());
        assert!(!CachedToken::new("t".into(), Duration::from_secs(30)).is_fresh());
    }
}
