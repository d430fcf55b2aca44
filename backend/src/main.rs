//! Function host for `isPremium` and `subscribe`.

use std::sync::Arc;
use std::time::Duration;

use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use subscription_functions::adapters::apple::{AppleReceiptAdapter, AppleReceiptConfig};
use subscription_functions::adapters::google::{
    PlayDeveloperAdapter, PlayDeveloperConfig, ServiceAccountTokenProvider,
    ANDROID_PUBLISHER_SCOPE,
};
use subscription_functions::adapters::graphql::{
    GraphQlClient, GraphQlClientConfig, GraphQlSubscriptionStore,
};
use subscription_functions::adapters::http::{functions_router, FunctionsAppState};
use subscription_functions::config::{AppConfig, ConfigError};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate().map_err(ConfigError::ValidationFailed)?;

    let mut graphql_config = GraphQlClientConfig::new(config.data_api.endpoint.clone());
    if let Some(token) = config.data_api.token.clone() {
        graphql_config = graphql_config.with_token(token);
    }
    let store = GraphQlSubscriptionStore::new(GraphQlClient::new(graphql_config));

    let apple = AppleReceiptAdapter::new(AppleReceiptConfig::new(
        config.apple.verify_receipt_subdomain.clone(),
        config.apple.shared_secret.clone(),
    ));

    // The key file is read on the first Google lookup, not here.
    let tokens = Arc::new(ServiceAccountTokenProvider::new(
        config.google.key_file.clone(),
        ANDROID_PUBLISHER_SCOPE,
    ));
    let google = PlayDeveloperAdapter::new(
        PlayDeveloperConfig::new(config.google.package_name.clone()),
        tokens,
    );

    let state = FunctionsAppState {
        subscription_store: Arc::new(store),
        apple_verifier: Arc::new(apple),
        google_verifier: Arc::new(google),
    };

    let app = functions_router(state)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        environment = ?config.server.environment,
        sandbox = config.apple.is_sandbox(),
        "Subscription functions listening"
    );
    axum::serve(listener, app).await?;

    Ok(())
}

/// JSON logs in production, human-readable output elsewhere. `RUST_LOG`
/// takes precedence over the configured level.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if config.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
