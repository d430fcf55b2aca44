//! Axum router configuration for the function endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{health, is_premium, subscribe, FunctionsAppState};

/// Create the function invocation router.
///
/// # Routes
/// - `POST /isPremium` - Current premium status of the caller
/// - `POST /subscribe` - Record a purchase from Apple or Google
pub fn functions_routes() -> Router<FunctionsAppState> {
    Router::new()
        .route("/isPremium", post(is_premium))
        .route("/subscribe", post(subscribe))
}

/// Create the complete application router.
///
/// Mounts the functions under `/functions` next to `GET /health`.
///
/// # Example
///
/// ```ignore
/// let app = functions_router(state).layer(TraceLayer::new_for_http());
/// axum::serve(listener, app).await?;
/// ```
pub fn functions_router(state: FunctionsAppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/functions", functions_routes())
        .with_state(state)
}
