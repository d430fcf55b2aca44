//! HTTP adapter for the subscription functions.
//!
//! Hosts the functions the way a serverless runtime invokes them:
//! - `POST /functions/isPremium` - Premium status of the caller
//! - `POST /functions/subscribe` - Verify and record a purchase
//! - `GET /health` - Liveness probe

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::FunctionsAppState;
pub use routes::{functions_router, functions_routes};
