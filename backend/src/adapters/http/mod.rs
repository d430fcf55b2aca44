//! HTTP adapters - REST API implementations.

pub mod functions;

// Re-export key types for convenience
pub use functions::functions_router;
pub use functions::FunctionsAppState;
