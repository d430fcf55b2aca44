//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Apple verifyReceipt subdomain must be 'buy' or 'sandbox', got '{0}'")]
    InvalidAppleSubdomain(String),

    #[error("Data API endpoint must be an http(s) URL")]
    InvalidDataApiEndpoint,

    #[error("Data API endpoint must use HTTPS in production")]
    DataApiMustBeHttps,
}
