//! Application configuration module
//!
//! Configuration is loaded from environment variables with the `SUBSCRIPTIONS`
//! prefix, nested values separated by double underscores. The variable names
//! the functions were historically deployed with (`APPLE_SHARED_SECRET`,
//! `ANDROID_PACKAGE_NAME`, ...) are honored as overrides.
//!
//! # Example
//!
//! ```no_run
//! use subscription_functions::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod apple;
mod data_api;
mod error;
mod google;
mod server;

pub use apple::AppleConfig;
pub use data_api::DataApiConfig;
pub use error::{ConfigError, ValidationError};
pub use google::GoogleConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Legacy variable name and the config key it overrides.
const LEGACY_OVERRIDES: [(&str, &str); 4] = [
    ("APPLE_VERIFY_RECEIPT_SUBDOMAIN", "apple.verify_receipt_subdomain"),
    ("APPLE_SHARED_SECRET", "apple.shared_secret"),
    ("ANDROID_PACKAGE_NAME", "google.package_name"),
    ("GOOGLE_APPLICATION_CREDENTIALS", "google.key_file"),
];

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Apple receipt verification
    pub apple: AppleConfig,

    /// Google Play purchase verification
    pub google: GoogleConfig,

    /// GraphQL data API
    pub data_api: DataApiConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// - `SUBSCRIPTIONS__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `SUBSCRIPTIONS__DATA_API__ENDPOINT=...` -> `data_api.endpoint = ...`
    /// - `APPLE_SHARED_SECRET=...` -> `apple.shared_secret = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required values are missing or unparseable.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut builder = config::Config::builder().add_source(
            config::Environment::default()
                .prefix("SUBSCRIPTIONS")
                .separator("__"),
        );
        for (variable, key) in LEGACY_OVERRIDES {
            builder = builder.set_override_option(key, std::env::var(variable).ok())?;
        }

        let config = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.apple.validate()?;
        self.google.validate()?;
        self.data_api.validate(&self.server.environment)?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::path::PathBuf;
    use std::sync::Mutex;

    // env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const PREFIXED: [&str; 7] = [
        "SUBSCRIPTIONS__APPLE__SHARED_SECRET",
        "SUBSCRIPTIONS__APPLE__VERIFY_RECEIPT_SUBDOMAIN",
        "SUBSCRIPTIONS__GOOGLE__PACKAGE_NAME",
        "SUBSCRIPTIONS__DATA_API__ENDPOINT",
        "SUBSCRIPTIONS__DATA_API__TOKEN",
        "SUBSCRIPTIONS__SERVER__PORT",
        "SUBSCRIPTIONS__SERVER__ENVIRONMENT",
    ];

    fn set_minimal_env() {
        clear_env();
        env::set_var("SUBSCRIPTIONS__APPLE__SHARED_SECRET", "apple-secret");
        env::set_var("SUBSCRIPTIONS__GOOGLE__PACKAGE_NAME", "com.example.app");
        env::set_var(
            "SUBSCRIPTIONS__DATA_API__ENDPOINT",
            "https://api.example.com/simple/v1/project",
        );
    }

    fn clear_env() {
        for variable in PREFIXED {
            env::remove_var(variable);
        }
        for (variable, _) in LEGACY_OVERRIDES {
            env::remove_var(variable);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.expect("config should load");
        assert_eq!(config.apple.shared_secret.expose_secret(), "apple-secret");
        assert_eq!(config.apple.verify_receipt_subdomain, "buy");
        assert_eq!(config.google.package_name, "com.example.app");
        assert_eq!(config.google.key_file, PathBuf::from("keyfile.json"));
        assert!(config.data_api.token.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_legacy_variables_override() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("APPLE_VERIFY_RECEIPT_SUBDOMAIN", "sandbox");
        env::set_var("APPLE_SHARED_SECRET", "legacy-secret");
        env::set_var("ANDROID_PACKAGE_NAME", "com.example.legacy");
        env::set_var("GOOGLE_APPLICATION_CREDENTIALS", "/secrets/key.json");
        let result = AppConfig::load();
        clear_env();

        let config = result.expect("config should load");
        assert!(config.apple.is_sandbox());
        assert_eq!(config.apple.shared_secret.expose_secret(), "legacy-secret");
        assert_eq!(config.google.package_name, "com.example.legacy");
        assert_eq!(config.google.key_file, PathBuf::from("/secrets/key.json"));
    }

    #[test]
    fn test_missing_required_section_fails() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("SUBSCRIPTIONS__GOOGLE__PACKAGE_NAME", "com.example.app");
        let result = AppConfig::load();
        clear_env();

        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }

    #[test]
    fn test_server_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
    }

    #[test]
    fn test_production_requires_https_data_api() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("SUBSCRIPTIONS__SERVER__ENVIRONMENT", "production");
        env::set_var("SUBSCRIPTIONS__DATA_API__ENDPOINT", "http://api.example.com");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
        assert_eq!(config.validate(), Err(ValidationError::DataApiMustBeHttps));
    }

    #[test]
    fn test_custom_server_port() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("SUBSCRIPTIONS__SERVER__PORT", "3000");
        let result = AppConfig::load();
        clear_env();

        assert_eq!(result.unwrap().server.port, 3000);
    }
}
