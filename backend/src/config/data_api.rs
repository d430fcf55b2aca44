//! Data API configuration (GraphQL endpoint holding users and subscriptions)

use secrecy::SecretString;
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// GraphQL data API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DataApiConfig {
    /// GraphQL endpoint URL
    pub endpoint: String,

    /// Optional bearer token sent with every request
    #[serde(default)]
    pub token: Option<SecretString>,
}

impl DataApiConfig {
    /// Validate data API configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.endpoint.is_empty() {
            return Err(ValidationError::MissingRequired("DATA_API_ENDPOINT"));
        }
        let is_https = self.endpoint.starts_with("https://");
        if !is_https && !self.endpoint.starts_with("http://") {
            return Err(ValidationError::InvalidDataApiEndpoint);
        }
        if *environment == Environment::Production && !is_https {
            return Err(ValidationError::DataApiMustBeHttps);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(endpoint: &str) -> DataApiConfig {
        DataApiConfig {
            endpoint: endpoint.to_string(),
            token: None,
        }
    }

    #[test]
    fn test_http_allowed_outside_production() {
        assert!(config("http://localhost:60000/simple/v1/project")
            .validate(&Environment::Development)
            .is_ok());
    }

    #[test]
    fn test_https_required_in_production() {
        assert_eq!(
            config("http://api.example.com/simple/v1/project").validate(&Environment::Production),
            Err(ValidationError::DataApiMustBeHttps)
        );
        assert!(config("https://api.example.com/simple/v1/project")
            .validate(&Environment::Production)
            .is_ok());
    }

    #[test]
    fn test_non_http_endpoint_rejected() {
        assert_eq!(
            config("ftp://api.example.com").validate(&Environment::Development),
            Err(ValidationError::InvalidDataApiEndpoint)
        );
    }
}
