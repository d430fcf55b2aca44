//! Google Play configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Google Play Developer API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    /// Android application id
    pub package_name: String,

    /// Path to the service-account JSON key, read on first use
    #[serde(default = "default_key_file")]
    pub key_file: PathBuf,
}

impl GoogleConfig {
    /// Validate Google configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.package_name.trim().is_empty() {
            return Err(ValidationError::MissingRequired("ANDROID_PACKAGE_NAME"));
        }
        if self.key_file.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("GOOGLE_APPLICATION_CREDENTIALS"));
        }
        Ok(())
    }
}

fn default_key_file() -> PathBuf {
    PathBuf::from("keyfile.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = GoogleConfig {
            package_name: "com.example.app".to_string(),
            key_file: default_key_file(),
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_package_name() {
        let config = GoogleConfig {
            package_name: " ".to_string(),
            key_file: default_key_file(),
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("ANDROID_PACKAGE_NAME"))
        );
    }
}
