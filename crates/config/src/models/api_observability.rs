use crate::validation::{ConfigValidator, ValidationUtils};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enabled: bool,
    pub bind_address: String,
    pub cors_enabled: bool,
    pub cors_origins: Vec<String>,
    pub request_timeout_seconds: u64,
}

impl ConfigValidator for ApiConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        ValidationUtils::validate_not_empty(&self.bind_address, "api.bind_address")?;

        if !self.bind_address.contains(':') {
            return Err(crate::ConfigError::Validation(
                "api.bind_address must be in host:port format".to_string(),
            ));
        }

        ValidationUtils::validate_timeout_seconds(self.request_timeout_seconds)?;

        if self.cors_enabled && self.cors_origins.is_empty() {
            return Err(crate::ConfigError::Validation(
                "api.cors_origins cannot be empty when cors is enabled".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    pub log_level: String,
}

impl ConfigValidator for ObservabilityConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(crate::ConfigError::Validation(format!(
                "observability.log_level is invalid: {other}"
            ))),
        }
    }
}
