use std::str::FromStr;

use crate::ConfigResult;

/// Trait for configuration validation
pub trait ConfigValidator {
    fn validate(&self) -> ConfigResult<()>;
}

/// General validation utilities
pub struct ValidationUtils;

impl ValidationUtils {
    /// Validate that a string is not empty
    pub fn validate_not_empty(value: &str, field_name: &str) -> ConfigResult<()> {
        if value.trim().is_empty() {
            return Err(crate::ConfigError::Validation(format!(
                "{field_name} cannot be empty"
            )));
        }
        Ok(())
    }

    /// Validate that a timeout is reasonable
    pub fn validate_timeout_seconds(timeout_seconds: u64) -> ConfigResult<()> {
        if timeout_seconds == 0 {
            return Err(crate::ConfigError::Validation(
                "timeout_seconds must be greater than 0".to_string(),
            ));
        }
        if timeout_seconds > 3600 {
            return Err(crate::ConfigError::Validation(
                "timeout_seconds must be less than or equal to 3600".to_string(),
            ));
        }
        Ok(())
    }

    /// Validate that a count is reasonable
    pub fn validate_count(count: usize, field_name: &str) -> ConfigResult<()> {
        if count == 0 {
            return Err(crate::ConfigError::Validation(format!(
                "{field_name} must be greater than 0"
            )));
        }
        if count > 10000 {
            return Err(crate::ConfigError::Validation(format!(
                "{field_name} must be less than or equal to 10000"
            )));
        }
        Ok(())
    }

    /// Validate a cron expression with the cron crate
    pub fn validate_cron_expression(expr: &str, field_name: &str) -> ConfigResult<()> {
        Self::validate_not_empty(expr, field_name)?;
        cron::Schedule::from_str(expr).map_err(|e| {
            crate::ConfigError::Validation(format!("{field_name} is not a valid cron expression: {e}"))
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_not_empty() {
        assert!(ValidationUtils::validate_not_empty("value", "field").is_ok());
        assert!(ValidationUtils::validate_not_empty("  ", "field").is_err());
    }

    #[test]
    fn test_validate_timeout_seconds() {
        assert!(ValidationUtils::validate_timeout_seconds(30).is_ok());
        assert!(ValidationUtils::validate_timeout_seconds(0).is_err());
        assert!(ValidationUtils::validate_timeout_seconds(7200).is_err());
    }

    #[test]
    fn test_validate_cron_expression() {
        assert!(ValidationUtils::validate_cron_expression("0 0 9 * * *", "sweep.daily_cron").is_ok());
        assert!(ValidationUtils::validate_cron_expression("not a cron", "sweep.daily_cron").is_err());
        assert!(ValidationUtils::validate_cron_expression("", "sweep.daily_cron").is_err());
    }
}
