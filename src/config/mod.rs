//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `GYM_LEDGER` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use gym_ledger::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Local offset: {} minutes", config.billing.utc_offset_minutes);
//! ```

mod billing;
mod error;
mod logging;

pub use billing::BillingConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a usable
/// configuration. Load using [`AppConfig::load()`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Billing calendar and status derivation
    #[serde(default)]
    pub billing: BillingConfig,

    /// Log filter and output format
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `GYM_LEDGER` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `GYM_LEDGER__BILLING__UTC_OFFSET_MINUTES=-300` -> `billing.utc_offset_minutes = -300`
    /// - `GYM_LEDGER__LOGGING__JSON=true` -> `logging.json = true`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("GYM_LEDGER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.billing.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        env::remove_var("GYM_LEDGER__BILLING__UTC_OFFSET_MINUTES");
        env::remove_var("GYM_LEDGER__BILLING__EXPIRY_WARNING_DAYS");
        env::remove_var("GYM_LEDGER__LOGGING__LEVEL");
        env::remove_var("GYM_LEDGER__LOGGING__JSON");
    }

    #[test]
    fn test_defaults_without_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.billing.utc_offset_minutes, 0);
        assert_eq!(config.billing.expiry_warning_days, 7);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("GYM_LEDGER__BILLING__UTC_OFFSET_MINUTES", "-300");
        env::set_var("GYM_LEDGER__BILLING__EXPIRY_WARNING_DAYS", "10");
        env::set_var("GYM_LEDGER__LOGGING__JSON", "true");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.billing.utc_offset_minutes, -300);
        assert_eq!(config.billing.expiry_warning_days, 10);
        assert!(config.logging.json);
    }

    #[test]
    fn test_validate_rejects_bad_offset() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("GYM_LEDGER__BILLING__UTC_OFFSET_MINUTES", "1000");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidUtcOffset(1000))
        );
    }
}
