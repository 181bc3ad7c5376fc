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
    #[error("UTC offset must be within ±14 hours, got {0} minutes")]
    InvalidUtcOffset(i32),

    #[error("Expiry warning window must be at most 365 days, got {0}")]
    InvalidExpiryWarning(u32),

    #[error("Log level must not be empty")]
    EmptyLogLevel,
}
