//! Billing configuration

use chrono::FixedOffset;
use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::billing::{AggregationEngine, LedgerEngine, PeriodClock};

const MAX_OFFSET_MINUTES: i32 = 14 * 60;
const MAX_WARNING_DAYS: u32 = 365;

/// Billing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BillingConfig {
    /// Offset of the gym's local calendar from UTC, in minutes
    #[serde(default)]
    pub utc_offset_minutes: i32,

    /// Days before the end date a membership counts as upcoming expiry
    #[serde(default = "default_expiry_warning_days")]
    pub expiry_warning_days: u32,
}

impl BillingConfig {
    /// Validate billing configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.utc_offset_minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(ValidationError::InvalidUtcOffset(self.utc_offset_minutes));
        }
        if self.expiry_warning_days > MAX_WARNING_DAYS {
            return Err(ValidationError::InvalidExpiryWarning(self.expiry_warning_days));
        }
        Ok(())
    }

    /// The local offset as a chrono offset
    pub fn offset(&self) -> Result<FixedOffset, ValidationError> {
        self.validate()?;
        FixedOffset::east_opt(self.utc_offset_minutes * 60)
            .ok_or(ValidationError::InvalidUtcOffset(self.utc_offset_minutes))
    }

    /// Period clock for the configured local calendar
    pub fn period_clock(&self) -> Result<PeriodClock, ValidationError> {
        Ok(PeriodClock::new(self.offset()?))
    }

    /// Aggregation engine wired to the configured clock
    pub fn aggregation_engine(&self) -> Result<AggregationEngine, ValidationError> {
        Ok(AggregationEngine::new(LedgerEngine::new(self.period_clock()?)))
    }
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            expiry_warning_days: default_expiry_warning_days(),
        }
    }
}

fn default_expiry_warning_days() -> u32 {
    7
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = BillingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.expiry_warning_days, 7);
        assert_eq!(config.offset().unwrap().local_minus_utc(), 0);
    }

    #[test]
    fn negative_offset_is_west_of_utc() {
        let config = BillingConfig {
            utc_offset_minutes: -300,
            ..Default::default()
        };
        assert_eq!(config.offset().unwrap().local_minus_utc(), -5 * 3600);
    }

    #[test]
    fn offset_beyond_fourteen_hours_is_rejected() {
        let config = BillingConfig {
            utc_offset_minutes: 15 * 60,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidUtcOffset(900)));
        assert!(config.period_clock().is_err());
    }

    #[test]
    fn warning_window_above_a_year_is_rejected() {
        let config = BillingConfig {
            expiry_warning_days: 400,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidExpiryWarning(400)));
    }
}
