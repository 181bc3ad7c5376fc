//! Membership type: the price and length of one billing period.

use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

use crate::domain::billing::BillingError;
use crate::domain::foundation::{MembershipTypeId, Money};

/// A plan definition referenced by memberships.
///
/// Treated as immutable once payments reference it. A price change is a new
/// type, so past ledger computations never move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipType {
    pub id: MembershipTypeId,

    /// Display name ("Mensual", "Semanal", ...).
    pub name: String,

    /// Price of one period.
    pub price: Money,

    /// Length of one billing period in days.
    pub duration_days: i32,
}

impl MembershipType {
    pub fn new(id: MembershipTypeId, name: impl Into<String>, price: Money, duration_days: i32) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            duration_days,
        }
    }

    /// Checks that the type can be billed against.
    ///
    /// # Errors
    ///
    /// `BillingError::Configuration` for a negative price or a non-positive
    /// period length.
    pub fn validate(&self) -> Result<(), BillingError> {
        if self.price.is_negative() {
            return Err(BillingError::configuration(
                self.id,
                format!("price must not be negative, got {}", self.price),
            ));
        }
        if self.duration_days <= 0 {
            return Err(BillingError::configuration(
                self.id,
                format!("duration_days must be positive, got {}", self.duration_days),
            ));
        }
        Ok(())
    }

    /// Validated billing terms of this type.
    ///
    /// # Errors
    ///
    /// Same as [`MembershipType::validate`].
    pub fn terms(&self) -> Result<BillingTerms, BillingError> {
        self.validate()?;
        let duration_days = u32::try_from(self.duration_days)
            .ok()
            .and_then(NonZeroU32::new)
            .ok_or_else(|| BillingError::configuration(self.id, "duration_days out of range"))?;
        Ok(BillingTerms {
            price: self.price,
            duration_days,
        })
    }
}

/// Price and period length of a membership type after validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingTerms {
    /// Non-negative price of one period.
    pub price: Money,

    pub duration_days: NonZeroU32,
}
