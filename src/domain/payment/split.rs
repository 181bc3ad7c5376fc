//! Cash/transfer breakdown of a tendered amount.

use serde::{Deserialize, Serialize};

use crate::domain::billing::BillingError;
use crate::domain::foundation::Money;

/// How one payment was tendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitPayment {
    pub cash: Money,
    pub transfer: Money,
}

impl SplitPayment {
    pub fn new(cash: Money, transfer: Money) -> Self {
        Self { cash, transfer }
    }

    /// Sum of both components, `None` on overflow.
    pub fn total(&self) -> Option<Money> {
        self.cash.checked_add(self.transfer)
    }

    /// Checks the breakdown against the payment amount.
    ///
    /// # Errors
    ///
    /// `BillingError::InvalidAmount` if a component is negative or the
    /// components do not add up to `amount`.
    pub fn validate(&self, amount: Money) -> Result<(), BillingError> {
        if self.cash.is_negative() || self.transfer.is_negative() {
            return Err(BillingError::invalid_amount(
                "split components must not be negative",
            ));
        }
        match self.total() {
            Some(total) if total == amount => Ok(()),
            Some(total) => Err(BillingError::invalid_amount(format!(
                "split components sum to {} but the payment is {}",
                total, amount
            ))),
            None => Err(BillingError::invalid_amount("split components overflow")),
        }
    }
}
