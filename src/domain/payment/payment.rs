//! Payment record.

use serde::{Deserialize, Serialize};

use crate::domain::billing::BillingError;
use crate::domain::foundation::{MembershipId, Money, PaymentId, PeriodTag, Timestamp};

use super::SplitPayment;

/// Payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Completed,
    Pending,
    Cancelled,
}

/// A payment attributed to one billing period of one membership.
///
/// The payment ledger is the only source of truth for billing. Cancelling a
/// payment reverses every effect it had simply because cancelled payments
/// are left out of each recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,

    pub membership_id: MembershipId,

    pub amount: Money,

    pub payment_date: Timestamp,

    pub status: PaymentStatus,

    /// Billing period the payment is attributed to, which is not
    /// necessarily the month it was made in.
    #[serde(rename = "period_label")]
    pub period: PeriodTag,

    #[serde(default)]
    pub split_payment: Option<SplitPayment>,

    /// Informational only; never used by the engines.
    #[serde(default)]
    pub is_partial: bool,
}

impl Payment {
    /// Creates a completed payment.
    pub fn completed(
        id: PaymentId,
        membership_id: MembershipId,
        amount: Money,
        payment_date: Timestamp,
        period: PeriodTag,
    ) -> Self {
        Self {
            id,
            membership_id,
            amount,
            payment_date,
            status: PaymentStatus::Completed,
            period,
            split_payment: None,
            is_partial: false,
        }
    }

    pub fn with_status(mut self, status: PaymentStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_split(mut self, split: SplitPayment) -> Self {
        self.split_payment = Some(split);
        self
    }

    pub fn with_partial(mut self, is_partial: bool) -> Self {
        self.is_partial = is_partial;
        self
    }

    /// Only completed payments reduce debt or count as advance credit.
    pub fn counts_toward_balance(&self) -> bool {
        self.status == PaymentStatus::Completed
    }

    /// Returns true if the payment is live (not cancelled).
    pub fn is_live(&self) -> bool {
        self.status != PaymentStatus::Cancelled
    }

    /// Checks amount and split breakdown.
    ///
    /// # Errors
    ///
    /// `BillingError::InvalidAmount` for a negative amount or a split that
    /// does not add up.
    pub fn validate(&self) -> Result<(), BillingError> {
        if self.amount.is_negative() {
            return Err(BillingError::invalid_amount(format!(
                "payment {} has negative amount {}",
                self.id, self.amount
            )));
        }
        if let Some(split) = &self.split_payment {
            split.validate(self.amount)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn sample(amount: i64) -> Payment {
        Payment::completed(
            PaymentId::new(),
            MembershipId::new(),
            Money::new(amount),
            Timestamp::from_datetime(
                DateTime::parse_from_rfc3339("2025-02-03T15:00:00Z")
                    .unwrap()
                    .with_timezone(&Utc),
            ),
            "2025-02".parse().unwrap(),
        )
    }

    #[test]
    fn only_completed_counts_toward_balance() {
        assert!(sample(100).counts_toward_balance());
        assert!(!sample(100).with_status(PaymentStatus::Pending).counts_toward_balance());
        assert!(!sample(100).with_status(PaymentStatus::Cancelled).counts_toward_balance());
    }

    #[test]
    fn cancelled_payment_is_not_live() {
        assert!(!sample(100).with_status(PaymentStatus::Cancelled).is_live());
        assert!(sample(100).with_status(PaymentStatus::Pending).is_live());
    }

    #[test]
    fn negative_amount_is_invalid() {
        assert!(sample(-5).validate().is_err());
    }

    #[test]
    fn split_must_match_amount() {
        let payment = sample(100).with_split(SplitPayment::new(Money::new(30), Money::new(60)));
        assert!(payment.validate().is_err());

        let payment = sample(100).with_split(SplitPayment::new(Money::new(40), Money::new(60)));
        assert!(payment.validate().is_ok());
    }

    #[test]
    fn serializes_period_under_legacy_field_name() {
        let json = serde_json::to_value(sample(100)).unwrap();
        assert_eq!(json["period_label"], "2025-02");
        assert_eq!(json["status"], "completed");
    }

    #[test]
    fn deserializes_without_optional_fields() {
        let json = serde_json::json!({
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "membership_id": "550e8400-e29b-41d4-a716-446655440001",
            "amount": 100000,
            "payment_date": "2025-01-05T10:00:00Z",
            "status": "completed",
            "period_label": "2025-1"
        });
        let payment: Payment = serde_json::from_value(json).unwrap();
        assert_eq!(payment.period, "2025-01".parse().unwrap());
        assert!(payment.split_payment.is_none());
        assert!(!payment.is_partial);
    }
}
