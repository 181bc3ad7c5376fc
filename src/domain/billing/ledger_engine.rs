//! Per-membership billing position.
//!
//! The position is derived fresh from the payment ledger on every read and
//! is never stored. Cancelling a payment therefore needs no undo path: the
//! next computation simply no longer sees it.

use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use tracing::debug;

use crate::domain::foundation::{MembershipId, Money, PeriodTag, Timestamp};
use crate::domain::membership::{BillingTerms, Membership, MembershipType};
use crate::domain::payment::Payment;

use super::{AdvanceTracker, BillingError, PeriodClock, PeriodLabeler};

/// Billing position of one membership as of a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerPosition {
    pub membership_id: MembershipId,

    /// Periods due so far (capped at the end date of a lapsed membership).
    pub expected_periods: u32,

    pub total_due: Money,

    /// Sum of completed payments.
    pub total_paid: Money,

    /// `max(0, total_due - total_paid)`.
    pub amount_owed: Money,

    /// Whole periods needed to clear `amount_owed`, rounded up.
    pub periods_owed: u32,

    /// Completed payments tagged to a period after `current_period`; zero
    /// unless up to date.
    pub periods_paid_ahead: u32,

    pub is_up_to_date: bool,

    /// Paid surplus beyond `total_due`. Informational; never netted into
    /// `amount_owed`.
    pub credit: Money,

    /// Tag of the period the membership is currently billed for.
    pub current_period: PeriodTag,

    /// Tag of the first period that is not yet due.
    pub next_period_label: PeriodTag,
}

/// Computes ledger positions for single memberships.
#[derive(Debug, Clone, Copy, Default)]
pub struct LedgerEngine {
    clock: PeriodClock,
}

impl LedgerEngine {
    pub fn new(clock: PeriodClock) -> Self {
        Self { clock }
    }

    pub fn clock(&self) -> &PeriodClock {
        &self.clock
    }

    /// Computes the position of `membership` as of `now`.
    ///
    /// `payments` may contain payments of other memberships and cancelled
    /// payments; both are ignored.
    ///
    /// # Errors
    ///
    /// - `Configuration` if the membership type has a negative price or a
    ///   non-positive period length
    /// - `MembershipTypeNotFound` if `membership_type` is not the type the
    ///   membership references
    pub fn position(
        &self,
        membership: &Membership,
        membership_type: &MembershipType,
        payments: &[Payment],
        now: Timestamp,
    ) -> Result<LedgerPosition, BillingError> {
        let terms = Self::terms_for(membership, membership_type)?;
        let duration = terms.duration_days;

        let expected_periods = self.clock.elapsed_for(membership, duration, now);
        let total_due = terms
            .price
            .checked_times(i64::from(expected_periods))
            .ok_or_else(|| {
                BillingError::configuration(membership_type.id, "total due overflows")
            })?;
        let total_paid = Self::total_paid(membership.id, payments)?;

        let amount_owed = total_due.saturating_sub_floor_zero(total_paid);
        let credit = total_paid.saturating_sub_floor_zero(total_due);
        let periods_owed = Self::whole_periods(amount_owed, terms.price);
        let is_up_to_date = amount_owed.is_zero();

        let next_period_label = self.label_after(membership, expected_periods, duration);
        let current_period = match expected_periods.checked_sub(1) {
            Some(last_due) => self.label_after(membership, last_due, duration),
            None => next_period_label.previous(),
        };

        let periods_paid_ahead = if is_up_to_date {
            AdvanceTracker::periods_paid_ahead(membership, payments, current_period)
        } else {
            0
        };

        debug!(
            membership_id = %membership.id,
            expected_periods,
            total_due = %total_due,
            total_paid = %total_paid,
            amount_owed = %amount_owed,
            periods_paid_ahead,
            "computed ledger position"
        );

        Ok(LedgerPosition {
            membership_id: membership.id,
            expected_periods,
            total_due,
            total_paid,
            amount_owed,
            periods_owed,
            periods_paid_ahead,
            is_up_to_date,
            credit,
            current_period,
            next_period_label,
        })
    }

    /// Period a new payment on `membership` should be attributed to: the
    /// first period whose price is not yet fully covered by completed
    /// payments.
    ///
    /// For a free plan every period is covered as soon as it is due, so the
    /// answer is the first period not yet due.
    pub fn attribution_period(
        &self,
        membership: &Membership,
        membership_type: &MembershipType,
        payments: &[Payment],
        now: Timestamp,
    ) -> Result<PeriodTag, BillingError> {
        let terms = Self::terms_for(membership, membership_type)?;
        let covered = if terms.price.is_positive() {
            let paid = Self::total_paid(membership.id, payments)?;
            let periods = paid.minor_units() / terms.price.minor_units();
            u32::try_from(periods).unwrap_or(u32::MAX)
        } else {
            self.clock.elapsed_for(membership, terms.duration_days, now)
        };
        Ok(self.label_after(membership, covered, terms.duration_days))
    }

    /// Tags for `count` consecutive advance payments on `membership`, made
    /// after `settled` more has been paid on top of `payments`.
    ///
    /// The first tag is the first period still uncovered once `settled` is
    /// paid, and never a period that is already due.
    pub fn advance_periods(
        &self,
        membership: &Membership,
        membership_type: &MembershipType,
        payments: &[Payment],
        settled: Money,
        count: u32,
        now: Timestamp,
    ) -> Result<Vec<PeriodTag>, BillingError> {
        let terms = Self::terms_for(membership, membership_type)?;
        let due = self.clock.elapsed_for(membership, terms.duration_days, now);
        let covered = if terms.price.is_positive() {
            let paid = Self::total_paid(membership.id, payments)?
                .checked_add(settled)
                .ok_or_else(|| BillingError::invalid_amount("payment total overflows"))?;
            u32::try_from(paid.minor_units() / terms.price.minor_units()).unwrap_or(u32::MAX)
        } else {
            due
        };
        let first = covered.max(due);
        Ok((0..count)
            .map(|k| self.label_after(membership, first.saturating_add(k), terms.duration_days))
            .collect())
    }

    fn label_after(&self, membership: &Membership, periods: u32, duration: NonZeroU32) -> PeriodTag {
        PeriodLabeler::canonical_label(self.clock.period_start(
            membership.reference_date(),
            periods,
            duration,
        ))
    }

    fn terms_for(
        membership: &Membership,
        membership_type: &MembershipType,
    ) -> Result<BillingTerms, BillingError> {
        if membership.membership_type_id != membership_type.id {
            return Err(BillingError::membership_type_not_found(
                membership.membership_type_id,
            ));
        }
        membership_type.terms()
    }

    fn total_paid(membership_id: MembershipId, payments: &[Payment]) -> Result<Money, BillingError> {
        payments
            .iter()
            .filter(|p| p.membership_id == membership_id && p.counts_toward_balance())
            .try_fold(Money::ZERO, |acc, p| {
                if p.amount.is_negative() {
                    return Err(BillingError::invalid_amount(format!(
                        "payment {} has negative amount",
                        p.id
                    )));
                }
                acc.checked_add(p.amount)
                    .ok_or_else(|| BillingError::invalid_amount("payment total overflows"))
            })
    }

    /// `ceil(amount / price)`, zero when nothing is owed.
    fn whole_periods(amount: Money, price: Money) -> u32 {
        if !amount.is_positive() || !price.is_positive() {
            return 0;
        }
        let amount = amount.minor_units();
        let price = price.minor_units();
        let periods = amount / price + i64::from(amount % price != 0);
        u32::try_from(periods).unwrap_or(u32::MAX)
    }
}
