//! Distribution of one tendered payment across several memberships.
//!
//! Every operation here preserves the tendered total to the minor unit.
//! Rounding noise is pushed onto a deterministic position (the last debtor,
//! or the cumulative floor for split columns) instead of being dropped.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::foundation::{MembershipId, Money};
use crate::domain::payment::SplitPayment;

use super::BillingError;

/// Amount a membership owes, as input to allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipDebt {
    pub membership_id: MembershipId,
    pub amount_owed: Money,
}

impl MembershipDebt {
    pub fn new(membership_id: MembershipId, amount_owed: Money) -> Self {
        Self {
            membership_id,
            amount_owed,
        }
    }
}

/// Share of the payment assigned to one membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub membership_id: MembershipId,
    pub amount: Money,
}

pub struct SettlementAllocator;

impl SettlementAllocator {
    /// Splits `total` across `debts`, keeping their order.
    ///
    /// - one debtor: it receives the whole payment, overshoot included
    /// - several debtors: each but the last receives
    ///   `min(floor(total * debt / total_debt), debt)`, the last debtor
    ///   receives the remainder
    /// - no debtor: the first entry receives the whole payment as an advance
    ///
    /// Entries with no debt receive zero whenever some entry has debt. The
    /// result always has one allocation per entry and sums to `total`.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if `total` is not positive or a debt is negative
    /// - `NothingToSettle` if `debts` is empty
    pub fn allocate(total: Money, debts: &[MembershipDebt]) -> Result<Vec<Allocation>, BillingError> {
        if !total.is_positive() {
            return Err(BillingError::invalid_amount(format!(
                "payment must be positive, got {}",
                total
            )));
        }
        if debts.is_empty() {
            return Err(BillingError::NothingToSettle);
        }
        if let Some(bad) = debts.iter().find(|d| d.amount_owed.is_negative()) {
            return Err(BillingError::invalid_amount(format!(
                "membership {} has negative debt",
                bad.membership_id
            )));
        }

        let debtors: Vec<usize> = debts
            .iter()
            .enumerate()
            .filter(|(_, d)| d.amount_owed.is_positive())
            .map(|(i, _)| i)
            .collect();

        let mut amounts = vec![Money::ZERO; debts.len()];
        match debtors.as_slice() {
            [] => amounts[0] = total,
            [only] => amounts[*only] = total,
            [init @ .., last] => {
                let total_debt: i128 = debtors
                    .iter()
                    .map(|&i| i128::from(debts[i].amount_owed.minor_units()))
                    .sum();
                let tendered = i128::from(total.minor_units());
                let mut assigned: i128 = 0;
                for &i in init {
                    let debt = i128::from(debts[i].amount_owed.minor_units());
                    let share = (tendered * debt / total_debt).min(debt);
                    assigned += share;
                    amounts[i] = Money::new(to_minor(share));
                }
                amounts[*last] = Money::new(to_minor(tendered - assigned));
            }
        }

        let allocations: Vec<Allocation> = debts
            .iter()
            .zip(amounts)
            .map(|(d, amount)| Allocation {
                membership_id: d.membership_id,
                amount,
            })
            .collect();

        debug!(
            total = %total,
            entries = debts.len(),
            debtors = debtors.len(),
            "allocated payment"
        );
        Ok(allocations)
    }

    /// Breaks a cash/transfer tender down per allocation.
    ///
    /// Cash is distributed proportionally with cumulative rounding, so
    /// `cash_i = floor(cash * cum_i / T) - floor(cash * cum_{i-1} / T)`;
    /// transfer takes the rest of each line. Both columns sum exactly and
    /// no line goes negative.
    ///
    /// # Errors
    ///
    /// `InvalidAmount` if the split is invalid for the allocated total.
    pub fn split_tender(
        split: SplitPayment,
        allocations: &[Allocation],
    ) -> Result<Vec<SplitPayment>, BillingError> {
        let total: Money = allocations.iter().map(|a| a.amount).sum();
        split.validate(total)?;
        if !total.is_positive() {
            return Err(BillingError::invalid_amount("nothing was allocated"));
        }

        let tendered = i128::from(total.minor_units());
        let cash = i128::from(split.cash.minor_units());
        let mut cumulative: i128 = 0;
        let mut cash_so_far: i128 = 0;
        let lines = allocations
            .iter()
            .map(|a| {
                cumulative += i128::from(a.amount.minor_units());
                let cash_through = cash * cumulative / tendered;
                let line_cash = Money::new(to_minor(cash_through - cash_so_far));
                cash_so_far = cash_through;
                SplitPayment::new(line_cash, a.amount.saturating_sub_floor_zero(line_cash))
            })
            .collect();
        Ok(lines)
    }

    /// Cuts the part of a share that exceeds a membership's debt into
    /// advance payments, one per period.
    ///
    /// Each piece is one full `price`; the fractional rest is added to the
    /// last piece. A surplus below one price, or any surplus on a free
    /// plan, is a single piece. At most [`MAX_ADVANCE_PERIODS`] pieces are
    /// produced and the last absorbs the excess. Pieces sum to `surplus`.
    pub fn advance_pieces(surplus: Money, price: Money) -> Vec<Money> {
        if !surplus.is_positive() {
            return Vec::new();
        }
        if !price.is_positive() {
            return vec![surplus];
        }
        let periods = (surplus.minor_units() / price.minor_units())
            .clamp(1, i64::from(MAX_ADVANCE_PERIODS));
        let head = periods - 1;
        // price * head <= surplus, so neither side overflows.
        let last = Money::new(surplus.minor_units() - price.minor_units() * head);
        let mut pieces: Vec<Money> = (0..head).map(|_| price).collect();
        pieces.push(last);
        pieces
    }
}

/// Upper bound on advance payments written for one share.
pub const MAX_ADVANCE_PERIODS: u32 = 120;

/// Values passed here are bounded by an `i64` total.
fn to_minor(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value < 0 { i64::MIN } else { i64::MAX })
}
