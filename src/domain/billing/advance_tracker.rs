//! Counts periods paid ahead of the current obligation.
//!
//! Arrears are amount-based so partial payments are tolerated, but once the
//! balance is zero an amount cannot tell "two periods prepaid" from "a
//! generous overpayment". Advance credit is therefore read from the period
//! tags payments were attributed to.

use crate::domain::foundation::PeriodTag;
use crate::domain::membership::Membership;
use crate::domain::payment::Payment;

pub struct AdvanceTracker;

impl AdvanceTracker {
    /// Number of completed payments of `membership` tagged to a period
    /// after `current`.
    ///
    /// Settlement writes one payment per prepaid period, so the count is the
    /// number of periods paid ahead. Only meaningful for a membership that
    /// is up to date; the ledger reports zero otherwise.
    pub fn periods_paid_ahead(
        membership: &Membership,
        payments: &[Payment],
        current: PeriodTag,
    ) -> u32 {
        let ahead = payments
            .iter()
            .filter(|p| p.membership_id == membership.id && p.counts_toward_balance())
            .filter(|p| p.period > current)
            .count();
        u32::try_from(ahead).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{
        ClientId, MembershipId, MembershipTypeId, Money, PaymentId, Timestamp,
    };
    use crate::domain::payment::PaymentStatus;
    use chrono::{DateTime, Utc};

    fn ts(s: &str) -> Timestamp {
        Timestamp::from_datetime(DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc))
    }

    fn tag(s: &str) -> PeriodTag {
        s.parse().unwrap()
    }

    fn membership() -> Membership {
        Membership::individual(
            MembershipId::new(),
            MembershipTypeId::new(),
            ClientId::new(),
            ts("2025-01-01T00:00:00Z"),
            ts("2025-12-31T00:00:00Z"),
        )
        .unwrap()
    }

    fn paid(m: &Membership, period: &str) -> Payment {
        Payment::completed(
            PaymentId::new(),
            m.id,
            Money::new(100_000),
            ts("2025-01-01T00:00:00Z"),
            tag(period),
        )
    }

    #[test]
    fn counts_periods_strictly_after_current() {
        let m = membership();
        let payments = vec![
            paid(&m, "2025-02"),
            paid(&m, "2025-03"),
            paid(&m, "2025-04"),
            paid(&m, "2025-05"),
        ];
        assert_eq!(AdvanceTracker::periods_paid_ahead(&m, &payments, tag("2025-03")), 2);
    }

    #[test]
    fn compares_chronologically_not_lexically() {
        let m = membership();
        let payments = vec![paid(&m, "2025-10")];
        assert_eq!(AdvanceTracker::periods_paid_ahead(&m, &payments, tag("2025-9")), 1);
    }

    #[test]
    fn each_payment_to_a_future_period_counts() {
        let m = membership();
        let payments = vec![paid(&m, "2025-06"), paid(&m, "2025-06")];
        assert_eq!(AdvanceTracker::periods_paid_ahead(&m, &payments, tag("2025-05")), 2);
    }

    #[test]
    fn cancelled_and_pending_payments_are_ignored() {
        let m = membership();
        let payments = vec![
            paid(&m, "2025-06").with_status(PaymentStatus::Cancelled),
            paid(&m, "2025-07").with_status(PaymentStatus::Pending),
        ];
        assert_eq!(AdvanceTracker::periods_paid_ahead(&m, &payments, tag("2025-05")), 0);
    }

    #[test]
    fn other_memberships_payments_are_ignored() {
        let m = membership();
        let other = membership();
        let payments = vec![paid(&other, "2025-06")];
        assert_eq!(AdvanceTracker::periods_paid_ahead(&m, &payments, tag("2025-05")), 0);
    }
}
