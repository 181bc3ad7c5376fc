//! Day-granular billing period arithmetic.
//!
//! Every date that enters billing goes through here, so the time of day of
//! a timestamp can never change how many periods are due.

use chrono::{Days, FixedOffset, NaiveDate, Offset, Utc};
use std::num::NonZeroU32;

use crate::domain::foundation::Timestamp;
use crate::domain::membership::Membership;

/// Counts elapsed billing periods in the gym's local calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodClock {
    offset: FixedOffset,
}

impl PeriodClock {
    /// Creates a clock for the given local UTC offset.
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Clock that treats UTC as local time.
    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Local calendar date of `ts` (midnight normalization).
    pub fn local_date(&self, ts: Timestamp) -> NaiveDate {
        ts.local_date(self.offset)
    }

    /// Number of periods due between `reference` and `as_of`.
    ///
    /// Billing is in advance: one day into a period makes the whole period
    /// due, so this is `ceil(days / duration_days)`. Returns 0 when `as_of`
    /// is not after `reference`.
    pub fn elapsed_periods(
        &self,
        reference: Timestamp,
        as_of: Timestamp,
        duration_days: NonZeroU32,
    ) -> u32 {
        let days = (self.local_date(as_of) - self.local_date(reference)).num_days();
        if days <= 0 {
            return 0;
        }
        let duration = i64::from(duration_days.get());
        let periods = (days + duration - 1) / duration;
        u32::try_from(periods).unwrap_or(u32::MAX)
    }

    /// Returns true if the membership's end date is before `now`'s local day.
    pub fn is_lapsed(&self, membership: &Membership, now: Timestamp) -> bool {
        membership.is_lapsed(self.local_date(now), self.offset)
    }

    /// The date debt is accrued up to: `now`, clamped to the end date of a
    /// lapsed membership so dead memberships stop accruing.
    pub fn accrual_cutoff(&self, membership: &Membership, now: Timestamp) -> Timestamp {
        if self.is_lapsed(membership, now) {
            membership.end_date
        } else {
            now
        }
    }

    /// Periods due on a membership as of `now`, honoring the lapse cap.
    pub fn elapsed_for(
        &self,
        membership: &Membership,
        duration_days: NonZeroU32,
        now: Timestamp,
    ) -> u32 {
        self.elapsed_periods(
            membership.reference_date(),
            self.accrual_cutoff(membership, now),
            duration_days,
        )
    }

    /// First local day of the period that starts `periods` periods after
    /// `reference`.
    pub fn period_start(
        &self,
        reference: Timestamp,
        periods: u32,
        duration_days: NonZeroU32,
    ) -> NaiveDate {
        let offset_days = u64::from(periods) * u64::from(duration_days.get());
        self.local_date(reference)
            .checked_add_days(Days::new(offset_days))
            .unwrap_or(NaiveDate::MAX)
    }
}

impl Default for PeriodClock {
    fn default() -> Self {
        Self::utc()
    }
}
