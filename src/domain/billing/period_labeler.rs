//! Period units and canonical period tags.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::PeriodTag;

/// Display unit of a billing period length.
///
/// | duration_days | unit |
/// |---------------|------|
/// | 1..=6 | día |
/// | 7 | semana |
/// | 8..=364 | mes |
/// | 365.. | año |
///
/// Non-positive durations fall back to days; labels are presentational and
/// never fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodUnit {
    Day,
    Week,
    Month,
    Year,
}

/// Singular and plural label of a period unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodLabels {
    pub singular: &'static str,
    pub plural: &'static str,
}

impl PeriodUnit {
    /// Unit for a period of `duration_days`.
    pub fn for_duration(duration_days: i32) -> Self {
        match duration_days {
            i32::MIN..=6 => PeriodUnit::Day,
            7 => PeriodUnit::Week,
            8..=364 => PeriodUnit::Month,
            _ => PeriodUnit::Year,
        }
    }

    pub fn labels(&self) -> PeriodLabels {
        match self {
            PeriodUnit::Day => PeriodLabels {
                singular: "día",
                plural: "días",
            },
            PeriodUnit::Week => PeriodLabels {
                singular: "semana",
                plural: "semanas",
            },
            PeriodUnit::Month => PeriodLabels {
                singular: "mes",
                plural: "meses",
            },
            PeriodUnit::Year => PeriodLabels {
                singular: "año",
                plural: "años",
            },
        }
    }

    /// Label agreeing with `count`: exactly 1 is singular.
    pub fn label_for(&self, count: u64) -> &'static str {
        let labels = self.labels();
        if count == 1 {
            labels.singular
        } else {
            labels.plural
        }
    }
}

/// Maps period lengths to labels and dates to period tags.
pub struct PeriodLabeler;

impl PeriodLabeler {
    /// Singular/plural labels for a period of `duration_days`.
    pub fn labels(duration_days: i32) -> PeriodLabels {
        PeriodUnit::for_duration(duration_days).labels()
    }

    /// Canonical tag of the period starting on `date`.
    ///
    /// The tag is the calendar year-month of the period start, whatever the
    /// plan's cadence. That is only a faithful cycle identifier for ~30-day
    /// plans: two 7-day periods can share a tag and a 365-day plan skips
    /// eleven. Callers must treat the tag as an opaque sequence token and
    /// never derive dates from it.
    ///
    /// Unlike a `(date, duration_days)` labeler, no period length is taken:
    /// the tag depends on the start date alone, so the cadence would be an
    /// ignored argument. Callers compute the start date with
    /// [`PeriodClock::period_start`](super::PeriodClock::period_start).
    pub fn canonical_label(date: NaiveDate) -> PeriodTag {
        PeriodTag::containing(date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_day_plan_is_daily() {
        let labels = PeriodLabeler::labels(1);
        assert_eq!((labels.singular, labels.plural), ("día", "días"));
    }

    #[test]
    fn short_plans_use_generic_daily_unit() {
        for d in 2..7 {
            assert_eq!(PeriodUnit::for_duration(d), PeriodUnit::Day);
        }
    }

    #[test]
    fn seven_days_is_weekly() {
        let labels = PeriodLabeler::labels(7);
        assert_eq!((labels.singular, labels.plural), ("semana", "semanas"));
    }

    #[test]
    fn eight_to_364_days_is_monthly() {
        assert_eq!(PeriodUnit::for_duration(8), PeriodUnit::Month);
        assert_eq!(PeriodUnit::for_duration(30), PeriodUnit::Month);
        assert_eq!(PeriodUnit::for_duration(364), PeriodUnit::Month);
    }

    #[test]
    fn a_year_or_more_is_yearly() {
        assert_eq!(PeriodUnit::for_duration(365), PeriodUnit::Year);
        assert_eq!(PeriodUnit::for_duration(730), PeriodUnit::Year);
    }

    #[test]
    fn non_positive_duration_falls_back_to_days() {
        assert_eq!(PeriodUnit::for_duration(0), PeriodUnit::Day);
        assert_eq!(PeriodUnit::for_duration(-7), PeriodUnit::Day);
    }

    #[test]
    fn count_of_one_is_singular() {
        assert_eq!(PeriodUnit::Week.label_for(1), "semana");
        assert_eq!(PeriodUnit::Week.label_for(0), "semanas");
        assert_eq!(PeriodUnit::Year.label_for(2), "años");
    }

    #[test]
    fn canonical_label_is_year_month_of_date() {
        let date = NaiveDate::from_ymd_opt(2025, 9, 14).unwrap();
        assert_eq!(PeriodLabeler::canonical_label(date).to_string(), "2025-09");
    }
}
