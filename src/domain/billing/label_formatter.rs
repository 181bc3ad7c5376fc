//! Human-readable owed/prepaid phrases.
//!
//! Output is presentational only and must never feed back into a monetary
//! computation.

use super::PeriodUnit;

const DAYS_PER_YEAR: i64 = 365;
const DAYS_PER_MONTH: i64 = 30;
const DAYS_PER_WEEK: i64 = 7;

pub struct LabelFormatter;

impl LabelFormatter {
    /// Renders a span of days, largest unit first.
    ///
    /// ```text
    /// 400 -> "1 año y 35 días"
    /// 60  -> "2 meses"
    /// 14  -> "2 semanas"
    /// 3   -> "3 días"
    /// ```
    ///
    /// Non-positive spans render as "0 días".
    pub fn format_duration(days: i64) -> String {
        if days <= 0 {
            return phrase(0, PeriodUnit::Day);
        }
        if days >= DAYS_PER_YEAR {
            return with_remainder(days / DAYS_PER_YEAR, PeriodUnit::Year, days % DAYS_PER_YEAR);
        }
        if days >= DAYS_PER_MONTH {
            return with_remainder(days / DAYS_PER_MONTH, PeriodUnit::Month, days % DAYS_PER_MONTH);
        }
        if days % DAYS_PER_WEEK == 0 {
            return phrase(days / DAYS_PER_WEEK, PeriodUnit::Week);
        }
        phrase(days, PeriodUnit::Day)
    }

    /// Renders a count of billing periods in the plan's own unit, e.g.
    /// `format_periods(1, 7)` is "1 semana".
    pub fn format_periods(count: u32, duration_days: i32) -> String {
        phrase(i64::from(count), PeriodUnit::for_duration(duration_days))
    }
}

fn phrase(count: i64, unit: PeriodUnit) -> String {
    format!("{} {}", count, unit.label_for(count.unsigned_abs()))
}

fn with_remainder(count: i64, unit: PeriodUnit, remainder_days: i64) -> String {
    if remainder_days == 0 {
        phrase(count, unit)
    } else {
        format!("{} y {}", phrase(count, unit), phrase(remainder_days, PeriodUnit::Day))
    }
}
