//! Billing period token.
//!
//! Payments are attributed to a billing period through a tag that storage
//! keeps as a `"YYYY-MM"` string. Inside the crate the tag is a structured
//! `(year, index)` pair so that ordering is chronological rather than
//! lexical. The string form only exists at the serde boundary.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

const PERIODS_PER_YEAR: u32 = 12;

/// Opaque, totally ordered billing period token.
///
/// The index is a calendar month. Tags are compared and stepped, never
/// converted back into dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeriodTag {
    year: i32,
    index: u32,
}

impl PeriodTag {
    /// Creates a tag, validating the period index (1-12).
    pub fn new(year: i32, index: u32) -> Result<Self, ValidationError> {
        if !(1..=PERIODS_PER_YEAR).contains(&index) {
            return Err(ValidationError::out_of_range(
                "period_index",
                1,
                PERIODS_PER_YEAR as i32,
                index as i32,
            ));
        }
        Ok(Self { year, index })
    }

    /// Returns the tag of the period containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            index: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// The tag immediately after this one.
    pub fn next(&self) -> Self {
        if self.index == PERIODS_PER_YEAR {
            Self {
                year: self.year + 1,
                index: 1,
            }
        } else {
            Self {
                year: self.year,
                index: self.index + 1,
            }
        }
    }

    /// The tag immediately before this one.
    pub fn previous(&self) -> Self {
        if self.index == 1 {
            Self {
                year: self.year - 1,
                index: PERIODS_PER_YEAR,
            }
        } else {
            Self {
                year: self.year,
                index: self.index - 1,
            }
        }
    }
}

impl fmt::Display for PeriodTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.index)
    }
}

impl FromStr for PeriodTag {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, index) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| ValidationError::invalid_format("period_label", "expected YYYY-MM"))?;
        let year: i32 = year
            .parse()
            .map_err(|_| ValidationError::invalid_format("period_label", "year is not a number"))?;
        let index: u32 = index
            .parse()
            .map_err(|_| ValidationError::invalid_format("period_label", "period is not a number"))?;
        Self::new(year, index)
    }
}

impl Serialize for PeriodTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PeriodTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(s: &str) -> PeriodTag {
        s.parse().unwrap()
    }

    #[test]
    fn orders_chronologically_across_year_boundary() {
        assert!(tag("2024-12") < tag("2025-01"));
        assert!(tag("2025-09") < tag("2025-10"));
    }

    #[test]
    fn orders_chronologically_even_without_zero_padding() {
        // "2025-9" > "2025-10" lexically; chronologically it is earlier.
        assert!(tag("2025-9") < tag("2025-10"));
        assert_eq!(tag("2025-9"), tag("2025-09"));
    }

    #[test]
    fn next_and_previous_wrap_years() {
        assert_eq!(tag("2025-12").next(), tag("2026-01"));
        assert_eq!(tag("2026-01").previous(), tag("2025-12"));
        assert_eq!(tag("2025-05").next().previous(), tag("2025-05"));
    }

    #[test]
    fn containing_uses_calendar_month() {
        let date = NaiveDate::from_ymd_opt(2025, 4, 30).unwrap();
        assert_eq!(PeriodTag::containing(date), tag("2025-04"));
    }

    #[test]
    fn rejects_malformed_labels() {
        assert!("2025".parse::<PeriodTag>().is_err());
        assert!("2025-13".parse::<PeriodTag>().is_err());
        assert!("2025-00".parse::<PeriodTag>().is_err());
        assert!("abcd-01".parse::<PeriodTag>().is_err());
    }

    #[test]
    fn serializes_to_legacy_string() {
        let json = serde_json::to_string(&tag("2025-3")).unwrap();
        assert_eq!(json, "\"2025-03\"");
        let parsed: PeriodTag = serde_json::from_str("\"2025-03\"").unwrap();
        assert_eq!(parsed, tag("2025-03"));
    }

    #[test]
    fn deserialize_rejects_bad_label() {
        assert!(serde_json::from_str::<PeriodTag>("\"march\"").is_err());
    }
}
