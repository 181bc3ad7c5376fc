//! Membership status.
//!
//! Storage keeps a status column that is refreshed by a nightly job in the
//! surrounding application. [`MembershipStatus::derive`] computes the same
//! value from dates so the two can be reconciled.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    /// Access granted, end date not near.
    Active,

    /// End date has passed.
    Expired,

    /// Access granted, end date within the warning window.
    UpcomingExpiry,
}

impl MembershipStatus {
    /// Returns true if the membership still grants access to the facility.
    pub fn is_live(&self) -> bool {
        matches!(self, MembershipStatus::Active | MembershipStatus::UpcomingExpiry)
    }

    /// Derives the status from the membership's end date.
    ///
    /// - `end_date < today` is expired
    /// - `end_date - today <= warning_days` is upcoming expiry
    /// - anything later is active
    pub fn derive(end_date: NaiveDate, today: NaiveDate, warning_days: u32) -> Self {
        if end_date < today {
            return MembershipStatus::Expired;
        }
        let remaining = (end_date - today).num_days();
        if remaining <= i64::from(warning_days) {
            MembershipStatus::UpcomingExpiry
        } else {
            MembershipStatus::Active
        }
    }
}
