//! Membership entity.
//!
//! A membership grants one client (or a group of clients sharing a single
//! bill) access to the facility under a membership type.
//!
//! # Design Decisions
//!
//! - **Billing anchor**: periods are counted from `billing_start_date` when
//!   present, otherwise from `start_date`
//! - **Group plans billed once**: a group membership is one bill no matter
//!   how many clients share it
//! - **Money in minor units**: prices live on the membership type as `Money`

use chrono::{FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ClientId, MembershipId, MembershipTypeId, Timestamp, ValidationError};

use super::MembershipStatus;

/// Who a membership belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MembershipHolder {
    /// A single client.
    Individual { client_id: ClientId },

    /// Several clients sharing one bill, up to `max_capacity`.
    Group {
        client_ids: Vec<ClientId>,
        max_capacity: u32,
    },
}

impl MembershipHolder {
    /// Returns true if `client_id` is covered by this membership.
    pub fn includes(&self, client_id: &ClientId) -> bool {
        match self {
            MembershipHolder::Individual { client_id: owner } => owner == client_id,
            MembershipHolder::Group { client_ids, .. } => client_ids.contains(client_id),
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, MembershipHolder::Group { .. })
    }
}

/// Membership entity.
///
/// # Invariants
///
/// - `end_date >= start_date`
/// - group plans: `client_ids.len() <= max_capacity`, no duplicate clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub id: MembershipId,

    pub membership_type_id: MembershipTypeId,

    pub holder: MembershipHolder,

    /// Date access was granted.
    pub start_date: Timestamp,

    /// Overrides `start_date` as the anchor for period counting.
    #[serde(default)]
    pub billing_start_date: Option<Timestamp>,

    pub end_date: Timestamp,

    pub status: MembershipStatus,
}

impl Membership {
    /// Creates a validated membership.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if an invariant does not hold.
    pub fn new(
        id: MembershipId,
        membership_type_id: MembershipTypeId,
        holder: MembershipHolder,
        start_date: Timestamp,
        billing_start_date: Option<Timestamp>,
        end_date: Timestamp,
        status: MembershipStatus,
    ) -> Result<Self, ValidationError> {
        let membership = Self {
            id,
            membership_type_id,
            holder,
            start_date,
            billing_start_date,
            end_date,
            status,
        };
        membership.validate()?;
        Ok(membership)
    }

    /// Convenience constructor for a single-client membership.
    pub fn individual(
        id: MembershipId,
        membership_type_id: MembershipTypeId,
        client_id: ClientId,
        start_date: Timestamp,
        end_date: Timestamp,
    ) -> Result<Self, ValidationError> {
        Self::new(
            id,
            membership_type_id,
            MembershipHolder::Individual { client_id },
            start_date,
            None,
            end_date,
            MembershipStatus::Active,
        )
    }

    /// Re-checks the invariants, e.g. after deserializing a snapshot.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.end_date.is_before(&self.start_date) {
            return Err(ValidationError::invalid_format(
                "end_date",
                "end_date must not precede start_date",
            ));
        }
        if let MembershipHolder::Group {
            client_ids,
            max_capacity,
        } = &self.holder
        {
            if client_ids.is_empty() {
                return Err(ValidationError::empty_field("client_ids"));
            }
            if client_ids.len() > *max_capacity as usize {
                return Err(ValidationError::out_of_range(
                    "client_ids",
                    1,
                    i32::try_from(*max_capacity).unwrap_or(i32::MAX),
                    i32::try_from(client_ids.len()).unwrap_or(i32::MAX),
                ));
            }
            let mut seen = client_ids.clone();
            seen.sort();
            seen.dedup();
            if seen.len() != client_ids.len() {
                return Err(ValidationError::invalid_format(
                    "client_ids",
                    "a client appears twice in the group",
                ));
            }
        }
        Ok(())
    }

    /// Sets the billing anchor override.
    pub fn with_billing_start(mut self, billing_start_date: Timestamp) -> Self {
        self.billing_start_date = Some(billing_start_date);
        self
    }

    /// The date periods are counted from.
    pub fn reference_date(&self) -> Timestamp {
        self.billing_start_date.unwrap_or(self.start_date)
    }

    /// Returns true if `client_id` holds or shares this membership.
    pub fn includes_client(&self, client_id: &ClientId) -> bool {
        self.holder.includes(client_id)
    }

    /// Returns true if the end date is before `today` in the given local
    /// calendar.
    pub fn is_lapsed(&self, today: NaiveDate, offset: FixedOffset) -> bool {
        self.end_date.local_date(offset) < today
    }

    /// Returns true if the membership takes part in client-level billing on
    /// `today`: live status and not lapsed.
    pub fn participates_on(&self, today: NaiveDate, offset: FixedOffset) -> bool {
        self.status.is_live() && !self.is_lapsed(today, offset)
    }
}
