//! Membership domain module.
//!
//! # Module Structure
//!
//! - `aggregate` - Membership entity and its holder (individual or group)
//! - `membership_type` - Price and period length of a plan
//! - `status` - Lifecycle status and its derivation from dates

mod aggregate;
mod membership_type;
mod status;

pub use aggregate::{Membership, MembershipHolder};
pub use membership_type::{BillingTerms, MembershipType};
pub use status::MembershipStatus;
