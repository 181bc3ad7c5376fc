//! Billing handlers.
//!
//! ## Commands
//! - Settling a tendered payment across a client's memberships
//!
//! ## Queries
//! - Position of one membership
//! - Aggregate position of a client

mod get_client_position;
mod get_membership_position;
mod settle_payment;

// Commands
pub use settle_payment::{SettlePaymentCommand, SettlePaymentHandler, SettlePaymentResult};

// Queries
pub use get_client_position::{
    GetClientPositionHandler, GetClientPositionQuery, GetClientPositionResult,
};
pub use get_membership_position::{
    GetMembershipPositionHandler, GetMembershipPositionQuery, GetMembershipPositionResult,
};
