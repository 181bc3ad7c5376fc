//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod billing;

pub use billing::{
    GetClientPositionHandler, GetClientPositionQuery, GetClientPositionResult,
    GetMembershipPositionHandler, GetMembershipPositionQuery, GetMembershipPositionResult,
    SettlePaymentCommand, SettlePaymentHandler, SettlePaymentResult,
};
