//! Gym Ledger - Membership billing reconciliation
//!
//! This crate derives, from an immutable payment ledger, how much each
//! gym membership owes, how many periods it is behind or ahead, and how a
//! single payment is split across a client's memberships without losing a
//! minor unit to rounding.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod observability;
pub mod ports;
