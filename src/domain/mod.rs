//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `client` - Gym clients and whether they can be billed
//! - `membership` - Memberships, membership types and status
//! - `payment` - Payment ledger records
//! - `billing` - Ledger, aggregation and settlement engines

pub mod billing;
pub mod client;
pub mod foundation;
pub mod membership;
pub mod payment;
