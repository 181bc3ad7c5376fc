//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types that form the
//! vocabulary of the billing domain.

mod errors;
mod ids;
mod money;
mod period_tag;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{ClientId, MembershipId, MembershipTypeId, PaymentId};
pub use money::Money;
pub use period_tag::PeriodTag;
pub use timestamp::Timestamp;
