//! Payment domain module.
//!
//! # Module Structure
//!
//! - `payment` - Payment record and status
//! - `split` - Cash/transfer breakdown of one payment

mod payment;
mod split;

pub use payment::{Payment, PaymentStatus};
pub use split::SplitPayment;
