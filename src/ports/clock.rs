//! Clock port.
//!
//! Engines take "now" as an argument; handlers obtain it from this port so
//! tests can pin the date.

use crate::domain::foundation::Timestamp;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}
