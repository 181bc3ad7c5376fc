//! Adapters - Implementations of port interfaces.
//!
//! - `clock` - System and fixed clocks
//! - `memory` - In-memory billing store (snapshot reader and payment writer)

pub mod clock;
pub mod memory;

pub use clock::{FixedClock, SystemClock};
pub use memory::InMemoryBillingStore;
