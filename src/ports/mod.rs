//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the billing core and the outside world. Adapters implement these ports.
//!
//! - `BillingSnapshotReader` - Immutable snapshots of clients, memberships and payments
//! - `PaymentWriter` - Atomic, optimistically checked settlement writes
//! - `Clock` - Injected current time

mod billing_snapshot_reader;
mod clock;
mod payment_writer;

pub use billing_snapshot_reader::{BillingSnapshotReader, ClientSnapshot, MembershipSnapshot};
pub use clock::Clock;
pub use payment_writer::{PaymentWriter, SettlementBatch, SettlementLine};
