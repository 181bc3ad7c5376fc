//! Billing domain module.
//!
//! Pure reconciliation of memberships against the payment ledger. Nothing
//! here reads the system clock or storage: callers pass snapshots and an
//! explicit "now".
//!
//! # Module Structure
//!
//! - `period_clock` - Day-granular period counting in the local calendar
//! - `period_labeler` - Period units and canonical period tags
//! - `ledger_engine` - Per-membership debt, credit and period position
//! - `advance_tracker` - Periods paid ahead of the current obligation
//! - `aggregation` - Client-level roll-up across memberships
//! - `settlement` - Exact-sum distribution of one payment over several debts
//! - `label_formatter` - Presentational duration phrases
//! - `errors` - Billing error taxonomy

mod advance_tracker;
mod aggregation;
mod errors;
mod label_formatter;
mod ledger_engine;
mod period_clock;
mod period_labeler;
mod settlement;

pub use advance_tracker::AdvanceTracker;
pub use aggregation::{AggregateLedgerPosition, AggregationEngine};
pub use errors::BillingError;
pub use label_formatter::LabelFormatter;
pub use ledger_engine::{LedgerEngine, LedgerPosition};
pub use period_clock::PeriodClock;
pub use period_labeler::{PeriodLabeler, PeriodLabels, PeriodUnit};
pub use settlement::{Allocation, MembershipDebt, SettlementAllocator, MAX_ADVANCE_PERIODS};
