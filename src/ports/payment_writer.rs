//! Payment writer port (write side).
//!
//! The core never writes directly. A settlement is handed over as a batch
//! and persisted all-or-nothing.
//!
//! # Concurrency
//!
//! Two "pay now" actions against the same membership must not both read the
//! same debt and both succeed. Each line therefore carries the number of
//! live payments the caller saw for its membership. Implementations compare
//! it with the stored count under their write lock or transaction and fail
//! with `ErrorCode::ConcurrentModification` on any mismatch, persisting
//! nothing.

use async_trait::async_trait;

use crate::domain::foundation::{ClientId, DomainError, MembershipId};
use crate::domain::payment::Payment;

/// Writer port for the payment ledger.
#[async_trait]
pub trait PaymentWriter: Send + Sync {
    /// Persists every payment of the batch atomically.
    ///
    /// # Errors
    ///
    /// - `ConcurrentModification` if a membership's live payment count
    ///   differs from `expected_live_payments`; the `membership_id` detail
    ///   names it
    /// - `DatabaseError` on persistence failure
    async fn record_settlement(&self, batch: &SettlementBatch) -> Result<(), DomainError>;
}

/// Payments produced by one settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementBatch {
    pub client_id: ClientId,
    pub lines: Vec<SettlementLine>,
}

/// One payment plus the ledger version it was computed against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementLine {
    pub payment: Payment,

    /// Live payments of the membership when the debt was read.
    pub expected_live_payments: usize,
}

impl SettlementLine {
    pub fn membership_id(&self) -> MembershipId {
        self.payment.membership_id
    }
}
