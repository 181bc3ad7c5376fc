//! In-memory billing store.
//!
//! Implements both [`BillingSnapshotReader`] and [`PaymentWriter`] over a
//! single `tokio::sync::RwLock`. The optimistic check and the append happen
//! under one write guard, so a settlement is atomic against concurrent
//! settlements on the same store.
//!
//! Suitable for tests, fixtures and the command-line tool. Data lives for the
//! lifetime of the store.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::domain::billing::BillingError;
use crate::domain::client::Client;
use crate::domain::foundation::{
    ClientId, DomainError, ErrorCode, MembershipId, MembershipTypeId, PaymentId,
};
use crate::domain::membership::{Membership, MembershipType};
use crate::domain::payment::{Payment, PaymentStatus};
use crate::ports::{
    BillingSnapshotReader, ClientSnapshot, MembershipSnapshot, PaymentWriter, SettlementBatch,
};

#[derive(Debug, Default)]
struct State {
    clients: HashMap<ClientId, Client>,
    membership_types: HashMap<MembershipTypeId, MembershipType>,
    memberships: HashMap<MembershipId, Membership>,
    payments: Vec<Payment>,
}

impl State {
    fn live_payments(&self, membership_id: MembershipId) -> usize {
        self.payments
            .iter()
            .filter(|p| p.membership_id == membership_id && p.is_live())
            .count()
    }

    fn payments_of(&self, membership_id: MembershipId) -> Vec<Payment> {
        self.payments
            .iter()
            .filter(|p| p.membership_id == membership_id)
            .cloned()
            .collect()
    }
}

/// In-memory implementation of the billing storage ports.
#[derive(Debug, Default)]
pub struct InMemoryBillingStore {
    state: RwLock<State>,
}

impl InMemoryBillingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store holding exactly the contents of `snapshot`.
    ///
    /// # Errors
    ///
    /// `ValidationFailed` if a membership is malformed (end before start,
    /// empty or over-capacity group).
    pub fn from_snapshot(snapshot: ClientSnapshot) -> Result<Self, BillingError> {
        for membership in &snapshot.memberships {
            membership.validate()?;
        }
        let state = State {
            clients: HashMap::from([(snapshot.client.id, snapshot.client)]),
            membership_types: snapshot
                .membership_types
                .into_iter()
                .map(|t| (t.id, t))
                .collect(),
            memberships: snapshot
                .memberships
                .into_iter()
                .map(|m| (m.id, m))
                .collect(),
            payments: snapshot.payments,
        };
        Ok(Self {
            state: RwLock::new(state),
        })
    }

    // === Seeding ===

    pub async fn insert_client(&self, client: Client) {
        self.state.write().await.clients.insert(client.id, client);
    }

    pub async fn insert_membership_type(&self, membership_type: MembershipType) {
        self.state
            .write()
            .await
            .membership_types
            .insert(membership_type.id, membership_type);
    }

    pub async fn insert_membership(&self, membership: Membership) {
        self.state
            .write()
            .await
            .memberships
            .insert(membership.id, membership);
    }

    /// Appends a payment without any concurrency check.
    pub async fn insert_payment(&self, payment: Payment) {
        self.state.write().await.payments.push(payment);
    }

    /// Marks a payment cancelled. The record stays in the ledger.
    ///
    /// # Errors
    ///
    /// `ValidationFailed` if no payment has that id.
    pub async fn cancel_payment(&self, payment_id: PaymentId) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let payment = state
            .payments
            .iter_mut()
            .find(|p| p.id == payment_id)
            .ok_or_else(|| {
                DomainError::validation("payment_id", format!("unknown payment {}", payment_id))
            })?;
        payment.status = PaymentStatus::Cancelled;
        debug!(payment_id = %payment_id, "payment cancelled");
        Ok(())
    }

    // === Inspection ===

    /// All payments of a membership, any status.
    pub async fn payments_for(&self, membership_id: MembershipId) -> Vec<Payment> {
        self.state.read().await.payments_of(membership_id)
    }

    pub async fn payment_count(&self) -> usize {
        self.state.read().await.payments.len()
    }
}

#[async_trait]
impl BillingSnapshotReader for InMemoryBillingStore {
    async fn client_snapshot(
        &self,
        client_id: &ClientId,
    ) -> Result<Option<ClientSnapshot>, DomainError> {
        let state = self.state.read().await;
        let Some(client) = state.clients.get(client_id) else {
            return Ok(None);
        };

        let mut memberships: Vec<Membership> = state
            .memberships
            .values()
            .filter(|m| m.includes_client(client_id))
            .cloned()
            .collect();
        memberships.sort_by_key(|m| m.id);

        let mut membership_types: Vec<MembershipType> = Vec::new();
        for membership in &memberships {
            if let Some(t) = state.membership_types.get(&membership.membership_type_id) {
                if !membership_types.iter().any(|known| known.id == t.id) {
                    membership_types.push(t.clone());
                }
            }
        }

        let payments = memberships
            .iter()
            .flat_map(|m| state.payments_of(m.id))
            .collect();

        Ok(Some(ClientSnapshot {
            client: client.clone(),
            memberships,
            membership_types,
            payments,
        }))
    }

    async fn membership_snapshot(
        &self,
        membership_id: &MembershipId,
    ) -> Result<Option<MembershipSnapshot>, DomainError> {
        let state = self.state.read().await;
        let Some(membership) = state.memberships.get(membership_id) else {
            return Ok(None);
        };
        let membership_type = state
            .membership_types
            .get(&membership.membership_type_id)
            .cloned()
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::MembershipTypeNotFound,
                    format!("membership type {} not found", membership.membership_type_id),
                )
                .with_detail("membership_type_id", membership.membership_type_id.to_string())
            })?;

        Ok(Some(MembershipSnapshot {
            membership: membership.clone(),
            membership_type,
            payments: state.payments_of(*membership_id),
        }))
    }
}

#[async_trait]
impl PaymentWriter for InMemoryBillingStore {
    async fn record_settlement(&self, batch: &SettlementBatch) -> Result<(), DomainError> {
        let mut state = self.state.write().await;

        for line in &batch.lines {
            let membership_id = line.membership_id();
            if !state.memberships.contains_key(&membership_id) {
                return Err(DomainError::new(
                    ErrorCode::MembershipNotFound,
                    format!("membership {} not found", membership_id),
                )
                .with_detail("membership_id", membership_id.to_string()));
            }
            let stored = state.live_payments(membership_id);
            if stored != line.expected_live_payments {
                warn!(
                    membership_id = %membership_id,
                    expected = line.expected_live_payments,
                    stored,
                    "settlement rejected: payment ledger changed"
                );
                return Err(DomainError::new(
                    ErrorCode::ConcurrentModification,
                    format!("payments for membership {} changed", membership_id),
                )
                .with_detail("membership_id", membership_id.to_string()));
            }
        }

        state
            .payments
            .extend(batch.lines.iter().map(|line| line.payment.clone()));
        debug!(
            client_id = %batch.client_id,
            payments = batch.lines.len(),
            "settlement persisted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::client::ClientStatus;
    use crate::domain::foundation::{Money, PeriodTag, Timestamp};
    use crate::ports::SettlementLine;
    use chrono::{DateTime, Utc};

    fn ts(s: &str) -> Timestamp {
        Timestamp::from_datetime(DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc))
    }

    struct Fixture {
        store: InMemoryBillingStore,
        client: Client,
        membership: Membership,
    }

    async fn fixture() -> Fixture {
        let store = InMemoryBillingStore::new();
        let client = Client::new(ClientId::new(), "Ana", ClientStatus::Active);
        let plan = MembershipType::new(MembershipTypeId::new(), "Mensual", Money::new(100_000), 30);
        let membership = Membership::individual(
            MembershipId::new(),
            plan.id,
            client.id,
            ts("2025-01-01T00:00:00Z"),
            ts("2025-12-31T00:00:00Z"),
        )
        .unwrap();
        store.insert_client(client.clone()).await;
        store.insert_membership_type(plan).await;
        store.insert_membership(membership.clone()).await;
        Fixture {
            store,
            client,
            membership,
        }
    }

    fn payment(m: &Membership) -> Payment {
        Payment::completed(
            PaymentId::new(),
            m.id,
            Money::new(100_000),
            ts("2025-02-01T00:00:00Z"),
            PeriodTag::new(2025, 1).unwrap(),
        )
    }

    fn batch(f: &Fixture, expected_live_payments: usize) -> SettlementBatch {
        SettlementBatch {
            client_id: f.client.id,
            lines: vec![SettlementLine {
                payment: payment(&f.membership),
                expected_live_payments,
            }],
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Reader
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn client_snapshot_collects_memberships_types_and_payments() {
        let f = fixture().await;
        f.store.insert_payment(payment(&f.membership)).await;

        let snapshot = f.store.client_snapshot(&f.client.id).await.unwrap().unwrap();

        assert_eq!(snapshot.memberships.len(), 1);
        assert_eq!(snapshot.membership_types.len(), 1);
        assert_eq!(snapshot.payments.len(), 1);
        assert_eq!(snapshot.live_payment_count(f.membership.id), 1);
    }

    #[tokio::test]
    async fn from_snapshot_round_trips_the_reader() {
        let f = fixture().await;
        let snapshot = f.store.client_snapshot(&f.client.id).await.unwrap().unwrap();

        let copy = InMemoryBillingStore::from_snapshot(snapshot.clone()).unwrap();

        assert_eq!(copy.client_snapshot(&f.client.id).await.unwrap(), Some(snapshot));
    }

    #[tokio::test]
    async fn from_snapshot_rejects_membership_ending_before_it_starts() {
        let f = fixture().await;
        let mut snapshot = f.store.client_snapshot(&f.client.id).await.unwrap().unwrap();
        snapshot.memberships[0].end_date = ts("2024-12-01T00:00:00Z");

        let err = InMemoryBillingStore::from_snapshot(snapshot).unwrap_err();

        assert_eq!(err.code(), ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn unknown_client_is_none() {
        let f = fixture().await;
        let snapshot = f.store.client_snapshot(&ClientId::new()).await.unwrap();
        assert!(snapshot.is_none());
    }

    #[tokio::test]
    async fn membership_snapshot_includes_cancelled_payments() {
        let f = fixture().await;
        let p = payment(&f.membership);
        f.store.insert_payment(p.clone()).await;
        f.store.cancel_payment(p.id).await.unwrap();

        let snapshot = f
            .store
            .membership_snapshot(&f.membership.id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(snapshot.payments.len(), 1);
        assert_eq!(snapshot.payments[0].status, PaymentStatus::Cancelled);
    }

    #[tokio::test]
    async fn cancelling_unknown_payment_fails() {
        let f = fixture().await;
        assert!(f.store.cancel_payment(PaymentId::new()).await.is_err());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Writer
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn settlement_with_current_version_is_persisted() {
        let f = fixture().await;

        f.store.record_settlement(&batch(&f, 0)).await.unwrap();

        assert_eq!(f.store.payments_for(f.membership.id).await.len(), 1);
    }

    #[tokio::test]
    async fn stale_settlement_is_rejected_and_nothing_written() {
        let f = fixture().await;
        f.store.record_settlement(&batch(&f, 0)).await.unwrap();

        let err = f.store.record_settlement(&batch(&f, 0)).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::ConcurrentModification);
        assert_eq!(
            err.details.get("membership_id"),
            Some(&f.membership.id.to_string())
        );
        assert_eq!(f.store.payment_count().await, 1);
    }

    #[tokio::test]
    async fn cancelled_payments_do_not_count_as_live() {
        let f = fixture().await;
        let p = payment(&f.membership);
        f.store.insert_payment(p.clone()).await;
        f.store.cancel_payment(p.id).await.unwrap();

        assert!(f.store.record_settlement(&batch(&f, 0)).await.is_ok());
    }

    #[tokio::test]
    async fn settlement_for_unknown_membership_fails() {
        let f = fixture().await;
        let stranger = Membership::individual(
            MembershipId::new(),
            MembershipTypeId::new(),
            f.client.id,
            ts("2025-01-01T00:00:00Z"),
            ts("2025-12-31T00:00:00Z"),
        )
        .unwrap();
        let batch = SettlementBatch {
            client_id: f.client.id,
            lines: vec![SettlementLine {
                payment: payment(&stranger),
                expected_live_payments: 0,
            }],
        };

        let err = f.store.record_settlement(&batch).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::MembershipNotFound);
        assert_eq!(f.store.payment_count().await, 0);
    }
}
