//! GetClientPositionHandler - Query handler for a client's aggregate position.

use std::sync::Arc;

use crate::domain::billing::{AggregateLedgerPosition, AggregationEngine, BillingError};
use crate::domain::foundation::ClientId;
use crate::ports::{BillingSnapshotReader, Clock};

/// Query for the aggregate position of a client.
#[derive(Debug, Clone)]
pub struct GetClientPositionQuery {
    pub client_id: ClientId,
}

/// `None` for clients that cannot be billed.
pub type GetClientPositionResult = Option<AggregateLedgerPosition>;

/// Handler for client position queries.
pub struct GetClientPositionHandler {
    reader: Arc<dyn BillingSnapshotReader>,
    clock: Arc<dyn Clock>,
    engine: AggregationEngine,
}

impl GetClientPositionHandler {
    pub fn new(
        reader: Arc<dyn BillingSnapshotReader>,
        clock: Arc<dyn Clock>,
        engine: AggregationEngine,
    ) -> Self {
        Self {
            reader,
            clock,
            engine,
        }
    }

    pub async fn handle(
        &self,
        query: GetClientPositionQuery,
    ) -> Result<GetClientPositionResult, BillingError> {
        let snapshot = self
            .reader
            .client_snapshot(&query.client_id)
            .await
            .map_err(|e| BillingError::infrastructure(e.to_string()))?
            .ok_or_else(|| BillingError::client_not_found(query.client_id))?;

        self.engine.client_position(
            &snapshot.client,
            &snapshot.memberships,
            &snapshot.types_by_id(),
            &snapshot.payments,
            self.clock.now(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{FixedClock, InMemoryBillingStore};
    use crate::domain::client::{Client, ClientStatus};
    use crate::domain::foundation::{ErrorCode, MembershipId, MembershipTypeId, Money, Timestamp};
    use crate::domain::membership::{Membership, MembershipType};
    use chrono::{DateTime, Utc};

    fn ts(s: &str) -> Timestamp {
        Timestamp::from_datetime(DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc))
    }

    async fn store_with(status: ClientStatus) -> (Arc<InMemoryBillingStore>, ClientId) {
        let store = Arc::new(InMemoryBillingStore::new());
        let client = Client::new(ClientId::new(), "Ana", status);
        let plan = MembershipType::new(MembershipTypeId::new(), "Semanal", Money::new(25_000), 7);
        let membership = Membership::individual(
            MembershipId::new(),
            plan.id,
            client.id,
            ts("2025-03-01T00:00:00Z"),
            ts("2025-12-31T00:00:00Z"),
        )
        .unwrap();
        let client_id = client.id;
        store.insert_client(client).await;
        store.insert_membership_type(plan).await;
        store.insert_membership(membership).await;
        (store, client_id)
    }

    fn handler(store: Arc<InMemoryBillingStore>) -> GetClientPositionHandler {
        GetClientPositionHandler::new(
            store,
            Arc::new(FixedClock::new(ts("2025-03-15T00:00:00Z"))),
            AggregationEngine::default(),
        )
    }

    #[tokio::test]
    async fn active_client_gets_aggregate_position() {
        let (store, client_id) = store_with(ClientStatus::Active).await;

        let position = handler(store)
            .handle(GetClientPositionQuery { client_id })
            .await
            .unwrap()
            .unwrap();

        assert_eq!(position.amount_owed, Money::new(50_000));
        assert_eq!(position.periods_owed, 2);
        assert_eq!(position.memberships_with_debt, 1);
    }

    #[tokio::test]
    async fn suspended_client_has_no_position() {
        let (store, client_id) = store_with(ClientStatus::Suspended).await;

        let position = handler(store)
            .handle(GetClientPositionQuery { client_id })
            .await
            .unwrap();
        assert!(position.is_none());
    }

    #[tokio::test]
    async fn unknown_client_is_not_found() {
        let (store, _) = store_with(ClientStatus::Active).await;

        let err = handler(store)
            .handle(GetClientPositionQuery {
                client_id: ClientId::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ClientNotFound);
    }
}
