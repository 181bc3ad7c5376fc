//! GetMembershipPositionHandler - Query handler for one membership's ledger position.

use std::sync::Arc;

use crate::domain::billing::{BillingError, LedgerEngine, LedgerPosition};
use crate::domain::foundation::MembershipId;
use crate::ports::{BillingSnapshotReader, Clock};

/// Query for the position of a membership as of the clock's "now".
#[derive(Debug, Clone)]
pub struct GetMembershipPositionQuery {
    pub membership_id: MembershipId,
}

/// Result of a successful position query.
pub type GetMembershipPositionResult = LedgerPosition;

/// Handler for membership position queries.
pub struct GetMembershipPositionHandler {
    reader: Arc<dyn BillingSnapshotReader>,
    clock: Arc<dyn Clock>,
    engine: LedgerEngine,
}

impl GetMembershipPositionHandler {
    pub fn new(
        reader: Arc<dyn BillingSnapshotReader>,
        clock: Arc<dyn Clock>,
        engine: LedgerEngine,
    ) -> Self {
        Self {
            reader,
            clock,
            engine,
        }
    }

    pub async fn handle(
        &self,
        query: GetMembershipPositionQuery,
    ) -> Result<GetMembershipPositionResult, BillingError> {
        let snapshot = self
            .reader
            .membership_snapshot(&query.membership_id)
            .await
            .map_err(|e| BillingError::infrastructure(e.to_string()))?
            .ok_or_else(|| BillingError::membership_not_found(query.membership_id))?;

        self.engine.position(
            &snapshot.membership,
            &snapshot.membership_type,
            &snapshot.payments,
            self.clock.now(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::FixedClock;
    use crate::domain::foundation::{
        ClientId, DomainError, ErrorCode, MembershipTypeId, Money, PaymentId, PeriodTag, Timestamp,
    };
    use crate::domain::membership::{Membership, MembershipType};
    use crate::domain::payment::Payment;
    use crate::ports::{ClientSnapshot, MembershipSnapshot};
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementation
    // ════════════════════════════════════════════════════════════════════════════

    struct MockReader {
        snapshot: Option<MembershipSnapshot>,
        fail_read: bool,
    }

    impl MockReader {
        fn with(snapshot: MembershipSnapshot) -> Self {
            Self {
                snapshot: Some(snapshot),
                fail_read: false,
            }
        }

        fn empty() -> Self {
            Self {
                snapshot: None,
                fail_read: false,
            }
        }

        fn failing() -> Self {
            Self {
                snapshot: None,
                fail_read: true,
            }
        }
    }

    #[async_trait]
    impl BillingSnapshotReader for MockReader {
        async fn client_snapshot(
            &self,
            _client_id: &ClientId,
        ) -> Result<Option<ClientSnapshot>, DomainError> {
            Ok(None)
        }

        async fn membership_snapshot(
            &self,
            membership_id: &MembershipId,
        ) -> Result<Option<MembershipSnapshot>, DomainError> {
            if self.fail_read {
                return Err(DomainError::new(ErrorCode::DatabaseError, "Simulated read failure"));
            }
            Ok(self
                .snapshot
                .clone()
                .filter(|s| &s.membership.id == membership_id))
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn ts(s: &str) -> Timestamp {
        Timestamp::from_datetime(DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc))
    }

    fn snapshot(paid: i64) -> MembershipSnapshot {
        let plan = MembershipType::new(MembershipTypeId::new(), "Mensual", Money::new(100_000), 30);
        let membership = Membership::individual(
            MembershipId::new(),
            plan.id,
            ClientId::new(),
            ts("2025-01-01T00:00:00Z"),
            ts("2025-12-31T00:00:00Z"),
        )
        .unwrap();
        let payments = vec![Payment::completed(
            PaymentId::new(),
            membership.id,
            Money::new(paid),
            ts("2025-01-10T00:00:00Z"),
            PeriodTag::new(2025, 1).unwrap(),
        )];
        MembershipSnapshot {
            membership,
            membership_type: plan,
            payments,
        }
    }

    fn handler(reader: MockReader) -> GetMembershipPositionHandler {
        GetMembershipPositionHandler::new(
            Arc::new(reader),
            Arc::new(FixedClock::new(ts("2025-04-01T10:00:00Z"))),
            LedgerEngine::default(),
        )
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn returns_position_as_of_clock() {
        let snapshot = snapshot(100_000);
        let membership_id = snapshot.membership.id;

        let position = handler(MockReader::with(snapshot))
            .handle(GetMembershipPositionQuery { membership_id })
            .await
            .unwrap();

        assert_eq!(position.amount_owed, Money::new(200_000));
        assert_eq!(position.periods_owed, 2);
    }

    #[tokio::test]
    async fn missing_membership_is_not_found() {
        let err = handler(MockReader::empty())
            .handle(GetMembershipPositionQuery {
                membership_id: MembershipId::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::MembershipNotFound);
    }

    #[tokio::test]
    async fn reader_failure_is_infrastructure_error() {
        let err = handler(MockReader::failing())
            .handle(GetMembershipPositionQuery {
                membership_id: MembershipId::new(),
            })
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }
}
