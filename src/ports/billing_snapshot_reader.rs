//! Billing snapshot reader port (read side).
//!
//! Storage hands the billing core complete, immutable snapshots. Nothing is
//! lazily loaded during a computation.
//!
//! # Design
//!
//! - **Full payment history**: cancelled payments are included; the engines
//!   decide what counts
//! - **Plain data**: snapshots are serde records so fixtures can be loaded
//!   from JSON

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::client::Client;
use crate::domain::foundation::{ClientId, DomainError, MembershipId, MembershipTypeId};
use crate::domain::membership::{Membership, MembershipType};
use crate::domain::payment::Payment;

/// Reader port for billing snapshots.
#[async_trait]
pub trait BillingSnapshotReader: Send + Sync {
    /// Everything needed to bill one client.
    ///
    /// Returns `None` if the client does not exist.
    async fn client_snapshot(&self, client_id: &ClientId)
        -> Result<Option<ClientSnapshot>, DomainError>;

    /// Everything needed to compute one membership's position.
    ///
    /// Returns `None` if the membership does not exist.
    async fn membership_snapshot(
        &self,
        membership_id: &MembershipId,
    ) -> Result<Option<MembershipSnapshot>, DomainError>;
}

/// A client with every membership they hold or share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSnapshot {
    pub client: Client,

    pub memberships: Vec<Membership>,

    /// Types referenced by `memberships`.
    pub membership_types: Vec<MembershipType>,

    /// Payments of `memberships`, any status.
    #[serde(default)]
    pub payments: Vec<Payment>,
}

impl ClientSnapshot {
    /// Membership types keyed by id.
    pub fn types_by_id(&self) -> HashMap<MembershipTypeId, MembershipType> {
        self.membership_types
            .iter()
            .map(|t| (t.id, t.clone()))
            .collect()
    }

    /// Number of non-cancelled payments of a membership, the version stamp
    /// used for optimistic concurrency on writes.
    pub fn live_payment_count(&self, membership_id: MembershipId) -> usize {
        self.payments
            .iter()
            .filter(|p| p.membership_id == membership_id && p.is_live())
            .count()
    }
}

/// One membership with its type and payments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipSnapshot {
    pub membership: Membership,
    pub membership_type: MembershipType,

    #[serde(default)]
    pub payments: Vec<Payment>,
}
