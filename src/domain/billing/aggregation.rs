//! Client-level roll-up of membership positions.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::domain::client::Client;
use crate::domain::foundation::{ClientId, MembershipTypeId, Money, Timestamp};
use crate::domain::membership::{Membership, MembershipType};
use crate::domain::payment::Payment;

use super::{BillingError, LedgerEngine, LedgerPosition, MembershipDebt};

/// Billing position of a client across every membership they take part in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateLedgerPosition {
    pub client_id: ClientId,
    pub amount_owed: Money,
    pub periods_owed: u32,

    /// Number of memberships with `amount_owed > 0`.
    pub memberships_with_debt: u32,

    pub is_up_to_date: bool,

    /// Per-membership positions, ascending by membership id.
    pub positions: Vec<LedgerPosition>,
}

/// Rolls membership positions up to the client.
#[derive(Debug, Clone, Copy, Default)]
pub struct AggregationEngine {
    ledger: LedgerEngine,
}

impl AggregationEngine {
    pub fn new(ledger: LedgerEngine) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &LedgerEngine {
        &self.ledger
    }

    /// Client position as of `now`.
    ///
    /// Returns `Ok(None)` for clients that cannot be billed (inactive or
    /// suspended). Only live, non-lapsed memberships that include the
    /// client participate; a group membership is counted once however many
    /// of its members appear in the snapshot.
    ///
    /// # Errors
    ///
    /// - `MembershipTypeNotFound` if a participating membership references
    ///   a type missing from `types`
    /// - any error of [`LedgerEngine::position`]
    pub fn client_position(
        &self,
        client: &Client,
        memberships: &[Membership],
        types: &HashMap<MembershipTypeId, MembershipType>,
        payments: &[Payment],
        now: Timestamp,
    ) -> Result<Option<AggregateLedgerPosition>, BillingError> {
        if !client.is_billable() {
            debug!(client_id = %client.id, status = ?client.status, "client not billable");
            return Ok(None);
        }

        let positions = self.positions(client, memberships, types, payments, now)?;

        let mut amount_owed = Money::ZERO;
        let mut periods_owed: u32 = 0;
        let mut memberships_with_debt: u32 = 0;
        for position in &positions {
            amount_owed = amount_owed
                .checked_add(position.amount_owed)
                .ok_or_else(|| BillingError::invalid_amount("client debt overflows"))?;
            periods_owed = periods_owed.saturating_add(position.periods_owed);
            if position.amount_owed.is_positive() {
                memberships_with_debt += 1;
            }
        }

        debug!(
            client_id = %client.id,
            memberships = positions.len(),
            amount_owed = %amount_owed,
            memberships_with_debt,
            "computed client position"
        );

        Ok(Some(AggregateLedgerPosition {
            client_id: client.id,
            amount_owed,
            periods_owed,
            memberships_with_debt,
            is_up_to_date: amount_owed.is_zero(),
            positions,
        }))
    }

    /// Debts of every participating membership, ascending by membership
    /// id. Memberships with nothing owed are kept so a payment can still be
    /// taken as an advance.
    ///
    /// Empty for a client that cannot be billed.
    pub fn outstanding_debts(
        &self,
        client: &Client,
        memberships: &[Membership],
        types: &HashMap<MembershipTypeId, MembershipType>,
        payments: &[Payment],
        now: Timestamp,
    ) -> Result<Vec<MembershipDebt>, BillingError> {
        if !client.is_billable() {
            return Ok(Vec::new());
        }
        Ok(self
            .positions(client, memberships, types, payments, now)?
            .into_iter()
            .map(|p| MembershipDebt::new(p.membership_id, p.amount_owed))
            .collect())
    }

    /// Memberships of `client` that take part in billing as of `now`,
    /// ascending by id.
    pub fn participating<'a>(
        &self,
        client: &Client,
        memberships: &'a [Membership],
        now: Timestamp,
    ) -> Vec<&'a Membership> {
        let clock = self.ledger.clock();
        let today = clock.local_date(now);
        let by_id: BTreeMap<_, _> = memberships
            .iter()
            .filter(|m| m.includes_client(&client.id))
            .filter(|m| m.participates_on(today, clock.offset()))
            .map(|m| (m.id, m))
            .collect();
        by_id.into_values().collect()
    }

    fn positions(
        &self,
        client: &Client,
        memberships: &[Membership],
        types: &HashMap<MembershipTypeId, MembershipType>,
        payments: &[Payment],
        now: Timestamp,
    ) -> Result<Vec<LedgerPosition>, BillingError> {
        self.participating(client, memberships, now)
            .into_iter()
            .map(|membership| {
                let membership_type = types
                    .get(&membership.membership_type_id)
                    .ok_or_else(|| {
                        BillingError::membership_type_not_found(membership.membership_type_id)
                    })?;
                self.ledger.position(membership, membership_type, payments, now)
            })
            .collect()
    }
}
