//! SettlePaymentHandler - Command handler for taking one payment from a client.
//!
//! The payment is spread over the client's memberships, each share is
//! recorded as completed payments (surplus beyond the debt as one advance
//! payment per prepaid period), and the write is rejected if any
//! membership's ledger moved since it was read.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::billing::{
    AggregateLedgerPosition, AggregationEngine, Allocation, BillingError, MembershipDebt,
    SettlementAllocator, MAX_ADVANCE_PERIODS,
};
use crate::domain::foundation::{
    ClientId, DomainError, ErrorCode, MembershipId, Money, PaymentId, PeriodTag, Timestamp,
};
use crate::domain::payment::{Payment, SplitPayment};
use crate::ports::{
    BillingSnapshotReader, ClientSnapshot, Clock, PaymentWriter, SettlementBatch, SettlementLine,
};

/// Command to settle a payment tendered by a client.
#[derive(Debug, Clone)]
pub struct SettlePaymentCommand {
    pub client_id: ClientId,

    /// Total tendered.
    pub amount: Money,

    /// Cash/transfer breakdown of `amount`, if mixed.
    pub split: Option<SplitPayment>,
}

/// Result of a successful settlement.
#[derive(Debug, Clone)]
pub struct SettlePaymentResult {
    /// Completed payments written, in membership order. A share larger than
    /// its debt yields extra advance payments.
    pub payments: Vec<Payment>,

    /// Client position after the payments.
    pub position: Option<AggregateLedgerPosition>,
}

/// Handler for settling payments.
pub struct SettlePaymentHandler {
    reader: Arc<dyn BillingSnapshotReader>,
    writer: Arc<dyn PaymentWriter>,
    clock: Arc<dyn Clock>,
    engine: AggregationEngine,
}

impl SettlePaymentHandler {
    pub fn new(
        reader: Arc<dyn BillingSnapshotReader>,
        writer: Arc<dyn PaymentWriter>,
        clock: Arc<dyn Clock>,
        engine: AggregationEngine,
    ) -> Self {
        Self {
            reader,
            writer,
            clock,
            engine,
        }
    }

    pub async fn handle(&self, cmd: SettlePaymentCommand) -> Result<SettlePaymentResult, BillingError> {
        // 1. Validate the tender before touching storage
        if let Err(err) = Self::validate_tender(&cmd) {
            warn!(client_id = %cmd.client_id, amount = %cmd.amount, error = %err, "tender rejected");
            return Err(err);
        }

        // 2. Load the client's snapshot
        let mut snapshot = self
            .reader
            .client_snapshot(&cmd.client_id)
            .await
            .map_err(|e| BillingError::infrastructure(e.to_string()))?
            .ok_or_else(|| BillingError::client_not_found(cmd.client_id))?;
        let types = snapshot.types_by_id();
        let now = self.clock.now();

        // 3. Derive debts and allocate
        let debts = self.engine.outstanding_debts(
            &snapshot.client,
            &snapshot.memberships,
            &types,
            &snapshot.payments,
            now,
        )?;
        let allocations = SettlementAllocator::allocate(cmd.amount, &debts)?;
        let splits: Vec<Option<SplitPayment>> = match cmd.split {
            Some(split) => SettlementAllocator::split_tender(split, &allocations)?
                .into_iter()
                .map(Some)
                .collect(),
            None => vec![None; allocations.len()],
        };

        // 4. Build the payments of each share
        let mut lines = Vec::new();
        for ((allocation, debt), split) in allocations.iter().zip(&debts).zip(splits) {
            if allocation.amount.is_zero() {
                continue;
            }
            let expected_live_payments = snapshot.live_payment_count(allocation.membership_id);
            for payment in self.payments_for(&snapshot, allocation, debt, split, now)? {
                lines.push(SettlementLine {
                    payment,
                    expected_live_payments,
                });
            }
        }

        // 5. Persist with the optimistic check
        let batch = SettlementBatch {
            client_id: cmd.client_id,
            lines,
        };
        let fallback = batch
            .lines
            .first()
            .map(SettlementLine::membership_id)
            .unwrap_or_default();
        if let Err(err) = self.writer.record_settlement(&batch).await {
            let err = Self::map_write_error(err, fallback);
            if matches!(err, BillingError::ConcurrentModification(_)) {
                warn!(client_id = %cmd.client_id, error = %err, "settlement conflict");
            }
            return Err(err);
        }

        let payments: Vec<Payment> = batch.lines.into_iter().map(|l| l.payment).collect();
        info!(
            client_id = %cmd.client_id,
            amount = %cmd.amount,
            payments = payments.len(),
            "settlement recorded"
        );

        // 6. Refresh the position from the snapshot plus what was written
        snapshot.payments.extend(payments.iter().cloned());
        let position = self.engine.client_position(
            &snapshot.client,
            &snapshot.memberships,
            &types,
            &snapshot.payments,
            now,
        )?;

        Ok(SettlePaymentResult { payments, position })
    }

    fn validate_tender(cmd: &SettlePaymentCommand) -> Result<(), BillingError> {
        if !cmd.amount.is_positive() {
            return Err(BillingError::invalid_amount(format!(
                "payment must be positive, got {}",
                cmd.amount
            )));
        }
        if let Some(split) = &cmd.split {
            split.validate(cmd.amount)?;
        }
        Ok(())
    }

    /// Payments recording one share.
    ///
    /// The part covering the debt goes to the first uncovered period. Any
    /// surplus is written as advance payments, one per period from the
    /// first period not yet due, so it registers as prepaid.
    fn payments_for(
        &self,
        snapshot: &ClientSnapshot,
        allocation: &Allocation,
        debt: &MembershipDebt,
        split: Option<SplitPayment>,
        now: Timestamp,
    ) -> Result<Vec<Payment>, BillingError> {
        let membership = snapshot
            .memberships
            .iter()
            .find(|m| m.id == allocation.membership_id)
            .ok_or_else(|| BillingError::membership_not_found(allocation.membership_id))?;
        let membership_type = snapshot
            .membership_types
            .iter()
            .find(|t| t.id == membership.membership_type_id)
            .ok_or_else(|| BillingError::membership_type_not_found(membership.membership_type_id))?;
        let ledger = self.engine.ledger();

        let surplus = allocation.amount.saturating_sub_floor_zero(debt.amount_owed);
        let covering = allocation.amount - surplus;

        // (amount, period, is_partial)
        let mut parts: Vec<(Money, PeriodTag, bool)> = Vec::new();
        if covering.is_positive() {
            let period = ledger.attribution_period(membership, membership_type, &snapshot.payments, now)?;
            parts.push((covering, period, covering < debt.amount_owed));
        }
        let price = membership_type.terms()?.price;
        let advances = SettlementAllocator::advance_pieces(surplus, price);
        let count = u32::try_from(advances.len()).unwrap_or(MAX_ADVANCE_PERIODS);
        let periods = ledger.advance_periods(
            membership,
            membership_type,
            &snapshot.payments,
            covering,
            count,
            now,
        )?;
        parts.extend(
            advances
                .into_iter()
                .zip(periods)
                .map(|(amount, period)| (amount, period, amount < price)),
        );

        let splits: Vec<Option<SplitPayment>> = match split {
            Some(split) => {
                let pieces: Vec<Allocation> = parts
                    .iter()
                    .map(|(amount, _, _)| Allocation {
                        membership_id: membership.id,
                        amount: *amount,
                    })
                    .collect();
                SettlementAllocator::split_tender(split, &pieces)?
                    .into_iter()
                    .map(Some)
                    .collect()
            }
            None => vec![None; parts.len()],
        };

        Ok(parts
            .into_iter()
            .zip(splits)
            .map(|((amount, period, is_partial), split)| {
                let payment = Payment::completed(PaymentId::new(), membership.id, amount, now, period)
                    .with_partial(is_partial);
                match split {
                    Some(split) => payment.with_split(split),
                    None => payment,
                }
            })
            .collect())
    }

    fn map_write_error(err: DomainError, fallback: MembershipId) -> BillingError {
        let membership_id = err
            .details
            .get("membership_id")
            .and_then(|id| id.parse().ok())
            .unwrap_or(fallback);
        match err.code {
            ErrorCode::ConcurrentModification => BillingError::concurrent_modification(membership_id),
            ErrorCode::MembershipNotFound => BillingError::membership_not_found(membership_id),
            _ => BillingError::infrastructure(err.to_string()),
        }
    }
}
