//! Allocation engine: inbound and outbound stock movements.
//!
//! Each call runs under the write side of the commit gate:
//!
//! ```text
//! validate all entries ─► gate.write() ─► per entry: batch + transaction
//!                                          + stock change + audit
//!                      ─► snapshot stock ─► reserve publish slot
//!                      ─► release gate ─► publish
//! ```
//!
//! Entries are applied one after the other. If the repository fails midway,
//! entries already applied stay committed, the error is returned and no
//! notification is sent.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use stockledger_core::{DomainError, ItemId, LocationCode, TransactionId, UserId};
use stockledger_inventory::{
    AuditCategory, AuditEntry, Batch, InboundEntry, MovementKind, OutboundEntry, StockChange, Transaction,
    assign_location, next_batch_id, plan_fefo, validate_quantities,
};

use crate::error::LedgerResult;
use crate::gate::CommitGate;
use crate::notifier::StockNotifier;
use crate::projections::{stock_by_item, total_quantity};
use crate::repository::{Repository, RepositoryError};
use crate::storage::LocationDirectory;

pub struct AllocationEngine<R, L> {
    repo: Arc<R>,
    locations: L,
    gate: CommitGate,
    notifier: Arc<StockNotifier>,
    hard_fallback: LocationCode,
}

impl<R, L> AllocationEngine<R, L>
where
    R: Repository,
    L: LocationDirectory,
{
    pub fn new(
        repo: Arc<R>,
        locations: L,
        gate: CommitGate,
        notifier: Arc<StockNotifier>,
        hard_fallback: LocationCode,
    ) -> Self {
        Self {
            repo,
            locations,
            gate,
            notifier,
            hard_fallback,
        }
    }

    /// Record inbound stock. Every known entry becomes a new batch; entries
    /// for unknown items are skipped.
    ///
    /// Returns the created transactions in entry order. A request that would
    /// push an item's total stock past `u64::MAX` is rejected before any write.
    pub fn receive(&self, entries: &[InboundEntry], user_id: &UserId) -> LedgerResult<Vec<Transaction>> {
        validate_quantities(entries.iter().map(|e| (&e.item_id, e.quantity)))?;

        let (created, slot, snapshot) = {
            let _write = self.gate.write()?;
            self.check_headroom(entries)?;
            let mut created = Vec::with_capacity(entries.len());
            for entry in entries {
                if let Some(tx) = self.receive_one(entry, user_id)? {
                    created.push(tx);
                }
            }
            let snapshot = stock_by_item(self.repo.as_ref())?;
            (created, self.notifier.reserve(), snapshot)
        };

        slot.publish(MovementKind::In, snapshot);
        info!(user_id = %user_id, entries = entries.len(), transactions = created.len(), "stock received");
        Ok(created)
    }

    /// Per-item stock after the request must still fit in a `u64`.
    fn check_headroom(&self, entries: &[InboundEntry]) -> LedgerResult<()> {
        let mut totals: HashMap<&ItemId, u64> = HashMap::new();
        for entry in entries {
            let current = match totals.get(&entry.item_id) {
                Some(&total) => total,
                None if self.repo.get_item(&entry.item_id)?.is_none() => continue,
                None => total_quantity(&self.repo.batches_for_item(&entry.item_id)?),
            };
            let total = current.checked_add(entry.quantity).ok_or_else(|| {
                DomainError::validation(format!("stock of item {} would exceed {}", entry.item_id, u64::MAX))
            })?;
            totals.insert(&entry.item_id, total);
        }
        Ok(())
    }

    fn receive_one(&self, entry: &InboundEntry, user_id: &UserId) -> LedgerResult<Option<Transaction>> {
        let Some(item) = self.repo.get_item(&entry.item_id)? else {
            debug!(item_id = %entry.item_id, "inbound entry for unknown item skipped");
            return Ok(None);
        };

        let existing = self.repo.batches_for_item(&item.id)?;
        let (aisle, source) = assign_location(
            existing.first().map(|b| &b.aisle_id),
            self.locations.resolve_default_location(&item)?,
            self.locations.fallback_location()?,
            &self.hard_fallback,
        );

        let batch = Batch {
            id: next_batch_id(self.repo.batch_count()?),
            item_id: item.id.clone(),
            expires_at: entry.expires_at,
            quantity: entry.quantity,
            aisle_id: aisle.clone(),
        };
        self.repo.insert_batch(batch.clone())?;

        let now = Utc::now();
        let tx = Transaction {
            id: TransactionId::new(),
            kind: MovementKind::In,
            item_id: item.id.clone(),
            quantity: entry.quantity,
            batch_id: Some(batch.id.clone()),
            expires_at: Some(entry.expires_at),
            assigned_aisles: vec![aisle.clone()],
            user_id: user_id.clone(),
            created_at: now,
        };
        self.record(&tx, &batch, &aisle)?;

        debug!(
            item_id = %item.id,
            batch_id = %batch.id,
            aisle = %aisle,
            source = ?source,
            quantity = entry.quantity,
            "batch created"
        );
        Ok(Some(tx))
    }

    /// Remove stock, earliest expiry first.
    ///
    /// Demand beyond what is on hand is dropped, so the returned list (one
    /// transaction per consumed batch, in processing order) may cover less
    /// than requested.
    pub fn ship(&self, entries: &[OutboundEntry], user_id: &UserId) -> LedgerResult<Vec<Transaction>> {
        validate_quantities(entries.iter().map(|e| (&e.item_id, e.quantity)))?;

        let (created, slot, snapshot) = {
            let _write = self.gate.write()?;
            let mut created = Vec::new();
            for entry in entries {
                self.ship_one(entry, user_id, &mut created)?;
            }
            let snapshot = stock_by_item(self.repo.as_ref())?;
            (created, self.notifier.reserve(), snapshot)
        };

        slot.publish(MovementKind::Out, snapshot);
        info!(user_id = %user_id, entries = entries.len(), transactions = created.len(), "stock shipped");
        Ok(created)
    }

    fn ship_one(&self, entry: &OutboundEntry, user_id: &UserId, created: &mut Vec<Transaction>) -> LedgerResult<()> {
        let batches = self.repo.batches_for_item(&entry.item_id)?;
        let draws = plan_fefo(&batches, entry.quantity);

        let mut shipped = 0;
        for draw in draws {
            let mut batch = batches
                .iter()
                .find(|b| b.id == draw.batch_id)
                .cloned()
                .ok_or_else(|| RepositoryError::MissingRow(format!("batch {}", draw.batch_id)))?;
            let taken = batch.consume(draw.quantity);
            self.repo.set_batch_quantity(&batch.id, batch.quantity)?;

            let tx = Transaction {
                id: TransactionId::new(),
                kind: MovementKind::Out,
                item_id: entry.item_id.clone(),
                quantity: taken,
                batch_id: Some(batch.id.clone()),
                expires_at: None,
                assigned_aisles: vec![draw.aisle_id.clone()],
                user_id: user_id.clone(),
                created_at: Utc::now(),
            };
            self.record(&tx, &batch, &draw.aisle_id)?;

            debug!(item_id = %entry.item_id, batch_id = %batch.id, quantity = taken, left = batch.quantity, "batch consumed");
            shipped += taken;
            created.push(tx);
        }

        if shipped < entry.quantity {
            warn!(
                item_id = %entry.item_id,
                requested = entry.quantity,
                shipped,
                "outbound request exceeds stock on hand"
            );
        }
        Ok(())
    }

    /// Append the transaction with its stock change and audit entry.
    fn record(&self, tx: &Transaction, batch: &Batch, aisle: &LocationCode) -> LedgerResult<()> {
        let action = match tx.kind {
            MovementKind::In => format!("transaction-in:{}", tx.item_id),
            MovementKind::Out => format!("transaction-out:{}", tx.item_id),
        };

        self.repo.append_transaction(tx.clone())?;
        self.repo
            .append_stock_change(StockChange::mirror(tx, &batch.id, aisle))?;
        self.repo.append_audit(
            AuditEntry::new(tx.user_id.clone(), action, AuditCategory::Transaction)
                .with_meta("aisleId", aisle)
                .with_meta("batchId", &batch.id)
                .at(tx.created_at),
        )?;
        Ok(())
    }
}

impl<R, L> std::fmt::Debug for AllocationEngine<R, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AllocationEngine")
            .field("hard_fallback", &self.hard_fallback)
            .finish_non_exhaustive()
    }
}
