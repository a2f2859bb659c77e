//! Read-side views recomputed from current ledger state.
//!
//! The free functions read straight from a repository and are safe to call
//! while the commit gate is already held (the engine builds its notification
//! snapshot that way). `Projections` wraps them with the read side of the
//! gate for external callers.

pub mod dashboard;
pub mod occupancy;
pub mod stock;

use std::sync::Arc;

use chrono::{DateTime, Utc};

use stockledger_inventory::{AuditEntry, StockChange};

use crate::error::LedgerResult;
use crate::gate::CommitGate;
use crate::repository::Repository;

pub use dashboard::{Dashboard, OutboundTotal, dashboard};
pub use occupancy::{AisleOccupancy, RoomOccupancy, aisle_occupancy};
pub use stock::{StockRow, stock_by_item, total_quantity};

/// Gate-aware access to the read views.
#[derive(Debug)]
pub struct Projections<R> {
    repo: Arc<R>,
    gate: CommitGate,
    expiry_window_days: i64,
    top_outbound_limit: usize,
}

impl<R: Repository> Projections<R> {
    pub fn new(repo: Arc<R>, gate: CommitGate, expiry_window_days: i64, top_outbound_limit: usize) -> Self {
        Self {
            repo,
            gate,
            expiry_window_days,
            top_outbound_limit,
        }
    }

    pub fn stock_by_item(&self) -> LedgerResult<Vec<StockRow>> {
        let _read = self.gate.read()?;
        Ok(stock_by_item(self.repo.as_ref())?)
    }

    pub fn aisle_occupancy(&self) -> LedgerResult<Vec<RoomOccupancy>> {
        let _read = self.gate.read()?;
        Ok(aisle_occupancy(self.repo.as_ref())?)
    }

    pub fn dashboard(&self, now: DateTime<Utc>) -> LedgerResult<Dashboard> {
        let _read = self.gate.read()?;
        Ok(dashboard(
            self.repo.as_ref(),
            now,
            self.expiry_window_days,
            self.top_outbound_limit,
        )?)
    }

    /// Newest first.
    pub fn recent_stock_changes(&self, limit: usize) -> LedgerResult<Vec<StockChange>> {
        let _read = self.gate.read()?;
        Ok(self.repo.recent_stock_changes(limit)?)
    }

    /// Newest first.
    pub fn recent_audit(&self, limit: usize) -> LedgerResult<Vec<AuditEntry>> {
        let _read = self.gate.read()?;
        Ok(self.repo.recent_audit(limit)?)
    }
}
