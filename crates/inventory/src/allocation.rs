//! Allocation rules: where inbound stock goes and which batches outbound stock
//! comes from.
//!
//! These functions decide; they never mutate ledger state. The ledger engine
//! applies their results under its write lock.

use stockledger_core::{BatchId, LocationCode};

use crate::Batch;

/// First batch id handed out; later ids count up from here.
const BATCH_ID_BASE: usize = 1001;

/// Which rule produced an inbound location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSource {
    /// Co-located with an existing batch of the same item.
    ExistingBatch,
    /// The item's configured default aisle.
    ItemDefault,
    /// The warehouse-wide fallback aisle (first aisle of the first room).
    WarehouseFallback,
    /// Hard-coded fallback when no aisle could be resolved at all.
    HardFallback,
}

/// Pick the location for a new batch, in priority order.
pub fn assign_location(
    existing_batch_aisle: Option<&LocationCode>,
    item_default: Option<LocationCode>,
    warehouse_fallback: Option<LocationCode>,
    hard_fallback: &LocationCode,
) -> (LocationCode, LocationSource) {
    if let Some(aisle) = existing_batch_aisle {
        return (aisle.clone(), LocationSource::ExistingBatch);
    }
    if let Some(aisle) = item_default {
        return (aisle, LocationSource::ItemDefault);
    }
    if let Some(aisle) = warehouse_fallback {
        return (aisle, LocationSource::WarehouseFallback);
    }
    (hard_fallback.clone(), LocationSource::HardFallback)
}

/// Deterministic id for the next batch given how many batches exist.
pub fn next_batch_id(existing_batches: usize) -> BatchId {
    BatchId::new(format!("BATCH-{}", existing_batches + BATCH_ID_BASE))
}

/// One planned withdrawal from a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draw {
    pub batch_id: BatchId,
    pub aisle_id: LocationCode,
    pub quantity: u64,
}

/// Plan an earliest-expiry-first withdrawal of `requested` units.
///
/// `batches` must be one item's batches in insertion order. Empty batches are
/// skipped, the rest are ordered by `expires_at` with ties kept in insertion
/// order. Demand beyond the available stock is left unplanned.
pub fn plan_fefo<'a>(batches: impl IntoIterator<Item = &'a Batch>, requested: u64) -> Vec<Draw> {
    let mut candidates: Vec<&Batch> = batches.into_iter().filter(|b| !b.is_empty()).collect();
    // Stable sort keeps insertion order among equal expiry dates.
    candidates.sort_by_key(|b| b.expires_at);

    let mut remaining = requested;
    let mut draws = Vec::new();
    for batch in candidates {
        if remaining == 0 {
            break;
        }
        let take = batch.quantity.min(remaining);
        remaining -= take;
        draws.push(Draw {
            batch_id: batch.id.clone(),
            aisle_id: batch.aisle_id.clone(),
            quantity: take,
        });
    }
    draws
}
