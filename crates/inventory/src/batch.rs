use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockledger_core::{BatchId, Entity, ItemId, LocationCode};

/// A quantity of one item with a single expiry date and storage location.
///
/// # Invariants
/// - `quantity` never increases after creation and never goes below zero.
/// - `aisle_id` is fixed at creation.
/// - Batches are retained at zero quantity for history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub id: BatchId,
    pub item_id: ItemId,
    /// May lie in the past: already-expired stock is accepted on receipt.
    pub expires_at: DateTime<Utc>,
    pub quantity: u64,
    pub aisle_id: LocationCode,
}

impl Entity for Batch {
    type Id = BatchId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Batch {
    /// Take up to `wanted` units; returns how many were actually taken.
    pub fn consume(&mut self, wanted: u64) -> u64 {
        let taken = self.quantity.min(wanted);
        self.quantity -= taken;
        taken
    }

    pub fn is_empty(&self) -> bool {
        self.quantity == 0
    }
}
