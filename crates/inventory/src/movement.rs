//! Stock movement requests and the records they produce.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockledger_core::{BatchId, DomainError, DomainResult, ItemId, LocationCode, StockChangeId, TransactionId, UserId};

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    In,
    Out,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::In => "in",
            MovementKind::Out => "out",
        }
    }
}

impl core::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of an inbound request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEntry {
    pub item_id: ItemId,
    pub quantity: u64,
    pub expires_at: DateTime<Utc>,
}

/// One line of an outbound request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundEntry {
    pub item_id: ItemId,
    pub quantity: u64,
}

impl InboundEntry {
    pub fn new(item_id: impl Into<ItemId>, quantity: u64, expires_at: DateTime<Utc>) -> Self {
        Self { item_id: item_id.into(), quantity, expires_at }
    }
}

impl OutboundEntry {
    pub fn new(item_id: impl Into<ItemId>, quantity: u64) -> Self {
        Self { item_id: item_id.into(), quantity }
    }
}

/// Reject the whole request if any line has a zero quantity.
///
/// Runs before any mutation so a malformed request leaves the ledger untouched.
pub fn validate_quantities<'a>(quantities: impl IntoIterator<Item = (&'a ItemId, u64)>) -> DomainResult<()> {
    for (idx, (item_id, quantity)) in quantities.into_iter().enumerate() {
        if quantity == 0 {
            return Err(DomainError::validation(format!(
                "entry {idx} ({item_id}): quantity must be positive"
            )));
        }
    }
    Ok(())
}

/// Immutable record of one movement against one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    #[serde(rename = "type")]
    pub kind: MovementKind,
    pub item_id: ItemId,
    pub quantity: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<BatchId>,
    /// Inbound only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub assigned_aisles: Vec<LocationCode>,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// Lightweight event mirroring a transaction, used for history and live feeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockChange {
    pub id: StockChangeId,
    pub item_id: ItemId,
    pub batch_id: BatchId,
    #[serde(rename = "type")]
    pub kind: MovementKind,
    pub quantity: u64,
    pub aisle_id: LocationCode,
    pub created_at: DateTime<Utc>,
}

impl StockChange {
    /// Mirror a batch-level transaction.
    pub fn mirror(tx: &Transaction, batch_id: &BatchId, aisle_id: &LocationCode) -> Self {
        Self {
            id: StockChangeId::new(),
            item_id: tx.item_id.clone(),
            batch_id: batch_id.clone(),
            kind: tx.kind,
            quantity: tx.quantity,
            aisle_id: aisle_id.clone(),
            created_at: tx.created_at,
        }
    }
}
