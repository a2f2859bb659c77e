use serde::{Deserialize, Serialize};

use stockledger_inventory::{Batch, Item};

use crate::repository::{RepoResult, Repository};

/// One catalog item with its batches and their summed quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRow {
    #[serde(flatten)]
    pub item: Item,
    /// Sum over all batches, empty ones included; see [`total_quantity`].
    pub total: u64,
    pub batches: Vec<Batch>,
}

/// Stock per catalog item, in catalog order.
///
/// Batches of deleted items are not listed here; they still show up in aisle
/// occupancy.
pub fn stock_by_item<R>(repo: &R) -> RepoResult<Vec<StockRow>>
where
    R: Repository + ?Sized,
{
    repo.list_items()?
        .into_iter()
        .map(|item| {
            let batches = repo.batches_for_item(&item.id)?;
            let total = total_quantity(&batches);
            Ok(StockRow { item, total, batches })
        })
        .collect()
}

/// Summed batch quantity, clamped at `u64::MAX`.
///
/// Receiving never lets one item's total overflow, but an aisle can hold
/// several items and rows can be written directly to a repository.
pub fn total_quantity(batches: &[Batch]) -> u64 {
    batches.iter().fold(0u64, |acc, b| acc.saturating_add(b.quantity))
}
