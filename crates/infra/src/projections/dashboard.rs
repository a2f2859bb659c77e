use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use stockledger_core::ItemId;
use stockledger_inventory::{Batch, MovementKind};

use crate::repository::{RepoResult, Repository};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundTotal {
    pub item_id: ItemId,
    /// Item name, or the raw id if the item no longer exists.
    pub name: String,
    pub total_out: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub top_outbound: Vec<OutboundTotal>,
    /// Batches expiring after `now` and within the window.
    pub expiring_soon: Vec<Batch>,
    /// Batches that expired before `now`, empty ones included.
    pub expired: Vec<Batch>,
}

/// Dashboard summary as of `now`.
///
/// `top_outbound` ranks items by lifetime outbound quantity; on equal totals
/// the item shipped most recently comes first. A window reaching past the
/// representable range is cut off at `DateTime::<Utc>::MAX_UTC`.
pub fn dashboard<R>(repo: &R, now: DateTime<Utc>, window_days: i64, top_n: usize) -> RepoResult<Dashboard>
where
    R: Repository + ?Sized,
{
    let horizon = Duration::try_days(window_days)
        .and_then(|window| now.checked_add_signed(window))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    let batches = repo.list_batches()?;
    let expiring_soon = batches
        .iter()
        .filter(|b| b.expires_at > now && b.expires_at <= horizon)
        .cloned()
        .collect();
    let expired = batches.into_iter().filter(|b| b.expires_at < now).collect();

    let mut totals: Vec<(ItemId, u64)> = Vec::new();
    let mut slots: HashMap<ItemId, usize> = HashMap::new();
    for tx in repo.list_transactions()?.into_iter().rev() {
        if tx.kind != MovementKind::Out {
            continue;
        }
        match slots.get(&tx.item_id) {
            Some(&slot) => totals[slot].1 = totals[slot].1.saturating_add(tx.quantity),
            None => {
                slots.insert(tx.item_id.clone(), totals.len());
                totals.push((tx.item_id, tx.quantity));
            }
        }
    }
    // Stable: ties stay in most-recently-shipped order.
    totals.sort_by(|a, b| b.1.cmp(&a.1));
    totals.truncate(top_n);

    let names: HashMap<ItemId, String> =
        repo.list_items()?.into_iter().map(|i| (i.id, i.name)).collect();
    let top_outbound = totals
        .into_iter()
        .map(|(item_id, total_out)| OutboundTotal {
            name: names.get(&item_id).cloned().unwrap_or_else(|| item_id.to_string()),
            item_id,
            total_out,
        })
        .collect();

    Ok(Dashboard {
        top_outbound,
        expiring_soon,
        expired,
    })
}
