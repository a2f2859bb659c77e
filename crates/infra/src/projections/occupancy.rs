use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use stockledger_core::{ItemId, RoomId};
use stockledger_inventory::Aisle;

use crate::projections::stock::total_quantity;
use crate::repository::{RepoResult, Repository};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AisleOccupancy {
    #[serde(flatten)]
    pub aisle: Aisle,
    pub stock: u64,
    /// Distinct names of the items stored here, first seen first.
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomOccupancy {
    pub id: RoomId,
    pub floor: u32,
    pub name: String,
    pub aisles: Vec<AisleOccupancy>,
}

/// Stock held in each aisle of each room.
///
/// Batches are matched to aisles by label. Batches whose item was deleted are
/// listed under the raw item id.
pub fn aisle_occupancy<R>(repo: &R) -> RepoResult<Vec<RoomOccupancy>>
where
    R: Repository + ?Sized,
{
    let names: HashMap<ItemId, String> =
        repo.list_items()?.into_iter().map(|i| (i.id, i.name)).collect();

    repo.list_rooms()?
        .into_iter()
        .map(|room| {
            let aisles = room
                .aisles
                .into_iter()
                .map(|aisle| {
                    let batches = repo.batches_in_aisle(&aisle.label)?;
                    let stock = total_quantity(&batches);
                    let mut items: Vec<String> = Vec::new();
                    for batch in &batches {
                        let name = names
                            .get(&batch.item_id)
                            .cloned()
                            .unwrap_or_else(|| batch.item_id.to_string());
                        if !items.contains(&name) {
                            items.push(name);
                        }
                    }
                    Ok(AisleOccupancy { aisle, stock, items })
                })
                .collect::<RepoResult<Vec<_>>>()?;

            Ok(RoomOccupancy {
                id: room.id,
                floor: room.floor,
                name: room.name,
                aisles,
            })
        })
        .collect()
}
