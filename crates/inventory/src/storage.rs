//! Storage structure: rooms and their aisles.

use serde::{Deserialize, Serialize};

use stockledger_core::{AisleId, Entity, LocationCode, RoomId};

/// One aisle slot. `label` is the warehouse-wide unique location code that
/// batches refer to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aisle {
    pub id: AisleId,
    pub label: LocationCode,
    pub floor: u32,
    pub room: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frozen_only: Option<bool>,
}

/// A room on one floor, holding an ordered list of aisles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: RoomId,
    pub floor: u32,
    pub name: String,
    pub aisles: Vec<Aisle>,
}

impl Entity for Room {
    type Id = RoomId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Room {
    pub fn has_label(&self, label: &LocationCode) -> bool {
        self.aisles.iter().any(|a| &a.label == label)
    }
}
