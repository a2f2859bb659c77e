//! Demo dataset: two single-room floors, three items, three batches and two
//! users.

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use stockledger_auth::{Role, User};
use stockledger_core::{AisleId, BatchId, ItemId, RoomId, UserId, location};
use stockledger_inventory::{Aisle, Batch, Dimensions, Item, Room};

use crate::repository::{RepoResult, Repository};

const FLOORS: u32 = 2;
const AISLES_PER_ROOM: u32 = 6;

/// Load the demo dataset into an empty repository.
///
/// Rows are written directly, without audit entries. Returns `false` and
/// leaves the repository untouched if it already holds items or rooms.
pub fn load_demo_dataset<R>(repo: &R, now: DateTime<Utc>) -> RepoResult<bool>
where
    R: Repository + ?Sized,
{
    if repo.item_count()? > 0 || !repo.list_rooms()?.is_empty() {
        info!("repository not empty; demo dataset skipped");
        return Ok(false);
    }

    for floor in 0..FLOORS {
        repo.insert_room(demo_room(floor))?;
    }

    let aisle = |floor: u32, seq: u32| location::name(floor, 0, seq);

    for item in [
        Item {
            id: ItemId::new("SKU-001"),
            name: "Frozen Vaccine".to_string(),
            description: Some("Temperature controlled vaccine".to_string()),
            dimensions: Dimensions { width: 0.2, height: 0.1, length: 0.2 },
            weight_grams: 450,
            frozen: true,
            expirable: true,
            default_aisle_id: Some(aisle(0, 0)),
        },
        Item {
            id: ItemId::new("SKU-002"),
            name: "Dried Beans".to_string(),
            description: Some("Shelf-stable dried beans".to_string()),
            dimensions: Dimensions { width: 0.4, height: 0.3, length: 0.6 },
            weight_grams: 1000,
            frozen: false,
            expirable: false,
            default_aisle_id: Some(aisle(0, 2)),
        },
        Item {
            id: ItemId::new("SKU-003"),
            name: "Fresh Juice".to_string(),
            description: Some("Cold pressed juice pack".to_string()),
            dimensions: Dimensions { width: 0.25, height: 0.25, length: 0.4 },
            weight_grams: 750,
            frozen: false,
            expirable: true,
            default_aisle_id: Some(aisle(0, 3)),
        },
    ] {
        repo.insert_item(item)?;
    }

    for (id, item_id, days, quantity, aisle_id) in [
        ("BATCH-1001", "SKU-001", 30, 120, aisle(0, 0)),
        ("BATCH-1002", "SKU-003", 15, 60, aisle(0, 3)),
        ("BATCH-1003", "SKU-003", -5, 8, aisle(1, 1)),
    ] {
        repo.insert_batch(Batch {
            id: BatchId::new(id),
            item_id: ItemId::new(item_id),
            expires_at: now + Duration::days(days),
            quantity,
            aisle_id,
        })?;
    }

    for (id, name, role) in [("admin", "Admin", Role::Admin), ("operator", "Operator", Role::User)] {
        repo.insert_user(User {
            id: UserId::new(id),
            name: name.to_string(),
            username: id.to_string(),
            role,
            active: true,
        })?;
    }

    info!("demo dataset loaded");
    Ok(true)
}

fn demo_room(floor: u32) -> Room {
    let aisles = (0..AISLES_PER_ROOM)
        .map(|seq| Aisle {
            id: AisleId::new(),
            label: location::name(floor, 0, seq),
            floor,
            room: 0,
            frozen_only: Some(seq % 3 == 0),
        })
        .collect();
    Room {
        id: RoomId::new(),
        floor,
        name: format!("Room {}", floor + 1),
        aisles,
    }
}
