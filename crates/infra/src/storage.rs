//! Storage layout management: rooms, aisles and location lookup.

use std::sync::Arc;

use tracing::info;

use stockledger_core::{AisleId, DomainError, LocationCode, RoomId, UserId, location};
use stockledger_inventory::{Aisle, AuditCategory, AuditEntry, Item, Room};

use crate::error::LedgerResult;
use crate::gate::CommitGate;
use crate::repository::{RepoResult, Repository};

/// Aisles created together with a new room.
const AISLES_PER_NEW_ROOM: u32 = 2;

/// Location lookups the allocation engine consults for inbound stock.
///
/// Implementations must not take the commit gate: they are called from
/// inside a write-gated section.
pub trait LocationDirectory: Send + Sync {
    /// The item's preferred aisle, if it has one.
    fn resolve_default_location(&self, item: &Item) -> RepoResult<Option<LocationCode>>;

    /// Warehouse-wide fallback: the first aisle of the first room.
    fn fallback_location(&self) -> RepoResult<Option<LocationCode>>;
}

impl<T> LocationDirectory for Arc<T>
where
    T: LocationDirectory + ?Sized,
{
    fn resolve_default_location(&self, item: &Item) -> RepoResult<Option<LocationCode>> {
        (**self).resolve_default_location(item)
    }

    fn fallback_location(&self) -> RepoResult<Option<LocationCode>> {
        (**self).fallback_location()
    }
}

/// Rooms and aisles of the warehouse.
///
/// Aisle labels are unique warehouse-wide; every insert checks this.
#[derive(Debug)]
pub struct StorageManager<R> {
    repo: Arc<R>,
    gate: CommitGate,
    actor: UserId,
}

impl<R: Repository> StorageManager<R> {
    pub fn new(repo: Arc<R>, gate: CommitGate, actor: UserId) -> Self {
        Self { repo, gate, actor }
    }

    pub fn rooms(&self) -> LedgerResult<Vec<Room>> {
        let _read = self.gate.read()?;
        Ok(self.repo.list_rooms()?)
    }

    /// Add a room on `floor` with two aisles labelled after its position.
    pub fn add_room(&self, name: &str, floor: u32) -> LedgerResult<Room> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("room name cannot be empty").into());
        }

        let _write = self.gate.write()?;
        let rooms = self.repo.list_rooms()?;
        let room_index = rooms.len() as u32;

        let aisles: Vec<Aisle> = (0..AISLES_PER_NEW_ROOM)
            .map(|seq| Aisle {
                id: AisleId::new(),
                label: location::name(floor, room_index, seq),
                floor,
                room: room_index,
                frozen_only: None,
            })
            .collect();
        for aisle in &aisles {
            ensure_label_free(&rooms, &aisle.label)?;
        }

        let room = Room {
            id: RoomId::new(),
            floor,
            name: name.to_string(),
            aisles,
        };
        self.repo.insert_room(room.clone())?;
        self.repo.append_audit(AuditEntry::new(
            self.actor.clone(),
            format!("add-room:{}", room.name),
            AuditCategory::Storage,
        ))?;

        info!(room_id = %room.id, floor, room_index, "room added");
        Ok(room)
    }

    /// Append an aisle to `room_id`, skipping sequence numbers whose label is
    /// already taken anywhere in the warehouse.
    pub fn add_aisle(&self, room_id: &RoomId, frozen_only: Option<bool>) -> LedgerResult<Aisle> {
        let _write = self.gate.write()?;
        let rooms = self.repo.list_rooms()?;
        let (room_index, room) = rooms
            .iter()
            .enumerate()
            .find(|(_, r)| &r.id == room_id)
            .ok_or_else(DomainError::not_found)?;
        let room_index = room_index as u32;

        let mut seq = room.aisles.len() as u32;
        let label = loop {
            let candidate = location::name(room.floor, room_index, seq);
            if ensure_label_free(&rooms, &candidate).is_ok() {
                break candidate;
            }
            seq += 1;
        };

        let aisle = Aisle {
            id: AisleId::new(),
            label,
            floor: room.floor,
            room: room_index,
            frozen_only,
        };
        let mut updated = room.clone();
        updated.aisles.push(aisle.clone());
        if !self.repo.update_room(updated)? {
            return Err(DomainError::not_found().into());
        }
        self.repo.append_audit(AuditEntry::new(
            self.actor.clone(),
            format!("add-aisle:{}", aisle.label),
            AuditCategory::Storage,
        ))?;

        info!(room_id = %room_id, label = %aisle.label, "aisle added");
        Ok(aisle)
    }

    /// Remove an aisle. `NotFound` if the room does not exist, `false` if the
    /// room has no such aisle. Batches stored there keep their location code.
    pub fn remove_aisle(&self, room_id: &RoomId, aisle_id: &AisleId) -> LedgerResult<bool> {
        let _write = self.gate.write()?;
        let mut room = self.repo.get_room(room_id)?.ok_or_else(DomainError::not_found)?;

        let before = room.aisles.len();
        room.aisles.retain(|a| &a.id != aisle_id);
        if room.aisles.len() == before {
            return Ok(false);
        }
        self.repo.update_room(room)?;
        self.repo.append_audit(AuditEntry::new(
            self.actor.clone(),
            format!("remove-aisle:{aisle_id}"),
            AuditCategory::Storage,
        ))?;

        info!(room_id = %room_id, aisle_id = %aisle_id, "aisle removed");
        Ok(true)
    }
}

impl<R: Repository> LocationDirectory for StorageManager<R> {
    fn resolve_default_location(&self, item: &Item) -> RepoResult<Option<LocationCode>> {
        Ok(item.default_aisle_id.clone())
    }

    fn fallback_location(&self) -> RepoResult<Option<LocationCode>> {
        Ok(self
            .repo
            .list_rooms()?
            .into_iter()
            .next()
            .and_then(|room| room.aisles.into_iter().next())
            .map(|aisle| aisle.label))
    }
}

fn ensure_label_free(rooms: &[Room], label: &LocationCode) -> Result<(), DomainError> {
    if rooms.iter().any(|r| r.has_label(label)) {
        return Err(DomainError::conflict(format!("aisle label {label} already in use")));
    }
    Ok(())
}
