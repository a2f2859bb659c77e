use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use stockledger_auth::User;
use stockledger_core::{BatchId, Entity, ItemId, LocationCode, RoomId, UserId};
use stockledger_inventory::{AuditEntry, Batch, Item, Room, StockChange, Transaction};

use super::r#trait::{RepoResult, Repository, RepositoryError};

#[derive(Debug, Default)]
struct Tables {
    items: Vec<Item>,

    batches: Vec<Batch>,
    batch_rows: HashMap<BatchId, usize>,
    // Secondary indexes: row positions in insertion order.
    batches_by_item: HashMap<ItemId, Vec<usize>>,
    batches_by_aisle: HashMap<LocationCode, Vec<usize>>,

    transactions: Vec<Transaction>,
    stock_changes: Vec<StockChange>,
    audit: Vec<AuditEntry>,

    rooms: Vec<Room>,
    users: Vec<User>,
}

impl Tables {
    fn collect_rows<'a>(&'a self, rows: Option<&'a Vec<usize>>) -> Vec<Batch> {
        rows.map(|rows| rows.iter().map(|&row| self.batches[row].clone()).collect())
            .unwrap_or_default()
    }
}

/// In-memory ledger tables.
///
/// Intended for tests, demos and single-process deployments. Not durable.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RepoResult<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| RepositoryError::Poisoned)
    }

    fn write(&self) -> RepoResult<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|_| RepositoryError::Poisoned)
    }
}

fn find_row<'a, E: Entity>(rows: &'a [E], id: &E::Id) -> Option<&'a E> {
    rows.iter().find(|row| row.id() == id)
}

fn insert_row<E: Entity>(rows: &mut Vec<E>, row: E, table: &str) -> RepoResult<()> {
    if find_row(rows, row.id()).is_some() {
        return Err(RepositoryError::Duplicate(format!("{table} {}", row.id())));
    }
    rows.push(row);
    Ok(())
}

/// Replace the row with the same id; `false` if there is none.
fn replace_row<E: Entity>(rows: &mut [E], row: E) -> bool {
    match rows.iter_mut().find(|r| r.id() == row.id()) {
        Some(slot) => {
            *slot = row;
            true
        }
        None => false,
    }
}

fn newest_first<T: Clone>(rows: &[T], limit: usize) -> Vec<T> {
    rows.iter().rev().take(limit).cloned().collect()
}

impl Repository for InMemoryRepository {
    fn list_items(&self) -> RepoResult<Vec<Item>> {
        Ok(self.read()?.items.clone())
    }

    fn get_item(&self, id: &ItemId) -> RepoResult<Option<Item>> {
        Ok(find_row(&self.read()?.items, id).cloned())
    }

    fn item_count(&self) -> RepoResult<usize> {
        Ok(self.read()?.items.len())
    }

    fn insert_item(&self, item: Item) -> RepoResult<()> {
        insert_row(&mut self.write()?.items, item, "item")
    }

    fn update_item(&self, item: Item) -> RepoResult<bool> {
        Ok(replace_row(&mut self.write()?.items, item))
    }

    fn delete_item(&self, id: &ItemId) -> RepoResult<bool> {
        let mut t = self.write()?;
        let before = t.items.len();
        t.items.retain(|i| &i.id != id);
        Ok(t.items.len() != before)
    }

    fn list_batches(&self) -> RepoResult<Vec<Batch>> {
        Ok(self.read()?.batches.clone())
    }

    fn batches_for_item(&self, item_id: &ItemId) -> RepoResult<Vec<Batch>> {
        let t = self.read()?;
        Ok(t.collect_rows(t.batches_by_item.get(item_id)))
    }

    fn batches_in_aisle(&self, aisle: &LocationCode) -> RepoResult<Vec<Batch>> {
        let t = self.read()?;
        Ok(t.collect_rows(t.batches_by_aisle.get(aisle)))
    }

    fn batch_count(&self) -> RepoResult<usize> {
        Ok(self.read()?.batches.len())
    }

    fn insert_batch(&self, batch: Batch) -> RepoResult<()> {
        let mut t = self.write()?;
        if t.batch_rows.contains_key(&batch.id) {
            return Err(RepositoryError::Duplicate(format!("batch {}", batch.id)));
        }
        let row = t.batches.len();
        t.batch_rows.insert(batch.id.clone(), row);
        t.batches_by_item.entry(batch.item_id.clone()).or_default().push(row);
        t.batches_by_aisle.entry(batch.aisle_id.clone()).or_default().push(row);
        t.batches.push(batch);
        Ok(())
    }

    fn set_batch_quantity(&self, id: &BatchId, quantity: u64) -> RepoResult<()> {
        let mut t = self.write()?;
        let row = *t
            .batch_rows
            .get(id)
            .ok_or_else(|| RepositoryError::MissingRow(format!("batch {id}")))?;
        t.batches[row].quantity = quantity;
        Ok(())
    }

    fn append_transaction(&self, tx: Transaction) -> RepoResult<()> {
        self.write()?.transactions.push(tx);
        Ok(())
    }

    fn list_transactions(&self) -> RepoResult<Vec<Transaction>> {
        Ok(self.read()?.transactions.clone())
    }

    fn append_stock_change(&self, change: StockChange) -> RepoResult<()> {
        self.write()?.stock_changes.push(change);
        Ok(())
    }

    fn recent_stock_changes(&self, limit: usize) -> RepoResult<Vec<StockChange>> {
        Ok(newest_first(&self.read()?.stock_changes, limit))
    }

    fn append_audit(&self, entry: AuditEntry) -> RepoResult<()> {
        self.write()?.audit.push(entry);
        Ok(())
    }

    fn recent_audit(&self, limit: usize) -> RepoResult<Vec<AuditEntry>> {
        Ok(newest_first(&self.read()?.audit, limit))
    }

    fn list_rooms(&self) -> RepoResult<Vec<Room>> {
        Ok(self.read()?.rooms.clone())
    }

    fn get_room(&self, id: &RoomId) -> RepoResult<Option<Room>> {
        Ok(find_row(&self.read()?.rooms, id).cloned())
    }

    fn insert_room(&self, room: Room) -> RepoResult<()> {
        insert_row(&mut self.write()?.rooms, room, "room")
    }

    fn update_room(&self, room: Room) -> RepoResult<bool> {
        Ok(replace_row(&mut self.write()?.rooms, room))
    }

    fn list_users(&self) -> RepoResult<Vec<User>> {
        Ok(self.read()?.users.clone())
    }

    fn get_user(&self, id: &UserId) -> RepoResult<Option<User>> {
        Ok(find_row(&self.read()?.users, id).cloned())
    }

    fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        Ok(self.read()?.users.iter().find(|u| u.username == username).cloned())
    }

    fn insert_user(&self, user: User) -> RepoResult<()> {
        insert_row(&mut self.write()?.users, user, "user")
    }

    fn update_user(&self, user: User) -> RepoResult<bool> {
        Ok(replace_row(&mut self.write()?.users, user))
    }
}
