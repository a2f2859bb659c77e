//! Item master data.

use std::sync::Arc;

use tracing::info;

use stockledger_core::{DomainError, ItemId, UserId};
use stockledger_inventory::{AuditCategory, AuditEntry, Item, ItemPatch, NewItem, item_id_candidate};

use crate::error::LedgerResult;
use crate::gate::CommitGate;
use crate::repository::Repository;

/// Item CRUD. Every successful mutation appends one audit entry.
#[derive(Debug)]
pub struct Catalog<R> {
    repo: Arc<R>,
    gate: CommitGate,
    actor: UserId,
}

impl<R: Repository> Catalog<R> {
    pub fn new(repo: Arc<R>, gate: CommitGate, actor: UserId) -> Self {
        Self { repo, gate, actor }
    }

    /// All items in insertion order.
    pub fn list(&self) -> LedgerResult<Vec<Item>> {
        let _read = self.gate.read()?;
        Ok(self.repo.list_items()?)
    }

    /// Create an item with a generated `PRE-NNN` id.
    ///
    /// The sequence starts at `item count + 1`; after deletions that id may
    /// still be taken, in which case the next free sequence number is used.
    pub fn create(&self, draft: NewItem) -> LedgerResult<Item> {
        let _write = self.gate.write()?;

        let existing = self.repo.list_items()?;
        let mut seq = existing.len() + 1;
        let mut id = item_id_candidate(&draft.name, seq);
        while existing.iter().any(|i| i.id == id) {
            seq += 1;
            id = item_id_candidate(&draft.name, seq);
        }

        let item = draft.into_item(id)?;
        self.repo.insert_item(item.clone())?;
        self.audit(format!("create-item:{}", item.id))?;

        info!(item_id = %item.id, "item created");
        Ok(item)
    }

    pub fn update(&self, id: &ItemId, patch: ItemPatch) -> LedgerResult<Item> {
        let _write = self.gate.write()?;

        let current = self.repo.get_item(id)?.ok_or_else(DomainError::not_found)?;
        let updated = patch.apply_to(&current)?;
        if !self.repo.update_item(updated.clone())? {
            return Err(DomainError::not_found().into());
        }
        self.audit(format!("update-item:{id}"))?;

        info!(item_id = %id, "item updated");
        Ok(updated)
    }

    /// Remove an item. Batches referencing it are kept.
    pub fn delete(&self, id: &ItemId) -> LedgerResult<bool> {
        let _write = self.gate.write()?;

        if !self.repo.delete_item(id)? {
            return Ok(false);
        }
        self.audit(format!("delete-item:{id}"))?;

        info!(item_id = %id, "item deleted");
        Ok(true)
    }

    fn audit(&self, action: String) -> LedgerResult<()> {
        self.repo
            .append_audit(AuditEntry::new(self.actor.clone(), action, AuditCategory::Item))?;
        Ok(())
    }
}
