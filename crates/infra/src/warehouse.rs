//! Warehouse facade: one entry point wiring catalog, storage, users, the
//! allocation engine, projections and the change notifier around a shared
//! repository and commit gate.

use std::sync::Arc;
use std::thread::JoinHandle;

use chrono::{DateTime, Utc};
use tracing::info;

use stockledger_auth::{NewUser, User, UserPatch};
use stockledger_core::{AisleId, ItemId, RoomId, UserId};
use stockledger_events::Subscription;
use stockledger_inventory::{
    Aisle, AuditEntry, InboundEntry, Item, ItemPatch, NewItem, OutboundEntry, Room, StockChange, Transaction,
};

use crate::catalog::Catalog;
use crate::config::LedgerConfig;
use crate::error::LedgerResult;
use crate::gate::CommitGate;
use crate::ledger::AllocationEngine;
use crate::notifier::{StockNotification, StockNotifier};
use crate::projections::{Dashboard, Projections, RoomOccupancy, StockRow};
use crate::repository::{InMemoryRepository, Repository};
use crate::seed::load_demo_dataset;
use crate::storage::StorageManager;
use crate::users::UserDirectory;

pub struct Warehouse<R: Repository> {
    config: LedgerConfig,
    catalog: Catalog<R>,
    storage: Arc<StorageManager<R>>,
    users: UserDirectory<R>,
    engine: AllocationEngine<R, Arc<StorageManager<R>>>,
    projections: Projections<R>,
    notifier: Arc<StockNotifier>,
}

impl Warehouse<InMemoryRepository> {
    /// Warehouse over fresh in-memory tables.
    pub fn in_memory(config: LedgerConfig) -> LedgerResult<Self> {
        Self::new(Arc::new(InMemoryRepository::new()), config)
    }
}

impl<R: Repository> Warehouse<R> {
    /// Wire every component around `repo`. Loads the demo dataset when
    /// `config.seed_demo` is set and the repository is empty.
    pub fn new(repo: Arc<R>, config: LedgerConfig) -> LedgerResult<Self> {
        if config.seed_demo {
            load_demo_dataset(repo.as_ref(), Utc::now())?;
        }

        let gate = CommitGate::new();
        let actor = config.system_actor.clone();
        let notifier = Arc::new(StockNotifier::new(config.notify_capacity));
        let storage = Arc::new(StorageManager::new(repo.clone(), gate.clone(), actor.clone()));

        let warehouse = Self {
            catalog: Catalog::new(repo.clone(), gate.clone(), actor.clone()),
            users: UserDirectory::new(repo.clone(), gate.clone(), actor),
            engine: AllocationEngine::new(
                repo.clone(),
                storage.clone(),
                gate.clone(),
                notifier.clone(),
                config.fallback_location.clone(),
            ),
            projections: Projections::new(repo, gate, config.expiry_window_days, config.top_outbound_limit),
            storage,
            notifier,
            config,
        };
        info!(fallback_location = %warehouse.config.fallback_location, "warehouse ready");
        Ok(warehouse)
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // Catalog

    pub fn list_items(&self) -> LedgerResult<Vec<Item>> {
        self.catalog.list()
    }

    pub fn create_item(&self, draft: NewItem) -> LedgerResult<Item> {
        self.catalog.create(draft)
    }

    pub fn update_item(&self, id: &ItemId, patch: ItemPatch) -> LedgerResult<Item> {
        self.catalog.update(id, patch)
    }

    pub fn delete_item(&self, id: &ItemId) -> LedgerResult<bool> {
        self.catalog.delete(id)
    }

    // Movements

    pub fn receive(&self, entries: &[InboundEntry], user_id: &UserId) -> LedgerResult<Vec<Transaction>> {
        self.engine.receive(entries, user_id)
    }

    pub fn ship(&self, entries: &[OutboundEntry], user_id: &UserId) -> LedgerResult<Vec<Transaction>> {
        self.engine.ship(entries, user_id)
    }

    // Projections

    pub fn stock_by_item(&self) -> LedgerResult<Vec<StockRow>> {
        self.projections.stock_by_item()
    }

    pub fn aisle_occupancy(&self) -> LedgerResult<Vec<RoomOccupancy>> {
        self.projections.aisle_occupancy()
    }

    pub fn dashboard(&self) -> LedgerResult<Dashboard> {
        self.dashboard_at(Utc::now())
    }

    pub fn dashboard_at(&self, now: DateTime<Utc>) -> LedgerResult<Dashboard> {
        self.projections.dashboard(now)
    }

    /// Newest first; `None` uses the configured default limit.
    pub fn recent_stock_changes(&self, limit: Option<usize>) -> LedgerResult<Vec<StockChange>> {
        self.projections
            .recent_stock_changes(limit.unwrap_or(self.config.recent_limit))
    }

    /// Newest first; `None` uses the configured default limit.
    pub fn recent_audit(&self, limit: Option<usize>) -> LedgerResult<Vec<AuditEntry>> {
        self.projections.recent_audit(limit.unwrap_or(self.config.recent_limit))
    }

    // Change feed

    pub fn subscribe_to_stock_changes<F>(&self, handler: F) -> LedgerResult<JoinHandle<()>>
    where
        F: FnMut(StockNotification) + Send + 'static,
    {
        self.notifier.subscribe(handler)
    }

    pub fn subscribe_channel(&self) -> Subscription<StockNotification> {
        self.notifier.subscribe_channel()
    }

    // Storage layout

    pub fn rooms(&self) -> LedgerResult<Vec<Room>> {
        self.storage.rooms()
    }

    pub fn add_room(&self, name: &str, floor: u32) -> LedgerResult<Room> {
        self.storage.add_room(name, floor)
    }

    pub fn add_aisle(&self, room_id: &RoomId, frozen_only: Option<bool>) -> LedgerResult<Aisle> {
        self.storage.add_aisle(room_id, frozen_only)
    }

    pub fn remove_aisle(&self, room_id: &RoomId, aisle_id: &AisleId) -> LedgerResult<bool> {
        self.storage.remove_aisle(room_id, aisle_id)
    }

    // Users

    pub fn list_users(&self) -> LedgerResult<Vec<User>> {
        self.users.list()
    }

    pub fn create_user(&self, draft: NewUser) -> LedgerResult<User> {
        self.users.create(draft)
    }

    pub fn update_user(&self, id: &UserId, patch: UserPatch) -> LedgerResult<User> {
        self.users.update(id, patch)
    }

    pub fn login(&self, username: &str) -> LedgerResult<Option<User>> {
        self.users.login(username)
    }
}

impl<R: Repository> std::fmt::Debug for Warehouse<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Warehouse").field("config", &self.config).finish_non_exhaustive()
    }
}
