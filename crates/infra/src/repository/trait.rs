use thiserror::Error;

use stockledger_auth::User;
use stockledger_core::{BatchId, ItemId, LocationCode, RoomId, UserId};
use stockledger_inventory::{AuditEntry, Batch, Item, Room, StockChange, Transaction};

pub type RepoResult<T> = Result<T, RepositoryError>;

/// Repository operation error.
///
/// These are **infrastructure errors** (storage availability, integrity of
/// keyed rows) as opposed to domain errors (validation, not-found on a
/// targeted mutation).
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A row with the same primary key already exists.
    #[error("duplicate key: {0}")]
    Duplicate(String),

    /// A row expected by the ledger is missing (e.g. batch vanished mid-call).
    #[error("missing row: {0}")]
    MissingRow(String),

    /// The backing store could not be reached or refused the write.
    #[error("repository unavailable: {0}")]
    Unavailable(String),

    /// An internal lock was poisoned by a panicking writer.
    #[error("repository lock poisoned")]
    Poisoned,
}

/// Storage seam for the ledger.
///
/// Four logical tables (items, batches, transactions + stock changes, audit
/// log) plus the storage layout and user directory consulted by the core.
///
/// ## Ordering
///
/// - `list_*` methods return rows in insertion order.
/// - `recent_*` methods return the newest rows first.
/// - `batches_for_item` returns that item's batches in insertion order; this
///   is the scan FEFO planning sorts by `(expires_at, insertion order)`.
///
/// ## Atomicity
///
/// Each method is atomic on its own. Multi-step consistency (one `receive` or
/// `ship` call) is provided by the ledger's commit gate, not by the
/// repository. A durable implementation should map one gate-held section to
/// one storage transaction.
pub trait Repository: Send + Sync {
    // Items
    fn list_items(&self) -> RepoResult<Vec<Item>>;
    fn get_item(&self, id: &ItemId) -> RepoResult<Option<Item>>;
    fn item_count(&self) -> RepoResult<usize>;
    fn insert_item(&self, item: Item) -> RepoResult<()>;
    /// Replace an existing item; `false` if no row has that id.
    fn update_item(&self, item: Item) -> RepoResult<bool>;
    fn delete_item(&self, id: &ItemId) -> RepoResult<bool>;

    // Batches
    fn list_batches(&self) -> RepoResult<Vec<Batch>>;
    fn batches_for_item(&self, item_id: &ItemId) -> RepoResult<Vec<Batch>>;
    fn batches_in_aisle(&self, aisle: &LocationCode) -> RepoResult<Vec<Batch>>;
    fn batch_count(&self) -> RepoResult<usize>;
    fn insert_batch(&self, batch: Batch) -> RepoResult<()>;
    fn set_batch_quantity(&self, id: &BatchId, quantity: u64) -> RepoResult<()>;

    // Movements
    fn append_transaction(&self, tx: Transaction) -> RepoResult<()>;
    fn list_transactions(&self) -> RepoResult<Vec<Transaction>>;
    fn append_stock_change(&self, change: StockChange) -> RepoResult<()>;
    fn recent_stock_changes(&self, limit: usize) -> RepoResult<Vec<StockChange>>;

    // Audit
    fn append_audit(&self, entry: AuditEntry) -> RepoResult<()>;
    fn recent_audit(&self, limit: usize) -> RepoResult<Vec<AuditEntry>>;

    // Storage layout
    fn list_rooms(&self) -> RepoResult<Vec<Room>>;
    fn get_room(&self, id: &RoomId) -> RepoResult<Option<Room>>;
    fn insert_room(&self, room: Room) -> RepoResult<()>;
    fn update_room(&self, room: Room) -> RepoResult<bool>;

    // Users
    fn list_users(&self) -> RepoResult<Vec<User>>;
    fn get_user(&self, id: &UserId) -> RepoResult<Option<User>>;
    fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>>;
    fn insert_user(&self, user: User) -> RepoResult<()>;
    fn update_user(&self, user: User) -> RepoResult<bool>;
}
