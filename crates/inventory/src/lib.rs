//! Inventory domain module.
//!
//! This crate contains the warehouse's master data, ledger records and the
//! allocation rules (location choice, FEFO consumption), implemented purely as
//! deterministic domain logic (no IO, no locking, no storage).

pub mod allocation;
pub mod audit;
pub mod batch;
pub mod item;
pub mod movement;
pub mod storage;

pub use allocation::{Draw, LocationSource, assign_location, next_batch_id, plan_fefo};
pub use audit::{AuditCategory, AuditEntry};
pub use batch::Batch;
pub use item::{Dimensions, Item, ItemPatch, NewItem, item_id_candidate};
pub use movement::{InboundEntry, MovementKind, OutboundEntry, StockChange, Transaction, validate_quantities};
pub use storage::{Aisle, Room};
