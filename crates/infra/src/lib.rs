//! Ledger services: storage seam, allocation engine, projections, change feed
//! and the warehouse facade that wires them together.

pub mod catalog;
pub mod config;
pub mod error;
pub mod gate;
pub mod ledger;
pub mod notifier;
pub mod projections;
pub mod repository;
pub mod seed;
pub mod storage;
pub mod users;
pub mod warehouse;

mod integration_tests;

pub use config::{ConfigError, LedgerConfig};
pub use error::{LedgerError, LedgerResult};
pub use ledger::AllocationEngine;
pub use notifier::{PublishSlot, StockNotification, StockNotifier};
pub use projections::{AisleOccupancy, Dashboard, OutboundTotal, RoomOccupancy, StockRow};
pub use repository::{InMemoryRepository, RepoResult, Repository, RepositoryError};
pub use storage::{LocationDirectory, StorageManager};
pub use warehouse::Warehouse;
