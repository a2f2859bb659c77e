//! `stockledger-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the error model, and the location namer.

pub mod entity;
pub mod error;
pub mod id;
pub mod location;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{AisleId, AuditId, BatchId, ItemId, RoomId, StockChangeId, TransactionId, UserId};
pub use location::LocationCode;
