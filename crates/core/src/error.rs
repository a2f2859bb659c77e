//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// missing targets, uniqueness conflicts). Storage failures belong to the
/// repository layer.
///
/// Movement requests are deliberately lenient: entries for unknown items and
/// under-fulfilled shipments are not errors. `NotFound` is only raised by
/// targeted mutations (update/delete paths).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. non-positive dimensions or quantities).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier or location code was malformed.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A targeted entity (item, user, room, aisle) does not exist.
    #[error("not found")]
    NotFound,

    /// A uniqueness rule was violated (duplicate username, aisle label, ...).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
