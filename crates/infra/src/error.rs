//! Ledger-level error model.

use thiserror::Error;

use stockledger_core::DomainError;

use crate::repository::RepositoryError;

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Error surfaced by every ledger operation.
///
/// - **Domain**: `NotFound`, `Validation`, `Conflict` on targeted mutations.
/// - **Repository**: storage failures, including a failed audit append, which
///   is fatal to the enclosing operation.
///
/// Under-fulfilled shipments and unknown movement items are not errors.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The commit gate was poisoned by a panic inside a critical section.
    #[error("ledger commit gate poisoned")]
    Poisoned,

    /// A subscriber worker thread could not be started.
    #[error("failed to start subscriber: {0}")]
    Subscriber(#[source] std::io::Error),
}

impl LedgerError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, LedgerError::Domain(DomainError::NotFound))
    }
}
