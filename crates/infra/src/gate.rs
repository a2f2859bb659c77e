//! Ledger-wide commit gate.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{LedgerError, LedgerResult};

/// Serialises ledger mutations against each other and against projections.
///
/// Writers (`receive`, `ship`, catalog/storage/user mutations) hold the write
/// side for their whole call; projections hold the read side, so a reader
/// never observes a half-applied call. Clones share the same lock.
#[derive(Debug, Clone, Default)]
pub struct CommitGate {
    lock: Arc<RwLock<()>>,
}

impl CommitGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self) -> LedgerResult<RwLockReadGuard<'_, ()>> {
        self.lock.read().map_err(|_| LedgerError::Poisoned)
    }

    pub fn write(&self) -> LedgerResult<RwLockWriteGuard<'_, ()>> {
        self.lock.write().map_err(|_| LedgerError::Poisoned)
    }
}
