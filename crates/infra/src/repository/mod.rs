//! Ledger storage seam and its in-memory implementation.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryRepository;
pub use r#trait::{RepoResult, Repository, RepositoryError};
