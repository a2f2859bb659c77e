//! `stockledger-auth`: warehouse operators and their roles.
//!
//! Identity only: token issuance and authorization decisions belong to the
//! calling layer. The ledger receives a `UserId` per call and records it.

pub mod roles;
pub mod user;

pub use roles::Role;
pub use user::{NewUser, User, UserPatch};
