//! User directory: accounts and login.

use std::sync::Arc;

use tracing::{info, warn};

use stockledger_auth::{NewUser, User, UserPatch};
use stockledger_core::{DomainError, UserId};
use stockledger_inventory::{AuditCategory, AuditEntry};

use crate::error::LedgerResult;
use crate::gate::CommitGate;
use crate::repository::Repository;

/// Warehouse accounts. Usernames are unique.
///
/// Identity only: callers decide who may do what and pass the acting user id
/// into ledger operations.
#[derive(Debug)]
pub struct UserDirectory<R> {
    repo: Arc<R>,
    gate: CommitGate,
    actor: UserId,
}

impl<R: Repository> UserDirectory<R> {
    pub fn new(repo: Arc<R>, gate: CommitGate, actor: UserId) -> Self {
        Self { repo, gate, actor }
    }

    pub fn list(&self) -> LedgerResult<Vec<User>> {
        let _read = self.gate.read()?;
        Ok(self.repo.list_users()?)
    }

    pub fn create(&self, draft: NewUser) -> LedgerResult<User> {
        let user = draft.into_user()?;

        let _write = self.gate.write()?;
        if self.repo.find_user_by_username(&user.username)?.is_some() {
            return Err(DomainError::conflict(format!("username '{}' is taken", user.username)).into());
        }
        self.repo.insert_user(user.clone())?;
        self.repo.append_audit(AuditEntry::new(
            self.actor.clone(),
            format!("create-user:{}", user.username),
            AuditCategory::UserManagement,
        ))?;

        info!(user_id = %user.id, username = %user.username, "user created");
        Ok(user)
    }

    pub fn update(&self, id: &UserId, patch: UserPatch) -> LedgerResult<User> {
        let _write = self.gate.write()?;

        let current = self.repo.get_user(id)?.ok_or_else(DomainError::not_found)?;
        let updated = patch.apply_to(&current)?;
        if updated.username != current.username {
            if let Some(other) = self.repo.find_user_by_username(&updated.username)? {
                if other.id != updated.id {
                    return Err(
                        DomainError::conflict(format!("username '{}' is taken", updated.username)).into()
                    );
                }
            }
        }
        if !self.repo.update_user(updated.clone())? {
            return Err(DomainError::not_found().into());
        }
        self.repo.append_audit(AuditEntry::new(
            self.actor.clone(),
            format!("update-user:{id}"),
            AuditCategory::UserManagement,
        ))?;

        info!(user_id = %id, "user updated");
        Ok(updated)
    }

    /// Look up an active user by username and record the login.
    ///
    /// Unknown and inactive users both yield `None`.
    pub fn login(&self, username: &str) -> LedgerResult<Option<User>> {
        let _write = self.gate.write()?;

        let user = match self.repo.find_user_by_username(username)? {
            Some(user) if user.active => user,
            _ => {
                warn!(username, "login rejected");
                return Ok(None);
            }
        };
        self.repo
            .append_audit(AuditEntry::new(user.id.clone(), "login", AuditCategory::Login))?;

        info!(user_id = %user.id, "user logged in");
        Ok(Some(user))
    }
}
