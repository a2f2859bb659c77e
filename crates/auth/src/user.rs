//! Warehouse user records.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stockledger_core::{DomainError, DomainResult, Entity, UserId};

use crate::Role;

/// A warehouse operator.
///
/// # Invariants
/// - `username` is unique across the directory (enforced by the directory).
/// - `id` never changes after creation.
/// - Only `active` users can log in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub username: String,
    pub role: Role,
    pub active: bool,
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input for creating a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl NewUser {
    /// Validate the draft and assign a fresh identifier.
    pub fn into_user(self) -> DomainResult<User> {
        let user = User {
            id: UserId::new(Uuid::now_v7().to_string()),
            name: self.name,
            username: self.username,
            role: self.role,
            active: self.active,
        };
        validate(&user)?;
        Ok(user)
    }
}

/// Partial update; only `Some` fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub name: Option<String>,
    pub username: Option<String>,
    pub role: Option<Role>,
    pub active: Option<bool>,
}

impl UserPatch {
    /// Merge into `current`, keeping its id. The merged user is re-validated.
    pub fn apply_to(self, current: &User) -> DomainResult<User> {
        let merged = User {
            id: current.id.clone(),
            name: self.name.unwrap_or_else(|| current.name.clone()),
            username: self.username.unwrap_or_else(|| current.username.clone()),
            role: self.role.unwrap_or(current.role),
            active: self.active.unwrap_or(current.active),
        };
        validate(&merged)?;
        Ok(merged)
    }
}

fn validate(user: &User) -> DomainResult<()> {
    if user.name.trim().is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    if user.username.trim().is_empty() {
        return Err(DomainError::validation("username cannot be empty"));
    }
    if user.username.chars().any(char::is_whitespace) {
        return Err(DomainError::validation("username cannot contain whitespace"));
    }
    Ok(())
}
