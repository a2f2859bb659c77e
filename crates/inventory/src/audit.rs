//! Append-only audit trail entries.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockledger_core::{AuditId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuditCategory {
    Login,
    Logout,
    Transaction,
    UserManagement,
    Storage,
    Item,
}

/// One state-changing action. Never updated or removed once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: AuditId,
    pub user_id: UserId,
    /// Free-form label including the affected entity id, e.g. `create-item:FRE-004`.
    pub action: String,
    pub category: AuditCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<BTreeMap<String, String>>,
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(user_id: UserId, action: impl Into<String>, category: AuditCategory) -> Self {
        Self {
            id: AuditId::new(),
            user_id,
            action: action.into(),
            category,
            meta: None,
            created_at: Utc::now(),
        }
    }

    /// Attach a side-data key/value pair.
    pub fn with_meta(mut self, key: &str, value: impl ToString) -> Self {
        self.meta
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}
