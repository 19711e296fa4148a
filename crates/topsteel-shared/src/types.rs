//! Common types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type EntityId = Uuid;

pub fn new_id() -> EntityId {
    Uuid::new_v4()
}

/// Audit columns shared by every persisted entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditFields {
    pub created_at: DateTime<Utc>,
    pub created_by: Option<EntityId>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<EntityId>,
    pub removed_at: Option<DateTime<Utc>>,
    pub removed_by: Option<EntityId>,
}

impl AuditFields {
    pub fn created_by(created_by: Option<EntityId>) -> Self {
        Self {
            created_by,
            ..Self::default()
        }
    }

    pub fn touch(&mut self, modified_by: Option<EntityId>) {
        self.modified_at = Some(Utc::now());
        self.modified_by = modified_by;
    }

    pub fn soft_delete(&mut self, removed_by: Option<EntityId>) {
        self.removed_at = Some(Utc::now());
        self.removed_by = removed_by;
    }

    pub fn is_deleted(&self) -> bool {
        self.removed_at.is_some()
    }
}

impl Default for AuditFields {
    fn default() -> Self {
        Self {
            created_at: Utc::now(),
            created_by: None,
            modified_at: None,
            modified_by: None,
            removed_at: None,
            removed_by: None,
        }
    }
}
