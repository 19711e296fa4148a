//! Domain errors

use thiserror::Error;
use uuid::Uuid;

use crate::domain::ParameterScope;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Menu configuration not found: {0}")]
    ConfigurationNotFound(Uuid),

    #[error("Menu item not found: {0}")]
    MenuItemNotFound(Uuid),

    #[error("Menu preference not found for user {user_id}: {menu_id}")]
    PreferenceNotFound { user_id: Uuid, menu_id: String },

    #[error("Parameter not found: {scope}.{group}.{key}")]
    ParameterNotFound { scope: ParameterScope, group: String, key: String },

    #[error("No active menu configuration")]
    NoActiveConfiguration,

    #[error("Menu configuration name already exists: {0}")]
    ConfigurationNameAlreadyExists(String),

    #[error("Parameter already exists: {scope}.{group}.{key}")]
    ParameterAlreadyExists { scope: ParameterScope, group: String, key: String },

    #[error("System menu configuration cannot be modified: {0}")]
    SystemConfigurationProtected(String),

    #[error("The active menu configuration cannot be deleted")]
    ActiveConfigurationProtected,

    #[error("Parameter is read-only: {group}.{key}")]
    ParameterReadonly { group: String, key: String },

    #[error("Parent {parent_id} is not an item of configuration {config_id}")]
    InvalidParent { config_id: Uuid, parent_id: Uuid },

    #[error("Cycle detected in menu tree at item {0}")]
    MenuTreeCycle(Uuid),

    #[error("Version conflict on preference {menu_id}: expected {expected}")]
    VersionConflict { menu_id: String, expected: i32 },

    #[error("Malformed preference payload: {0}")]
    MalformedPreferencePayload(String),

    #[error("Invalid value for parameter {group}.{key}: {reason}")]
    InvalidParameterValue { group: String, key: String, reason: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DomainError::ConfigurationNotFound(_)
                | DomainError::MenuItemNotFound(_)
                | DomainError::PreferenceNotFound { .. }
                | DomainError::ParameterNotFound { .. }
                | DomainError::NoActiveConfiguration
        )
    }

    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            DomainError::ConfigurationNameAlreadyExists(_)
                | DomainError::ParameterAlreadyExists { .. }
                | DomainError::VersionConflict { .. }
        )
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DomainError::ValidationError(errors.to_string())
    }
}
