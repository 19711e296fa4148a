// ============================================================================
// TopSteel Core - Menu Configuration Entity
// File: crates/topsteel-core/src/domain/menu_configuration.rs
// Description: Named menu tree, exactly one of which is active at a time
// ============================================================================

use serde::{Deserialize, Serialize};
use topsteel_shared::AuditFields;
use uuid::Uuid;
use validator::Validate;

/// Menu configuration entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MenuConfiguration {
    pub id: Uuid,

    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: String,

    #[validate(length(max = 1000, message = "Description too long"))]
    pub description: Option<String>,

    pub is_active: bool,
    pub is_system: bool,

    #[serde(flatten)]
    pub audit: AuditFields,
}

impl MenuConfiguration {
    /// Create a custom (administrator-defined) configuration
    pub fn new(
        name: String,
        description: Option<String>,
        created_by: Option<Uuid>,
    ) -> Result<Self, validator::ValidationErrors> {
        let config = Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            description: description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            is_active: false,
            is_system: false,
            audit: AuditFields::created_by(created_by),
        };

        config.validate()?;
        Ok(config)
    }

    /// Create a built-in configuration
    pub fn new_system(
        name: String,
        description: Option<String>,
    ) -> Result<Self, validator::ValidationErrors> {
        let mut config = Self::new(name, description, None)?;
        config.is_system = true;
        Ok(config)
    }

    pub fn is_deleted(&self) -> bool {
        self.audit.is_deleted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_trims_and_validates() {
        let config = MenuConfiguration::new(
            "  Production  ".to_string(),
            Some("   ".to_string()),
            None,
        )
        .unwrap();

        assert_eq!(config.name, "Production");
        assert_eq!(config.description, None);
        assert!(!config.is_active);
        assert!(!config.is_system);
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(MenuConfiguration::new("   ".to_string(), None, None).is_err());
    }

    #[test]
    fn test_system_flag() {
        let config = MenuConfiguration::new_system("Default".to_string(), None).unwrap();
        assert!(config.is_system);
    }
}
