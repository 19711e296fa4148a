// ============================================================================
// TopSteel Core - Menu Item Entity
// File: crates/topsteel-core/src/domain/menu_item.rs
// Description: Node of a menu configuration tree with role/permission gates
// ============================================================================

use serde::{Deserialize, Serialize};
use topsteel_shared::AuditFields;
use uuid::Uuid;
use validator::Validate;

/// Item kind with its type-specific target.
///
/// Serialized with the single-letter codes used by the menu tables:
/// `M` folder, `P` program, `L` link, `D` data view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MenuItemKind {
    #[serde(rename = "M")]
    Folder,

    #[serde(rename = "P", rename_all = "camelCase")]
    Program { program_id: Option<String> },

    #[serde(rename = "L")]
    Link {
        #[serde(rename = "externalUrl")]
        url: Option<String>,
    },

    #[serde(rename = "D", rename_all = "camelCase")]
    DataView { query_builder_id: Option<String> },
}

impl MenuItemKind {
    pub fn code(&self) -> &'static str {
        match self {
            MenuItemKind::Folder => "M",
            MenuItemKind::Program { .. } => "P",
            MenuItemKind::Link { .. } => "L",
            MenuItemKind::DataView { .. } => "D",
        }
    }

    /// Rebuild a kind from its code and the stored pointer columns.
    /// Pointers that do not belong to the kind are ignored.
    pub fn from_parts(
        code: &str,
        program_id: Option<String>,
        external_url: Option<String>,
        query_builder_id: Option<String>,
    ) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "M" => Some(MenuItemKind::Folder),
            "P" => Some(MenuItemKind::Program { program_id }),
            "L" => Some(MenuItemKind::Link { url: external_url }),
            "D" => Some(MenuItemKind::DataView { query_builder_id }),
            _ => None,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, MenuItemKind::Folder)
    }

    pub fn program_id(&self) -> Option<&str> {
        match self {
            MenuItemKind::Program { program_id } => program_id.as_deref(),
            _ => None,
        }
    }

    pub fn external_url(&self) -> Option<&str> {
        match self {
            MenuItemKind::Link { url } => url.as_deref(),
            _ => None,
        }
    }

    pub fn query_builder_id(&self) -> Option<&str> {
        match self {
            MenuItemKind::DataView { query_builder_id } => query_builder_id.as_deref(),
            _ => None,
        }
    }

    /// Navigation target rendered for the item, if it has one
    pub fn href(&self) -> Option<String> {
        match self {
            MenuItemKind::Folder => None,
            MenuItemKind::Program { program_id } => program_id.clone(),
            MenuItemKind::Link { url } => url.clone(),
            MenuItemKind::DataView { query_builder_id } => query_builder_id
                .as_ref()
                .map(|id| format!("/query-builder/{}/view", id)),
        }
    }

    /// Folders need no target; every other kind needs a non-blank pointer
    pub fn has_target(&self) -> bool {
        let pointer = match self {
            MenuItemKind::Folder => return true,
            MenuItemKind::Program { program_id } => program_id,
            MenuItemKind::Link { url } => url,
            MenuItemKind::DataView { query_builder_id } => query_builder_id,
        };
        pointer.as_deref().is_some_and(|p| !p.trim().is_empty())
    }
}

impl Default for MenuItemKind {
    fn default() -> Self {
        MenuItemKind::Folder
    }
}

/// Menu item entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: Uuid,
    pub config_id: Uuid,
    pub parent_id: Option<Uuid>,

    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: String,

    #[validate(length(max = 255, message = "Title key too long"))]
    pub title_key: Option<String>,

    pub icon: Option<String>,

    #[serde(flatten)]
    pub kind: MenuItemKind,

    pub order_index: i32,
    pub is_visible: bool,
    pub required_roles: Vec<String>,
    pub required_permissions: Vec<String>,

    #[serde(flatten)]
    pub audit: AuditFields,
}

impl MenuItem {
    /// Create new visible, unrestricted menu item
    pub fn new(
        config_id: Uuid,
        parent_id: Option<Uuid>,
        title: String,
        kind: MenuItemKind,
        order_index: i32,
    ) -> Result<Self, validator::ValidationErrors> {
        let item = Self {
            id: Uuid::new_v4(),
            config_id,
            parent_id,
            title: title.trim().to_string(),
            title_key: None,
            icon: None,
            kind,
            order_index,
            is_visible: true,
            required_roles: Vec::new(),
            required_permissions: Vec::new(),
            audit: AuditFields::default(),
        };

        item.validate()?;
        Ok(item)
    }

    pub fn with_title_key(mut self, title_key: impl Into<String>) -> Self {
        self.title_key = Some(title_key.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_roles = roles.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_deleted(&self) -> bool {
        self.audit.is_deleted()
    }

    /// Role and permission gate.
    ///
    /// Each non-empty requirement list is satisfied when the caller holds any
    /// one of its entries; both lists must be satisfied when both are set.
    pub fn is_accessible(&self, roles: &[String], permissions: &[String]) -> bool {
        let roles_ok = self.required_roles.is_empty()
            || self.required_roles.iter().any(|r| roles.contains(r));
        let permissions_ok = self.required_permissions.is_empty()
            || self
                .required_permissions
                .iter()
                .any(|p| permissions.contains(p));

        roles_ok && permissions_ok
    }
}
