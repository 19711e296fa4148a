//! User menu preference entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use topsteel_shared::AuditFields;
use uuid::Uuid;

/// Per-user override of a single menu item, unique per `(user_id, menu_id)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMenuPreference {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Item id in string form, or a legacy slug matched against `title_key`
    pub menu_id: String,
    pub is_visible: bool,
    pub order: Option<i32>,
    pub custom_label: Option<String>,
    pub is_favorite: bool,
    /// Pinned items sort ahead of their siblings
    pub is_pinned: bool,
    pub custom_icon: Option<String>,
    pub custom_color: Option<String>,
    pub custom_badge: Option<String>,
    pub version: i32,

    #[serde(flatten)]
    pub audit: AuditFields,
}

impl UserMenuPreference {
    /// Fresh row with default overrides (visible, no order, no label)
    pub fn new(user_id: Uuid, menu_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            menu_id: menu_id.into(),
            is_visible: true,
            order: None,
            custom_label: None,
            is_favorite: false,
            is_pinned: false,
            custom_icon: None,
            custom_color: None,
            custom_badge: None,
            version: 0,
            audit: AuditFields::created_by(Some(user_id)),
        }
    }

    /// Apply the provided fields of a patch and bump the version.
    /// An empty custom text field (label, icon, color, badge) clears it.
    pub fn apply(&mut self, patch: &PreferencePatch) {
        if let Some(visible) = patch.is_visible {
            self.is_visible = visible;
        }
        if let Some(order) = patch.order {
            self.order = Some(order);
        }
        if let Some(favorite) = patch.is_favorite {
            self.is_favorite = favorite;
        }
        if let Some(pinned) = patch.is_pinned {
            self.is_pinned = pinned;
        }
        overwrite_text(&mut self.custom_label, &patch.custom_label);
        overwrite_text(&mut self.custom_icon, &patch.custom_icon);
        overwrite_text(&mut self.custom_color, &patch.custom_color);
        overwrite_text(&mut self.custom_badge, &patch.custom_badge);
        self.version += 1;
        self.audit.touch(Some(self.user_id));
    }

    pub fn is_deleted(&self) -> bool {
        self.audit.is_deleted()
    }
}

fn overwrite_text(field: &mut Option<String>, update: &Option<String>) {
    if let Some(value) = update {
        let value = value.trim();
        *field = if value.is_empty() { None } else { Some(value.to_string()) };
    }
}

/// Partial update for a preference row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencePatch {
    pub is_visible: Option<bool>,
    pub order: Option<i32>,
    pub custom_label: Option<String>,
    pub is_favorite: Option<bool>,
    pub is_pinned: Option<bool>,
    pub custom_icon: Option<String>,
    pub custom_color: Option<String>,
    pub custom_badge: Option<String>,
    /// When set, the write only succeeds if the stored version matches.
    /// Absent or reset rows count as version 0.
    pub expected_version: Option<i32>,
}

impl PreferencePatch {
    pub fn visibility(is_visible: bool) -> Self {
        Self { is_visible: Some(is_visible), ..Self::default() }
    }

    pub fn order(order: i32) -> Self {
        Self { order: Some(order), ..Self::default() }
    }

    pub fn custom_label(label: impl Into<String>) -> Self {
        Self { custom_label: Some(label.into()), ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.is_visible.is_none()
            && self.order.is_none()
            && self.custom_label.is_none()
            && self.is_favorite.is_none()
            && self.is_pinned.is_none()
            && self.custom_icon.is_none()
            && self.custom_color.is_none()
            && self.custom_badge.is_none()
    }
}

/// Quick action on a single menu item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum MenuItemAction {
    Favorite,
    Unfavorite,
    Hide,
    Show,
    Pin,
    Unpin,
    Reorder { value: i32 },
}

impl MenuItemAction {
    pub fn to_patch(self) -> PreferencePatch {
        let mut patch = PreferencePatch::default();
        match self {
            Self::Favorite => patch.is_favorite = Some(true),
            Self::Unfavorite => patch.is_favorite = Some(false),
            Self::Hide => patch.is_visible = Some(false),
            Self::Show => patch.is_visible = Some(true),
            Self::Pin => patch.is_pinned = Some(true),
            Self::Unpin => patch.is_pinned = Some(false),
            Self::Reorder { value } => patch.order = Some(value),
        }
        patch
    }
}

/// Appearance overrides of one menu item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomMenuItem {
    pub menu_id: String,
    #[serde(default)]
    pub custom_title: Option<String>,
    #[serde(default)]
    pub custom_icon: Option<String>,
    #[serde(default)]
    pub custom_color: Option<String>,
    #[serde(default)]
    pub custom_badge: Option<String>,
    #[serde(default)]
    pub custom_order: Option<i32>,
}

impl CustomMenuItem {
    pub fn to_patch(&self) -> PreferencePatch {
        PreferencePatch {
            order: self.custom_order,
            custom_label: self.custom_title.clone(),
            custom_icon: self.custom_icon.clone(),
            custom_color: self.custom_color.clone(),
            custom_badge: self.custom_badge.clone(),
            ..PreferencePatch::default()
        }
    }
}

/// User-built synthetic menu, stored apart from item preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCustomMenu {
    pub user_id: Uuid,
    pub items: serde_json::Value,
    pub item_count: i32,
    pub saved_at: DateTime<Utc>,
}

impl UserCustomMenu {
    pub fn new(user_id: Uuid, items: serde_json::Value) -> Self {
        let item_count = items.as_array().map(|a| a.len() as i32).unwrap_or(0);
        Self {
            user_id,
            items,
            item_count,
            saved_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_apply_only_provided_fields() {
        let mut pref = UserMenuPreference::new(Uuid::new_v4(), "dashboard");
        pref.apply(&PreferencePatch::order(3));
        pref.apply(&PreferencePatch::custom_label("Accueil"));

        assert!(pref.is_visible);
        assert_eq!(pref.order, Some(3));
        assert_eq!(pref.custom_label.as_deref(), Some("Accueil"));
        assert_eq!(pref.version, 2);
    }

    #[test]
    fn test_empty_label_clears() {
        let mut pref = UserMenuPreference::new(Uuid::new_v4(), "dashboard");
        pref.apply(&PreferencePatch::custom_label("Accueil"));
        pref.apply(&PreferencePatch::custom_label("  "));

        assert_eq!(pref.custom_label, None);
    }

    #[test]
    fn test_actions_touch_a_single_field() {
        let mut pref = UserMenuPreference::new(Uuid::new_v4(), "dashboard");
        pref.apply(&MenuItemAction::Pin.to_patch());
        pref.apply(&MenuItemAction::Favorite.to_patch());
        pref.apply(&MenuItemAction::Reorder { value: 4 }.to_patch());
        pref.apply(&MenuItemAction::Unfavorite.to_patch());

        assert!(pref.is_pinned);
        assert!(!pref.is_favorite);
        assert!(pref.is_visible);
        assert_eq!(pref.order, Some(4));
        assert_eq!(pref.version, 4);
    }

    #[test]
    fn test_action_wire_format() {
        let action: MenuItemAction = serde_json::from_value(json!({ "action": "reorder", "value": 2 })).unwrap();
        assert_eq!(action, MenuItemAction::Reorder { value: 2 });

        let action: MenuItemAction = serde_json::from_value(json!({ "action": "unpin" })).unwrap();
        assert_eq!(action, MenuItemAction::Unpin);

        assert!(serde_json::from_value::<MenuItemAction>(json!({ "action": "explode" })).is_err());
    }

    #[test]
    fn test_custom_item_blank_fields_clear() {
        let mut pref = UserMenuPreference::new(Uuid::new_v4(), "stock");
        let custom = CustomMenuItem {
            menu_id: "stock".to_string(),
            custom_icon: Some("Package".to_string()),
            custom_badge: Some("3".to_string()),
            ..CustomMenuItem::default()
        };
        pref.apply(&custom.to_patch());
        pref.apply(&PreferencePatch { custom_badge: Some(String::new()), ..PreferencePatch::default() });

        assert_eq!(pref.custom_icon.as_deref(), Some("Package"));
        assert_eq!(pref.custom_badge, None);
        assert!(CustomMenuItem::default().to_patch().is_empty());
    }

    #[test]
    fn test_custom_menu_counts_items() {
        let menu = UserCustomMenu::new(Uuid::new_v4(), json!([{ "title": "A" }, { "title": "B" }]));
        assert_eq!(menu.item_count, 2);

        let menu = UserCustomMenu::new(Uuid::new_v4(), json!({ "title": "A" }));
        assert_eq!(menu.item_count, 0);
    }
}
