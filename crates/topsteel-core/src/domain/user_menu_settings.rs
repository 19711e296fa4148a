//! Per-user menu layout settings, templates and shortcuts

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

pub const LAYOUT_TYPES: [&str; 3] = ["compact", "standard", "expanded"];
pub const THEMES: [&str; 3] = ["auto", "light", "dark"];

/// Keyboard or quick-access shortcut, unique per `key` within a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuShortcut {
    pub key: String,
    pub href: String,
    pub title: String,
}

/// Layout settings of one user's menu, one row per user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMenuSettings {
    pub user_id: Uuid,
    pub layout_type: String,
    pub show_icons: bool,
    pub show_badges: bool,
    pub allow_collapse: bool,
    pub theme: String,
    pub use_custom_layout: bool,
    #[serde(default)]
    pub shortcuts: Vec<MenuShortcut>,
    pub updated_at: DateTime<Utc>,
}

impl UserMenuSettings {
    pub fn default_for(user_id: Uuid) -> Self {
        Self {
            user_id,
            layout_type: "standard".to_string(),
            show_icons: true,
            show_badges: true,
            allow_collapse: true,
            theme: "auto".to_string(),
            use_custom_layout: false,
            shortcuts: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    /// Apply the provided fields, rejecting unknown layouts and themes
    pub fn apply(&mut self, update: &MenuSettingsUpdate) -> Result<(), DomainError> {
        if let Some(layout) = &update.layout_type {
            if !LAYOUT_TYPES.contains(&layout.as_str()) {
                return Err(DomainError::ValidationError(format!("Unknown layout type: {}", layout)));
            }
            self.layout_type = layout.clone();
        }
        if let Some(theme) = &update.theme {
            if !THEMES.contains(&theme.as_str()) {
                return Err(DomainError::ValidationError(format!("Unknown theme: {}", theme)));
            }
            self.theme = theme.clone();
        }
        if let Some(show) = update.show_icons {
            self.show_icons = show;
        }
        if let Some(show) = update.show_badges {
            self.show_badges = show;
        }
        if let Some(allow) = update.allow_collapse {
            self.allow_collapse = allow;
        }
        if let Some(custom) = update.use_custom_layout {
            self.use_custom_layout = custom;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Replace the shortcut with the same key, or append it
    pub fn upsert_shortcut(&mut self, shortcut: MenuShortcut) {
        match self.shortcuts.iter_mut().find(|s| s.key == shortcut.key) {
            Some(existing) => *existing = shortcut,
            None => self.shortcuts.push(shortcut),
        }
        self.updated_at = Utc::now();
    }

    /// Returns false when no shortcut had that key
    pub fn remove_shortcut(&mut self, key: &str) -> bool {
        let before = self.shortcuts.len();
        self.shortcuts.retain(|s| s.key != key);
        let removed = self.shortcuts.len() != before;
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuSettingsUpdate {
    pub layout_type: Option<String>,
    pub show_icons: Option<bool>,
    pub show_badges: Option<bool>,
    pub allow_collapse: Option<bool>,
    pub theme: Option<String>,
    pub use_custom_layout: Option<bool>,
}

/// Preset layouts a user can start from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuTemplate {
    Minimal,
    Business,
    Admin,
    Developer,
}

impl MenuTemplate {
    /// Settings produced by the template. Shortcuts are kept.
    pub fn settings(self, current: &UserMenuSettings) -> UserMenuSettings {
        let mut settings = UserMenuSettings::default_for(current.user_id);
        settings.shortcuts = current.shortcuts.clone();

        let (layout, icons, badges, custom) = match self {
            Self::Minimal => ("compact", false, false, true),
            Self::Business => ("standard", true, true, false),
            Self::Admin => ("expanded", true, true, true),
            Self::Developer => ("compact", true, false, true),
        };
        settings.layout_type = layout.to_string();
        settings.show_icons = icons;
        settings.show_badges = badges;
        settings.use_custom_layout = custom;
        if self == Self::Developer {
            settings.theme = "dark".to_string();
        }
        settings
    }
}

impl FromStr for MenuTemplate {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minimal" => Ok(Self::Minimal),
            "business" => Ok(Self::Business),
            "admin" => Ok(Self::Admin),
            "developer" => Ok(Self::Developer),
            other => Err(DomainError::ValidationError(format!("Unknown menu template: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shortcut(key: &str, href: &str) -> MenuShortcut {
        MenuShortcut {
            key: key.to_string(),
            href: href.to_string(),
            title: key.to_uppercase(),
        }
    }

    #[test]
    fn test_templates() {
        let current = UserMenuSettings::default_for(Uuid::new_v4());

        let minimal = MenuTemplate::Minimal.settings(&current);
        assert_eq!(minimal.layout_type, "compact");
        assert!(!minimal.show_icons && !minimal.show_badges && minimal.use_custom_layout);

        let business = MenuTemplate::Business.settings(&current);
        assert_eq!(business.layout_type, "standard");
        assert!(business.show_icons && business.show_badges && !business.use_custom_layout);

        let admin = MenuTemplate::Admin.settings(&current);
        assert_eq!(admin.layout_type, "expanded");
        assert_eq!(admin.theme, "auto");

        let developer = MenuTemplate::Developer.settings(&current);
        assert_eq!(developer.theme, "dark");
        assert!(developer.show_icons && !developer.show_badges);
    }

    #[test]
    fn test_template_keeps_shortcuts() {
        let mut current = UserMenuSettings::default_for(Uuid::new_v4());
        current.theme = "light".to_string();
        current.upsert_shortcut(shortcut("g s", "/stock"));

        let applied = MenuTemplate::Admin.settings(&current);
        assert_eq!(applied.shortcuts, current.shortcuts);
        assert_eq!(applied.theme, "auto");
    }

    #[test]
    fn test_template_names() {
        assert_eq!("Developer".parse::<MenuTemplate>().unwrap(), MenuTemplate::Developer);
        assert!(matches!("kiosk".parse::<MenuTemplate>(), Err(DomainError::ValidationError(_))));
    }

    #[test]
    fn test_shortcut_key_is_unique() {
        let mut settings = UserMenuSettings::default_for(Uuid::new_v4());
        settings.upsert_shortcut(shortcut("g s", "/stock"));
        settings.upsert_shortcut(shortcut("g v", "/ventes"));
        settings.upsert_shortcut(shortcut("g s", "/inventory/stock"));

        assert_eq!(settings.shortcuts.len(), 2);
        assert_eq!(settings.shortcuts[0].href, "/inventory/stock");

        assert!(settings.remove_shortcut("g v"));
        assert!(!settings.remove_shortcut("g v"));
        assert_eq!(settings.shortcuts.len(), 1);
    }

    #[test]
    fn test_update_rejects_unknown_layout() {
        let mut settings = UserMenuSettings::default_for(Uuid::new_v4());
        let update = MenuSettingsUpdate {
            layout_type: Some("sideways".to_string()),
            ..MenuSettingsUpdate::default()
        };

        assert!(matches!(settings.apply(&update), Err(DomainError::ValidationError(_))));
        assert_eq!(settings.layout_type, "standard");
    }

    #[test]
    fn test_update_only_provided_fields() {
        let mut settings = UserMenuSettings::default_for(Uuid::new_v4());
        let update = MenuSettingsUpdate {
            theme: Some("dark".to_string()),
            show_badges: Some(false),
            ..MenuSettingsUpdate::default()
        };

        settings.apply(&update).unwrap();
        assert_eq!(settings.theme, "dark");
        assert!(!settings.show_badges);
        assert!(settings.show_icons);
    }
}
