// ============================================================================
// TopSteel Core - Menu Preference Service
// File: crates/topsteel-core/src/services/menu_preference_service.rs
// Description: Per-user menu overrides, selected pages, custom menus and
//              layout settings
// ============================================================================

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use topsteel_shared::constants::{CUSTOM_MENU_CACHE_PREFIX, DEFAULT_CUSTOM_MENU_TTL_SECS};

use crate::domain::{
    CustomMenuItem, MenuItemAction, MenuSettingsUpdate, MenuShortcut, MenuTemplate, PreferencePatch,
    UserCustomMenu, UserMenuPreference, UserMenuSettings,
};
use crate::error::DomainError;
use crate::repositories::{CacheStore, UserMenuPreferenceRepository};
use crate::services::envelope::normalize_preference_envelope;

pub const PREFERENCE_EXPORT_VERSION: &str = "1.0";

/// Flat preference entry exchanged with clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceEntry {
    pub menu_id: String,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
    #[serde(default)]
    pub order: Option<i32>,
    #[serde(default)]
    pub custom_label: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_badge: Option<String>,
}

fn default_visible() -> bool {
    true
}

impl From<&UserMenuPreference> for PreferenceEntry {
    fn from(pref: &UserMenuPreference) -> Self {
        Self {
            menu_id: pref.menu_id.clone(),
            is_visible: pref.is_visible,
            order: pref.order,
            custom_label: pref.custom_label.clone(),
            is_favorite: pref.is_favorite,
            is_pinned: pref.is_pinned,
            custom_icon: pref.custom_icon.clone(),
            custom_color: pref.custom_color.clone(),
            custom_badge: pref.custom_badge.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceExport {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub preferences: Vec<PreferenceEntry>,
}

/// Visible menu ids ordered by their `order` override, rows without one last
fn visible_pages<'e>(entries: impl Iterator<Item = &'e PreferenceEntry>) -> Vec<String> {
    let mut visible: Vec<&PreferenceEntry> = entries.filter(|e| e.is_visible).collect();
    visible.sort_by_key(|e| (e.order.is_none(), e.order));
    visible.into_iter().map(|e| e.menu_id.clone()).collect()
}

fn string_list(values: &Value) -> Vec<String> {
    values
        .as_array()
        .map(|items| items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default()
}

/// Selected pages from a save request.
///
/// Accepts `{selectedPages: [..]}` (or `pages`), a flat list of menu ids, or
/// preference rows in any of the accepted envelopes, in which case the
/// visible rows are the selection. Unreadable payloads and entries count as
/// no selection.
pub fn selected_pages_from_payload(payload: Value) -> Vec<String> {
    if let Some(pages) = payload.get("selectedPages").or_else(|| payload.get("pages")) {
        return string_list(pages);
    }
    if payload.as_array().is_some_and(|items| items.iter().all(Value::is_string)) {
        return string_list(&payload);
    }

    let rows = match normalize_preference_envelope(payload) {
        Ok(rows) => rows,
        Err(e) => {
            warn!("Ignoring preference payload: {}", e);
            return Vec::new();
        }
    };

    let entries: Vec<PreferenceEntry> = rows
        .into_iter()
        .filter_map(|row| match serde_json::from_value(row) {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Skipping unreadable preference entry: {}", e);
                None
            }
        })
        .collect();

    visible_pages(entries.iter())
}

/// User menu preference service
pub struct MenuPreferenceService<P>
where
    P: UserMenuPreferenceRepository + ?Sized,
{
    preference_repo: Arc<P>,
    cache: Option<Arc<dyn CacheStore>>,
    custom_menu_ttl_secs: u64,
}

impl<P> MenuPreferenceService<P>
where
    P: UserMenuPreferenceRepository + ?Sized,
{
    pub fn new(preference_repo: Arc<P>) -> Self {
        Self {
            preference_repo,
            cache: None,
            custom_menu_ttl_secs: DEFAULT_CUSTOM_MENU_TTL_SECS,
        }
    }

    /// Enable the custom menu read-through cache
    pub fn with_cache(mut self, cache: Arc<dyn CacheStore>, ttl_secs: u64) -> Self {
        self.cache = Some(cache);
        self.custom_menu_ttl_secs = ttl_secs;
        self
    }

    pub async fn get(&self, user_id: &Uuid) -> Result<Vec<UserMenuPreference>, DomainError> {
        self.preference_repo.list_by_user(user_id).await
    }

    pub async fn upsert(
        &self,
        user_id: &Uuid,
        menu_id: &str,
        patch: PreferencePatch,
    ) -> Result<UserMenuPreference, DomainError> {
        let menu_id = menu_id.trim();
        if menu_id.is_empty() {
            return Err(DomainError::ValidationError("menuId is required".to_string()));
        }
        if patch.is_empty() {
            return Err(DomainError::ValidationError(
                "At least one preference field is required".to_string(),
            ));
        }

        let saved = self.preference_repo.upsert(user_id, menu_id, &patch).await?;
        debug!("Preference {} of user {} saved at version {}", menu_id, user_id, saved.version);
        Ok(saved)
    }

    pub async fn set_visibility(&self, user_id: &Uuid, menu_id: &str, is_visible: bool) -> Result<UserMenuPreference, DomainError> {
        self.upsert(user_id, menu_id, PreferencePatch::visibility(is_visible)).await
    }

    pub async fn set_order(&self, user_id: &Uuid, menu_id: &str, order: i32) -> Result<UserMenuPreference, DomainError> {
        self.upsert(user_id, menu_id, PreferencePatch::order(order)).await
    }

    pub async fn set_custom_label(&self, user_id: &Uuid, menu_id: &str, label: &str) -> Result<UserMenuPreference, DomainError> {
        self.upsert(user_id, menu_id, PreferencePatch::custom_label(label)).await
    }

    /// Favorite, pin, hide, show or reorder one item
    pub async fn execute_action(&self, user_id: &Uuid, menu_id: &str, action: MenuItemAction) -> Result<UserMenuPreference, DomainError> {
        let saved = self.upsert(user_id, menu_id, action.to_patch()).await?;
        debug!("Applied {:?} to {} for user {}", action, menu_id, user_id);
        Ok(saved)
    }

    /// Title, icon, color, badge or order override of one item
    pub async fn update_custom_item(&self, user_id: &Uuid, custom: &CustomMenuItem) -> Result<UserMenuPreference, DomainError> {
        self.upsert(user_id, &custom.menu_id, custom.to_patch()).await
    }

    /// Ids of the items a user marked as favorite
    pub async fn favorites(&self, user_id: &Uuid) -> Result<Vec<String>, DomainError> {
        Ok(self
            .get(user_id)
            .await?
            .into_iter()
            .filter(|p| p.is_favorite)
            .map(|p| p.menu_id)
            .collect())
    }

    /// Flip the visibility of a page. Pages without a row are visible, so
    /// the first toggle hides them. Guarded by the row version.
    pub async fn toggle_page(&self, user_id: &Uuid, menu_id: &str) -> Result<UserMenuPreference, DomainError> {
        let current = self
            .preference_repo
            .list_by_user(user_id)
            .await?
            .into_iter()
            .find(|p| p.menu_id == menu_id.trim());

        let (is_visible, version) = current
            .map(|p| (p.is_visible, p.version))
            .unwrap_or((true, 0));

        let patch = PreferencePatch {
            is_visible: Some(!is_visible),
            expected_version: Some(version),
            ..Default::default()
        };
        self.upsert(user_id, menu_id, patch).await
    }

    pub async fn selected_pages(&self, user_id: &Uuid) -> Result<Vec<String>, DomainError> {
        let entries: Vec<PreferenceEntry> = self.get(user_id).await?.iter().map(PreferenceEntry::from).collect();
        Ok(visible_pages(entries.iter()))
    }

    /// Make exactly `pages` visible, in the given order
    pub async fn save_selected_pages(&self, user_id: &Uuid, pages: &[String]) -> Result<Vec<String>, DomainError> {
        let pages: Vec<&str> = pages
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .collect();

        for pref in self.get(user_id).await? {
            if pref.is_visible && !pages.contains(&pref.menu_id.as_str()) {
                self.preference_repo
                    .upsert(user_id, &pref.menu_id, &PreferencePatch::visibility(false))
                    .await?;
            }
        }

        for (position, page) in pages.iter().enumerate() {
            let patch = PreferencePatch {
                is_visible: Some(true),
                order: Some(position as i32 + 1),
                ..Default::default()
            };
            self.preference_repo.upsert(user_id, page, &patch).await?;
        }

        info!("Saved {} selected pages for user {}", pages.len(), user_id);
        self.selected_pages(user_id).await
    }

    /// Drop every override of a user
    pub async fn reset(&self, user_id: &Uuid) -> Result<u64, DomainError> {
        let removed = self.preference_repo.soft_delete_all(user_id).await?;
        info!("Reset {} menu preferences for user {}", removed, user_id);
        Ok(removed)
    }

    fn custom_menu_key(user_id: &Uuid) -> String {
        format!("{}:{}", CUSTOM_MENU_CACHE_PREFIX, user_id)
    }

    pub async fn get_custom_menu(&self, user_id: &Uuid) -> Result<Option<UserCustomMenu>, DomainError> {
        let key = Self::custom_menu_key(user_id);

        if let Some(cache) = &self.cache {
            match cache.get_json(&key).await {
                Ok(Some(cached)) => match serde_json::from_value::<UserCustomMenu>(cached) {
                    Ok(menu) => {
                        debug!("Custom menu cache hit for user {}", user_id);
                        return Ok(Some(menu));
                    }
                    Err(e) => warn!("Discarding unreadable cached custom menu {}: {}", key, e),
                },
                Ok(None) => {}
                Err(e) => warn!("Custom menu cache read failed for {}: {}", key, e),
            }
        }

        let menu = self.preference_repo.find_custom_menu(user_id).await?;

        if let (Some(cache), Some(menu)) = (&self.cache, &menu) {
            match serde_json::to_value(menu) {
                Ok(value) => {
                    if let Err(e) = cache.set_json(&key, &value, self.custom_menu_ttl_secs).await {
                        warn!("Custom menu cache write failed for {}: {}", key, e);
                    }
                }
                Err(e) => warn!("Custom menu not cacheable for {}: {}", key, e),
            }
        }

        Ok(menu)
    }

    pub async fn save_custom_menu(&self, user_id: &Uuid, items: Value) -> Result<UserCustomMenu, DomainError> {
        if !items.is_array() {
            return Err(DomainError::ValidationError("Custom menu items must be an array".to_string()));
        }

        let saved = self
            .preference_repo
            .save_custom_menu(&UserCustomMenu::new(*user_id, items))
            .await?;

        if let Some(cache) = &self.cache {
            let key = Self::custom_menu_key(user_id);
            if let Err(e) = cache.invalidate(&key).await {
                warn!("Custom menu cache invalidation failed for {}: {}", key, e);
            }
        }

        info!("Saved custom menu for user {} ({} items)", user_id, saved.item_count);
        Ok(saved)
    }

    pub async fn export_preferences(&self, user_id: &Uuid) -> Result<PreferenceExport, DomainError> {
        let preferences = self.get(user_id).await?.iter().map(PreferenceEntry::from).collect();

        Ok(PreferenceExport {
            version: PREFERENCE_EXPORT_VERSION.to_string(),
            exported_at: Utc::now(),
            preferences,
        })
    }

    /// Apply an exported document or any accepted preference envelope.
    /// Returns how many rows were written.
    pub async fn import_preferences(&self, user_id: &Uuid, payload: Value) -> Result<usize, DomainError> {
        let rows = match payload {
            Value::Object(mut object) if object.contains_key("preferences") => {
                normalize_preference_envelope(object.remove("preferences").unwrap_or(Value::Null))?
            }
            other => normalize_preference_envelope(other)?,
        };

        let entries = rows
            .into_iter()
            .map(serde_json::from_value::<PreferenceEntry>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DomainError::MalformedPreferencePayload(e.to_string()))?;

        for entry in &entries {
            let patch = PreferencePatch {
                is_visible: Some(entry.is_visible),
                order: entry.order,
                custom_label: entry.custom_label.clone(),
                is_favorite: Some(entry.is_favorite),
                is_pinned: Some(entry.is_pinned),
                custom_icon: entry.custom_icon.clone(),
                custom_color: entry.custom_color.clone(),
                custom_badge: entry.custom_badge.clone(),
                expected_version: None,
            };
            self.upsert(user_id, &entry.menu_id, patch).await?;
        }

        info!("Imported {} menu preferences for user {}", entries.len(), user_id);
        Ok(entries.len())
    }

    /// Stored layout settings, or the defaults for a user who never saved any
    pub async fn get_settings(&self, user_id: &Uuid) -> Result<UserMenuSettings, DomainError> {
        Ok(self
            .preference_repo
            .find_settings(user_id)
            .await?
            .unwrap_or_else(|| UserMenuSettings::default_for(*user_id)))
    }

    pub async fn update_settings(&self, user_id: &Uuid, update: &MenuSettingsUpdate) -> Result<UserMenuSettings, DomainError> {
        let mut settings = self.get_settings(user_id).await?;
        settings.apply(update)?;
        self.preference_repo.save_settings(&settings).await
    }

    /// Overwrite the layout settings with a preset, keeping shortcuts
    pub async fn apply_template(&self, user_id: &Uuid, template: MenuTemplate) -> Result<UserMenuSettings, DomainError> {
        let current = self.get_settings(user_id).await?;
        let saved = self.preference_repo.save_settings(&template.settings(&current)).await?;
        info!("Applied {:?} menu template for user {}", template, user_id);
        Ok(saved)
    }

    pub async fn add_shortcut(&self, user_id: &Uuid, shortcut: MenuShortcut) -> Result<UserMenuSettings, DomainError> {
        let shortcut = MenuShortcut {
            key: shortcut.key.trim().to_string(),
            href: shortcut.href.trim().to_string(),
            title: shortcut.title.trim().to_string(),
        };
        if shortcut.key.is_empty() || shortcut.href.is_empty() {
            return Err(DomainError::ValidationError("Shortcut key and href are required".to_string()));
        }

        let mut settings = self.get_settings(user_id).await?;
        settings.upsert_shortcut(shortcut);
        self.preference_repo.save_settings(&settings).await
    }

    /// Removing an unknown key is a no-op
    pub async fn remove_shortcut(&self, user_id: &Uuid, key: &str) -> Result<UserMenuSettings, DomainError> {
        let mut settings = self.get_settings(user_id).await?;
        if !settings.remove_shortcut(key.trim()) {
            return Ok(settings);
        }
        self.preference_repo.save_settings(&settings).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{MockCacheStore, MockUserMenuPreferenceRepository};
    use serde_json::json;

    fn row(user_id: Uuid, menu_id: &str, is_visible: bool, order: Option<i32>, version: i32) -> UserMenuPreference {
        let mut p = UserMenuPreference::new(user_id, menu_id);
        p.is_visible = is_visible;
        p.order = order;
        p.version = version;
        p
    }

    fn echo_upsert(user_id: &Uuid, menu_id: &str, patch: &PreferencePatch) -> Result<UserMenuPreference, DomainError> {
        let mut p = UserMenuPreference::new(*user_id, menu_id);
        p.apply(patch);
        Ok(p)
    }

    #[test]
    fn test_selected_pages_from_flat_and_nested_payloads() {
        let rows = json!([
            { "menuId": "a", "isVisible": true, "order": 2 },
            { "menuId": "b", "isVisible": false, "order": 1 }
        ]);
        assert_eq!(selected_pages_from_payload(rows.clone()), vec!["a"]);
        assert_eq!(
            selected_pages_from_payload(json!({ "success": true, "data": rows })),
            vec!["a"]
        );
    }

    #[test]
    fn test_selected_pages_from_request_shapes() {
        assert_eq!(selected_pages_from_payload(json!({ "selectedPages": ["b", "a"] })), vec!["b", "a"]);
        assert_eq!(selected_pages_from_payload(json!({ "pages": ["c"] })), vec!["c"]);
        assert_eq!(selected_pages_from_payload(json!(["x", "y"])), vec!["x", "y"]);
    }

    #[test]
    fn test_selected_pages_from_malformed_payload_is_empty() {
        assert!(selected_pages_from_payload(json!("oops")).is_empty());
        assert!(selected_pages_from_payload(json!({ "data": 3 })).is_empty());
    }

    #[tokio::test]
    async fn test_selected_pages_ordered_by_order() {
        let user = Uuid::new_v4();
        let mut repo = MockUserMenuPreferenceRepository::new();
        repo.expect_list_by_user().returning(move |_| {
            Ok(vec![
                row(user, "c", true, None, 1),
                row(user, "a", true, Some(2), 1),
                row(user, "b", false, Some(1), 1),
                row(user, "d", true, Some(1), 1),
            ])
        });

        let pages = MenuPreferenceService::new(Arc::new(repo)).selected_pages(&user).await.unwrap();
        assert_eq!(pages, vec!["d", "a", "c"]);
    }

    #[tokio::test]
    async fn test_upsert_requires_a_change() {
        let service = MenuPreferenceService::new(Arc::new(MockUserMenuPreferenceRepository::new()));

        let result = service.upsert(&Uuid::new_v4(), "dashboard", PreferencePatch::default()).await;
        assert!(matches!(result, Err(DomainError::ValidationError(_))));

        let result = service.upsert(&Uuid::new_v4(), "  ", PreferencePatch::order(1)).await;
        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_toggle_absent_page_hides_it() {
        let mut repo = MockUserMenuPreferenceRepository::new();
        repo.expect_list_by_user().returning(|_| Ok(vec![]));
        repo.expect_upsert()
            .withf(|_, menu_id, patch| {
                menu_id == "dashboard" && patch.is_visible == Some(false) && patch.expected_version == Some(0)
            })
            .times(1)
            .returning(echo_upsert);

        let saved = MenuPreferenceService::new(Arc::new(repo))
            .toggle_page(&Uuid::new_v4(), "dashboard")
            .await
            .unwrap();

        assert!(!saved.is_visible);
    }

    #[tokio::test]
    async fn test_toggle_hidden_page_shows_it() {
        let user = Uuid::new_v4();
        let mut repo = MockUserMenuPreferenceRepository::new();
        repo.expect_list_by_user()
            .returning(move |_| Ok(vec![row(user, "dashboard", false, None, 4)]));
        repo.expect_upsert()
            .withf(|_, _, patch| patch.is_visible == Some(true) && patch.expected_version == Some(4))
            .times(1)
            .returning(echo_upsert);

        let saved = MenuPreferenceService::new(Arc::new(repo))
            .toggle_page(&user, "dashboard")
            .await
            .unwrap();

        assert!(saved.is_visible);
    }

    #[tokio::test]
    async fn test_save_selected_pages_hides_unlisted() {
        let user = Uuid::new_v4();
        let mut repo = MockUserMenuPreferenceRepository::new();
        repo.expect_list_by_user()
            .returning(move |_| Ok(vec![row(user, "old", true, Some(1), 1)]));
        repo.expect_upsert()
            .withf(|_, menu_id, patch| menu_id == "old" && patch.is_visible == Some(false))
            .times(1)
            .returning(echo_upsert);
        repo.expect_upsert()
            .withf(|_, menu_id, patch| menu_id == "new" && patch.order == Some(1))
            .times(1)
            .returning(echo_upsert);

        MenuPreferenceService::new(Arc::new(repo))
            .save_selected_pages(&user, &["new".to_string()])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_custom_menu_served_from_cache() {
        let user = Uuid::new_v4();
        let cached = serde_json::to_value(UserCustomMenu::new(user, json!([{ "title": "Mes pages" }]))).unwrap();

        let mut cache = MockCacheStore::new();
        cache
            .expect_get_json()
            .withf(move |key| key == format!("user:custom-menu:{}", user))
            .returning(move |_| Ok(Some(cached.clone())));
        let mut repo = MockUserMenuPreferenceRepository::new();
        repo.expect_find_custom_menu().never();

        let menu = MenuPreferenceService::new(Arc::new(repo))
            .with_cache(Arc::new(cache), 300)
            .get_custom_menu(&user)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(menu.item_count, 1);
    }

    #[tokio::test]
    async fn test_cache_failure_falls_back_to_store() {
        let user = Uuid::new_v4();
        let mut cache = MockCacheStore::new();
        cache
            .expect_get_json()
            .returning(|_| Err(DomainError::CacheError("connection refused".to_string())));
        cache
            .expect_set_json()
            .returning(|_, _, _| Err(DomainError::CacheError("connection refused".to_string())));
        let mut repo = MockUserMenuPreferenceRepository::new();
        repo.expect_find_custom_menu()
            .times(1)
            .returning(|user_id| Ok(Some(UserCustomMenu::new(*user_id, json!([])))));

        let menu = MenuPreferenceService::new(Arc::new(repo))
            .with_cache(Arc::new(cache), 300)
            .get_custom_menu(&user)
            .await
            .unwrap();

        assert!(menu.is_some());
    }

    #[tokio::test]
    async fn test_save_custom_menu_invalidates_cache() {
        let mut cache = MockCacheStore::new();
        cache.expect_invalidate().times(1).returning(|_| Ok(()));
        let mut repo = MockUserMenuPreferenceRepository::new();
        repo.expect_save_custom_menu().returning(|menu| Ok(menu.clone()));

        let saved = MenuPreferenceService::new(Arc::new(repo))
            .with_cache(Arc::new(cache), 300)
            .save_custom_menu(&Uuid::new_v4(), json!([{ "title": "A" }, { "title": "B" }]))
            .await
            .unwrap();

        assert_eq!(saved.item_count, 2);
    }

    #[tokio::test]
    async fn test_import_accepts_export_document() {
        let mut repo = MockUserMenuPreferenceRepository::new();
        repo.expect_upsert().times(2).returning(echo_upsert);

        let imported = MenuPreferenceService::new(Arc::new(repo))
            .import_preferences(
                &Uuid::new_v4(),
                json!({
                    "version": "1.0",
                    "preferences": [
                        { "menuId": "a", "isVisible": true, "order": 1 },
                        { "menuId": "b", "isVisible": false }
                    ]
                }),
            )
            .await
            .unwrap();

        assert_eq!(imported, 2);
    }

    #[tokio::test]
    async fn test_pin_action_sets_only_pinned() {
        let mut repo = MockUserMenuPreferenceRepository::new();
        repo.expect_upsert()
            .withf(|_, menu_id, patch| {
                menu_id == "stock"
                    && patch.is_pinned == Some(true)
                    && patch.is_visible.is_none()
                    && patch.is_favorite.is_none()
            })
            .times(1)
            .returning(echo_upsert);

        let saved = MenuPreferenceService::new(Arc::new(repo))
            .execute_action(&Uuid::new_v4(), "stock", MenuItemAction::Pin)
            .await
            .unwrap();

        assert!(saved.is_pinned);
        assert!(saved.is_visible);
    }

    #[tokio::test]
    async fn test_favorites_lists_marked_items() {
        let user = Uuid::new_v4();
        let mut repo = MockUserMenuPreferenceRepository::new();
        repo.expect_list_by_user().returning(move |_| {
            let mut stock = row(user, "stock", true, None, 1);
            stock.is_favorite = true;
            Ok(vec![row(user, "ventes", true, None, 1), stock])
        });

        let favorites = MenuPreferenceService::new(Arc::new(repo)).favorites(&user).await.unwrap();
        assert_eq!(favorites, vec!["stock"]);
    }

    #[tokio::test]
    async fn test_custom_item_requires_a_field() {
        let service = MenuPreferenceService::new(Arc::new(MockUserMenuPreferenceRepository::new()));
        let custom = CustomMenuItem {
            menu_id: "stock".to_string(),
            ..CustomMenuItem::default()
        };

        let result = service.update_custom_item(&Uuid::new_v4(), &custom).await;
        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_template_saved_over_defaults() {
        let mut repo = MockUserMenuPreferenceRepository::new();
        repo.expect_find_settings().returning(|_| Ok(None));
        repo.expect_save_settings()
            .withf(|settings| settings.layout_type == "compact" && settings.theme == "dark")
            .times(1)
            .returning(|settings| Ok(settings.clone()));

        let saved = MenuPreferenceService::new(Arc::new(repo))
            .apply_template(&Uuid::new_v4(), MenuTemplate::Developer)
            .await
            .unwrap();

        assert!(saved.use_custom_layout);
    }

    #[tokio::test]
    async fn test_removing_unknown_shortcut_writes_nothing() {
        let mut repo = MockUserMenuPreferenceRepository::new();
        repo.expect_find_settings().returning(|_| Ok(None));
        repo.expect_save_settings().never();

        let settings = MenuPreferenceService::new(Arc::new(repo))
            .remove_shortcut(&Uuid::new_v4(), "g x")
            .await
            .unwrap();

        assert!(settings.shortcuts.is_empty());
    }

    #[tokio::test]
    async fn test_shortcut_requires_key_and_href() {
        let service = MenuPreferenceService::new(Arc::new(MockUserMenuPreferenceRepository::new()));
        let shortcut = MenuShortcut {
            key: " ".to_string(),
            href: "/stock".to_string(),
            title: "Stock".to_string(),
        };

        let result = service.add_shortcut(&Uuid::new_v4(), shortcut).await;
        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_import_rejects_malformed_payload() {
        let service = MenuPreferenceService::new(Arc::new(MockUserMenuPreferenceRepository::new()));

        let result = service.import_preferences(&Uuid::new_v4(), json!(42)).await;
        assert!(matches!(result, Err(DomainError::MalformedPreferencePayload(_))));
    }
}
