// ============================================================================
// TopSteel API - User Menu Preference Handlers
// File: crates/topsteel-api/src/handlers/preferences.rs
// ============================================================================
//! Per-user menu overrides, selected pages, custom menus and layout settings

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use topsteel_core::domain::{
    CustomMenuItem, MenuItem, MenuItemAction, MenuSettingsUpdate, MenuShortcut, MenuTemplate,
    PreferencePatch, UserCustomMenu, UserMenuSettings,
};
use topsteel_core::services::menu_definition_service::AddDataViewItem;
use topsteel_core::services::menu_preference_service::{
    selected_pages_from_payload, PreferenceEntry, PreferenceExport,
};

use super::{ok, ApiResult};
use crate::middleware::CurrentUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertPreferenceRequest {
    pub menu_id: String,
    #[serde(flatten)]
    pub patch: PreferencePatch,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuIdRequest {
    pub menu_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityRequest {
    pub menu_id: String,
    pub is_visible: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub menu_id: String,
    pub order: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub menu_id: String,
    #[serde(flatten)]
    pub action: MenuItemAction,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRequest {
    pub template: MenuTemplate,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomMenuRequest {
    #[serde(alias = "menuItems")]
    pub items: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetResponse {
    pub removed: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    pub imported: usize,
}

/// GET /api/v1/user/menu-preferences
pub async fn list_preferences(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> ApiResult<Vec<PreferenceEntry>> {
    let rows = state.menu_preferences.get(&principal.user_id).await?;
    ok(rows.iter().map(PreferenceEntry::from).collect())
}

/// PUT /api/v1/user/menu-preferences
pub async fn upsert_preference(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Json(payload): Json<UpsertPreferenceRequest>,
) -> ApiResult<PreferenceEntry> {
    let row = state
        .menu_preferences
        .upsert(&principal.user_id, &payload.menu_id, payload.patch)
        .await?;
    ok(PreferenceEntry::from(&row))
}

/// GET /api/v1/user/menu-preferences/selected-pages
pub async fn selected_pages(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> ApiResult<Vec<String>> {
    ok(state.menu_preferences.selected_pages(&principal.user_id).await?)
}

/// POST /api/v1/user/menu-preferences/selected-pages
pub async fn save_selected_pages(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Json(payload): Json<Value>,
) -> ApiResult<Vec<String>> {
    let pages = selected_pages_from_payload(payload);
    ok(state
        .menu_preferences
        .save_selected_pages(&principal.user_id, &pages)
        .await?)
}

/// POST /api/v1/user/menu-preferences/toggle-page
pub async fn toggle_page(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Json(payload): Json<MenuIdRequest>,
) -> ApiResult<PreferenceEntry> {
    let row = state
        .menu_preferences
        .toggle_page(&principal.user_id, &payload.menu_id)
        .await?;
    ok(PreferenceEntry::from(&row))
}

/// PUT /api/v1/user/menu-preferences/menu-visibility
pub async fn set_visibility(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Json(payload): Json<VisibilityRequest>,
) -> ApiResult<PreferenceEntry> {
    let row = state
        .menu_preferences
        .set_visibility(&principal.user_id, &payload.menu_id, payload.is_visible)
        .await?;
    ok(PreferenceEntry::from(&row))
}

/// PUT /api/v1/user/menu-preferences/menu-order
pub async fn set_order(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Json(payload): Json<OrderRequest>,
) -> ApiResult<PreferenceEntry> {
    let row = state
        .menu_preferences
        .set_order(&principal.user_id, &payload.menu_id, payload.order)
        .await?;
    ok(PreferenceEntry::from(&row))
}

/// POST /api/v1/user/menu-preferences/reset
pub async fn reset(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> ApiResult<ResetResponse> {
    let removed = state.menu_preferences.reset(&principal.user_id).await?;
    ok(ResetResponse { removed })
}

/// GET /api/v1/user/menu-preferences/custom-menu
pub async fn get_custom_menu(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> ApiResult<Option<UserCustomMenu>> {
    ok(state.menu_preferences.get_custom_menu(&principal.user_id).await?)
}

/// POST /api/v1/user/menu-preferences/custom-menu
pub async fn save_custom_menu(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Json(payload): Json<CustomMenuRequest>,
) -> ApiResult<UserCustomMenu> {
    ok(state
        .menu_preferences
        .save_custom_menu(&principal.user_id, payload.items)
        .await?)
}

/// GET /api/v1/user/menu-preferences/export
pub async fn export_preferences(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> ApiResult<PreferenceExport> {
    ok(state.menu_preferences.export_preferences(&principal.user_id).await?)
}

/// POST /api/v1/user/menu-preferences/import
pub async fn import_preferences(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Json(payload): Json<Value>,
) -> ApiResult<ImportResponse> {
    let imported = state
        .menu_preferences
        .import_preferences(&principal.user_id, payload)
        .await?;
    ok(ImportResponse { imported })
}

/// POST /api/v1/user/menu-preferences/actions
pub async fn execute_action(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Json(payload): Json<ActionRequest>,
) -> ApiResult<PreferenceEntry> {
    let row = state
        .menu_preferences
        .execute_action(&principal.user_id, &payload.menu_id, payload.action)
        .await?;
    ok(PreferenceEntry::from(&row))
}

/// PUT /api/v1/user/menu-preferences/custom-item
pub async fn update_custom_item(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Json(payload): Json<CustomMenuItem>,
) -> ApiResult<PreferenceEntry> {
    let row = state
        .menu_preferences
        .update_custom_item(&principal.user_id, &payload)
        .await?;
    ok(PreferenceEntry::from(&row))
}

/// GET /api/v1/user/menu-preferences/favorites
pub async fn favorites(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> ApiResult<Vec<String>> {
    ok(state.menu_preferences.favorites(&principal.user_id).await?)
}

/// GET /api/v1/user/menu-settings
pub async fn get_settings(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> ApiResult<UserMenuSettings> {
    ok(state.menu_preferences.get_settings(&principal.user_id).await?)
}

/// PUT /api/v1/user/menu-settings
pub async fn update_settings(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Json(payload): Json<MenuSettingsUpdate>,
) -> ApiResult<UserMenuSettings> {
    ok(state
        .menu_preferences
        .update_settings(&principal.user_id, &payload)
        .await?)
}

/// POST /api/v1/user/menu-settings/template
pub async fn apply_template(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Json(payload): Json<TemplateRequest>,
) -> ApiResult<UserMenuSettings> {
    ok(state
        .menu_preferences
        .apply_template(&principal.user_id, payload.template)
        .await?)
}

/// POST /api/v1/user/menu-settings/shortcuts
pub async fn add_shortcut(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Json(payload): Json<MenuShortcut>,
) -> ApiResult<UserMenuSettings> {
    ok(state
        .menu_preferences
        .add_shortcut(&principal.user_id, payload)
        .await?)
}

/// DELETE /api/v1/user/menu-settings/shortcuts/{key}
pub async fn remove_shortcut(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(key): Path<String>,
) -> ApiResult<UserMenuSettings> {
    ok(state
        .menu_preferences
        .remove_shortcut(&principal.user_id, &key)
        .await?)
}

/// POST /api/v1/user/menu-data-views
pub async fn add_data_view(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Json(payload): Json<AddDataViewItem>,
) -> ApiResult<MenuItem> {
    ok(state
        .menu_definitions
        .add_user_data_view(&principal.user_id, payload)
        .await?)
}
