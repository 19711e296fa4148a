// ============================================================================
// TopSteel API - Menu Administration Handlers
// File: crates/topsteel-api/src/handlers/admin_menu.rs
// ============================================================================
//! Menu configuration CRUD, activation, import/export and item edits.
//! Every handler requires `ADMIN` or `SUPER_ADMIN`.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use topsteel_core::domain::{MenuConfiguration, MenuItem};
use topsteel_core::services::menu_definition_service::{
    AddDataViewItem, CreateMenuConfiguration, MenuConfigurationDetail, MenuConfigurationExport,
    UpdateMenuConfiguration,
};
use topsteel_core::services::menu_tree::{MenuItemInput, MenuTreeNode};

use super::{ok, ApiResult};
use crate::middleware::AdminUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    pub item: MenuItemInput,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedResponse {
    pub id: Uuid,
    pub removed: u64,
}

/// GET /api/v1/admin/menu-configurations
pub async fn list_configurations(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Vec<MenuConfiguration>> {
    ok(state.menu_definitions.list_configurations().await?)
}

/// POST /api/v1/admin/menu-configurations
pub async fn create_configuration(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<CreateMenuConfiguration>,
) -> ApiResult<MenuConfiguration> {
    ok(state
        .menu_definitions
        .create_configuration(payload, Some(admin.user_id))
        .await?)
}

/// GET /api/v1/admin/menu-configurations/{id}
pub async fn get_configuration(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<MenuConfigurationDetail> {
    ok(state.menu_definitions.get_configuration(&id).await?)
}

/// PUT /api/v1/admin/menu-configurations/{id}
pub async fn update_configuration(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMenuConfiguration>,
) -> ApiResult<MenuConfiguration> {
    ok(state
        .menu_definitions
        .update_configuration(&id, payload, Some(admin.user_id))
        .await?)
}

/// DELETE /api/v1/admin/menu-configurations/{id}
pub async fn delete_configuration(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<DeletedResponse> {
    state.menu_definitions.delete_configuration(&id).await?;
    info!("Menu configuration {} deleted by {}", id, admin.user_id);
    ok(DeletedResponse { id, removed: 1 })
}

/// POST /api/v1/admin/menu-configurations/{id}/activate
pub async fn activate_configuration(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<MenuConfiguration> {
    let activated = state.menu_definitions.activate(&id).await?;
    info!("Menu configuration {} activated by {}", id, admin.user_id);
    ok(activated)
}

/// GET /api/v1/admin/menu-configurations/{id}/tree
pub async fn configuration_tree(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<MenuTreeNode>> {
    ok(state.menu_definitions.get_menu_tree(Some(id)).await?)
}

/// GET /api/v1/admin/menu-configurations/active/tree
pub async fn active_tree(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Vec<MenuTreeNode>> {
    ok(state.menu_definitions.get_menu_tree(None).await?)
}

/// GET /api/v1/admin/menu-configurations/{id}/export
pub async fn export_configuration(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<MenuConfigurationExport> {
    ok(state.menu_definitions.export_configuration(&id).await?)
}

/// POST /api/v1/admin/menu-configurations/import
pub async fn import_configuration(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(document): Json<Value>,
) -> ApiResult<MenuConfiguration> {
    ok(state
        .menu_definitions
        .import_configuration(document, Some(admin.user_id))
        .await?)
}

/// POST /api/v1/admin/menu-configurations/default
pub async fn create_default_configuration(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<MenuConfiguration> {
    ok(state.menu_definitions.create_default_configuration().await?)
}

/// GET /api/v1/admin/menu-configurations/{id}/items
pub async fn list_items(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<MenuItem>> {
    ok(state.menu_definitions.list_items(&id).await?)
}

/// POST /api/v1/admin/menu-configurations/{id}/items
pub async fn add_item(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddItemRequest>,
) -> ApiResult<Vec<MenuItem>> {
    ok(state
        .menu_definitions
        .add_item(&id, payload.parent_id, payload.item, Some(admin.user_id))
        .await?)
}

/// POST /api/v1/admin/menu-configurations/{id}/data-views
pub async fn add_data_view_item(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddDataViewItem>,
) -> ApiResult<MenuItem> {
    ok(state
        .menu_definitions
        .add_data_view_item(&id, payload, Some(admin.user_id))
        .await?)
}

/// DELETE /api/v1/admin/menu-configurations/{id}/items/{item_id}
pub async fn remove_item(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<DeletedResponse> {
    let removed = state
        .menu_definitions
        .remove_item(&id, &item_id, Some(admin.user_id))
        .await?;
    ok(DeletedResponse { id: item_id, removed })
}
