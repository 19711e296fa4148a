// ============================================================================
// TopSteel API - Menu Handler
// File: crates/topsteel-api/src/handlers/menu.rs
// ============================================================================

use axum::extract::State;
use tracing::warn;

use topsteel_core::services::menu_resolution_service::ResolvedMenuNode;
use topsteel_core::DomainError;

use super::{ok, ApiResult};
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// Resolved menu of the caller - GET /api/v1/menu
///
/// Without an active configuration (and no fallback) the menu is empty
/// rather than an error, so navigation keeps rendering.
pub async fn get_user_menu(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> ApiResult<Vec<ResolvedMenuNode>> {
    let tree = match state
        .menu_resolution
        .resolve(&principal.user_id, &principal.roles, &principal.permissions)
        .await
    {
        Ok(tree) => tree,
        Err(DomainError::NoActiveConfiguration) => {
            warn!("No active menu configuration, serving an empty menu to {}", principal.user_id);
            Vec::new()
        }
        Err(e) => return Err(e.into()),
    };

    ok(tree)
}
