// ============================================================================
// TopSteel API - Parameter Handlers
// File: crates/topsteel-api/src/handlers/parameters.rs
// ============================================================================
//! Scoped parameter lookup and administration.
//!
//! Client-scope parameters belong to the caller's société. System and
//! application parameters are readable by any caller and writable by
//! administrators only.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use topsteel_core::domain::{
    Parameter, ParameterMetadata, ParameterScope, ParameterType, ParameterUpdate, ParameterValue,
    ParameterView, Principal,
};
use topsteel_core::services::parameter_service::ClientPreferences;
use topsteel_core::DomainError;
use topsteel_shared::constants::{DEFAULT_LANGUAGE, ROLE_ADMIN, ROLE_SUPER_ADMIN};

use super::{ok, ApiResult};
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LangQuery {
    pub lang: Option<String>,
}

impl LangQuery {
    fn lang(&self) -> &str {
        self.lang.as_deref().filter(|l| !l.is_empty()).unwrap_or(DEFAULT_LANGUAGE)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateParameterRequest {
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(rename = "type", default)]
    pub value_type: ParameterType,
    #[serde(default)]
    pub array_values: Option<Vec<String>>,
    #[serde(default)]
    pub object_values: Option<Value>,
    #[serde(default)]
    pub metadata: ParameterMetadata,
    #[serde(default)]
    pub is_readonly: bool,
    #[serde(default)]
    pub translation_key: Option<String>,
    #[serde(default)]
    pub custom_translations: HashMap<String, String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Owner of a per-user client parameter
    #[serde(default)]
    pub user_id: Option<Uuid>,
    /// Filled from the tenant context when absent
    #[serde(default)]
    pub societe_id: Option<Uuid>,
}

fn parse_scope(scope: &str) -> Result<ParameterScope, ApiError> {
    ParameterScope::from_str(scope)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown parameter scope '{}'", scope)))
}

fn tenant_of(principal: &Principal) -> Option<Uuid> {
    principal.tenant.map(|t| t.societe_id)
}

fn is_admin(principal: &Principal) -> bool {
    principal.has_any_role(&[ROLE_ADMIN, ROLE_SUPER_ADMIN])
}

fn require_write_access(principal: &Principal, scope: ParameterScope) -> Result<(), ApiError> {
    match scope {
        ParameterScope::Client => Ok(()),
        _ if is_admin(principal) => Ok(()),
        _ => Err(ApiError::Forbidden(format!(
            "Administrator role required to change {} parameters",
            scope
        ))),
    }
}

/// GET /api/v1/parameters/client
pub async fn client_preferences(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Query(query): Query<LangQuery>,
) -> ApiResult<ClientPreferences> {
    let Some(tenant_id) = tenant_of(&principal) else {
        return ok(ClientPreferences::new());
    };

    ok(state
        .parameters
        .client_preferences(&tenant_id, Some(principal.user_id), query.lang())
        .await?)
}

/// GET /api/v1/parameters/{scope}/{group}
pub async fn get_group(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path((scope, group)): Path<(String, String)>,
    Query(query): Query<LangQuery>,
) -> ApiResult<Vec<ParameterView>> {
    let scope = parse_scope(&scope)?;
    ok(state
        .parameters
        .get_group(scope, &group, tenant_of(&principal), query.lang())
        .await?)
}

/// GET /api/v1/parameters/{scope}/{group}/{key}
pub async fn get_parameter(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path((scope, group, key)): Path<(String, String, String)>,
    Query(query): Query<LangQuery>,
) -> ApiResult<ParameterView> {
    let scope = parse_scope(&scope)?;
    ok(state
        .parameters
        .get_parameter(scope, &group, &key, tenant_of(&principal), query.lang())
        .await?)
}

/// GET /api/v1/parameters/{scope}/{group}/{key}/typed
pub async fn get_typed(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path((scope, group, key)): Path<(String, String, String)>,
) -> ApiResult<ParameterValue> {
    let scope = parse_scope(&scope)?;
    ok(state
        .parameters
        .get_typed(scope, &group, &key, tenant_of(&principal))
        .await?)
}

/// POST /api/v1/parameters/{scope}/{group}
pub async fn create_parameter(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path((scope, group)): Path<(String, String)>,
    Json(payload): Json<CreateParameterRequest>,
) -> ApiResult<Parameter> {
    let scope = parse_scope(&scope)?;
    require_write_access(&principal, scope)?;

    let mut parameter = Parameter::new(scope, group, payload.key, payload.value, payload.value_type)
        .map_err(DomainError::from)?;
    parameter.array_values = payload.array_values;
    parameter.object_values = payload.object_values;
    parameter.metadata = payload.metadata;
    parameter.is_readonly = payload.is_readonly;
    parameter.translation_key = payload.translation_key;
    parameter.custom_translations = payload.custom_translations;
    parameter.description = payload.description;

    if scope == ParameterScope::Client {
        let caller_tenant = tenant_of(&principal);
        if let (Some(body), Some(caller)) = (payload.societe_id, caller_tenant) {
            if body != caller {
                return Err(ApiError::Forbidden(
                    "Cannot create parameters for another société".to_string(),
                ));
            }
        }
        if payload.user_id.is_some_and(|u| u != principal.user_id) && !is_admin(&principal) {
            return Err(ApiError::Forbidden(
                "Cannot create parameters for another user".to_string(),
            ));
        }
        // Set by the tenant injection layer when the client leaves it out
        parameter.tenant_id = payload.societe_id;
        parameter.user_id = payload.user_id;
    }

    ok(state
        .parameters
        .create_parameter(parameter, Some(principal.user_id))
        .await?)
}

/// PUT /api/v1/parameters/{scope}/{group}/{key}
pub async fn update_parameter(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path((scope, group, key)): Path<(String, String, String)>,
    Json(payload): Json<ParameterUpdate>,
) -> ApiResult<Parameter> {
    let scope = parse_scope(&scope)?;
    require_write_access(&principal, scope)?;

    ok(state
        .parameters
        .update_parameter(
            scope,
            &group,
            &key,
            tenant_of(&principal),
            payload,
            Some(principal.user_id),
        )
        .await?)
}
