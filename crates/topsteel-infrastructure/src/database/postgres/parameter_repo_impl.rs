// ============================================================================
// TopSteel Infrastructure - PostgreSQL Parameter Repository
// File: crates/topsteel-infrastructure/src/database/postgres/parameter_repo_impl.rs
// Description: One table per scope; client rows are read under the tenant RLS context
// ============================================================================

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use sqlx::types::Json;
use sqlx::{FromRow, PgConnection, PgPool};
use tracing::{error, info};
use uuid::Uuid;

use topsteel_core::domain::{Parameter, ParameterMetadata, ParameterScope, ParameterType, TenantContext};
use topsteel_core::error::DomainError;
use topsteel_core::repositories::ParameterRepository;
use topsteel_core::services::with_tenant_context;
use topsteel_shared::AuditFields;

use crate::database::PgTenantSession;

const PARAMETER_COLUMNS: &str = r#"
    id, "group" AS param_group, key AS param_key, value, type AS value_type,
    array_values, object_values, metadata, is_active, is_readonly,
    translation_key, custom_translations, description,
    created_at, created_by, modified_at, modified_by, removed_at, removed_by
"#;

fn table(scope: ParameterScope) -> &'static str {
    match scope {
        ParameterScope::System => "parameters_system",
        ParameterScope::Application => "parameters_application",
        ParameterScope::Client => "parameters_client",
    }
}

/// Column list including the owner columns, which only the client table has
fn returning(scope: ParameterScope) -> String {
    match scope {
        ParameterScope::Client => format!("{}, tenant_id, user_id", PARAMETER_COLUMNS),
        _ => format!("{}, NULL::uuid AS tenant_id, NULL::uuid AS user_id", PARAMETER_COLUMNS),
    }
}

fn missing_tenant() -> DomainError {
    DomainError::ValidationError("client parameters require a tenant".to_string())
}

pub struct PgParameterRepository {
    pool: PgPool,
}

impl PgParameterRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn with_tenant<T, F>(&self, tenant_id: Uuid, f: F) -> Result<T, DomainError>
    where
        T: Send,
        F: for<'a> FnOnce(&'a mut PgTenantSession) -> BoxFuture<'a, Result<T, DomainError>> + Send,
    {
        let mut session = PgTenantSession::acquire(&self.pool).await?;
        let ctx = TenantContext::new(tenant_id, None);
        with_tenant_context(&mut session, Some(&ctx), f).await
    }

    async fn unscoped(&self) -> Result<sqlx::pool::PoolConnection<sqlx::Postgres>, DomainError> {
        self.pool.acquire().await.map_err(|e: sqlx::Error| {
            error!("Database error acquiring connection: {}", e);
            DomainError::DatabaseError(e.to_string())
        })
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct ParameterRow {
    pub id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub param_group: String,
    pub param_key: String,
    pub value: String,
    pub value_type: String,
    pub array_values: Option<Vec<String>>,
    pub object_values: Option<serde_json::Value>,
    pub metadata: Json<ParameterMetadata>,
    pub is_active: bool,
    pub is_readonly: bool,
    pub translation_key: Option<String>,
    pub custom_translations: Json<HashMap<String, String>>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
    pub removed_at: Option<DateTime<Utc>>,
    pub removed_by: Option<Uuid>,
}

impl ParameterRow {
    fn into_parameter(self, scope: ParameterScope) -> Result<Parameter, DomainError> {
        let value_type = ParameterType::from_str(&self.value_type).ok_or_else(|| {
            error!(
                "Unknown parameter type '{}' stored for {}.{}.{}",
                self.value_type, scope, self.param_group, self.param_key
            );
            DomainError::DatabaseError(format!("unknown parameter type '{}'", self.value_type))
        })?;

        Ok(Parameter {
            id: self.id,
            scope,
            tenant_id: self.tenant_id,
            user_id: self.user_id,
            group: self.param_group,
            key: self.param_key,
            value: self.value,
            value_type,
            array_values: self.array_values,
            object_values: self.object_values,
            metadata: self.metadata.0,
            is_active: self.is_active,
            is_readonly: self.is_readonly,
            translation_key: self.translation_key,
            custom_translations: self.custom_translations.0,
            description: self.description,
            audit: AuditFields {
                created_at: self.created_at,
                created_by: self.created_by,
                modified_at: self.modified_at,
                modified_by: self.modified_by,
                removed_at: self.removed_at,
                removed_by: self.removed_by,
            },
        })
    }
}

async fn select_one(
    conn: &mut PgConnection,
    scope: ParameterScope,
    group: &str,
    key: &str,
    tenant_id: Option<Uuid>,
) -> Result<Option<Parameter>, DomainError> {
    let owner_filter = match scope {
        ParameterScope::Client => "AND tenant_id = $3 AND user_id IS NULL",
        _ => "",
    };
    let sql = format!(
        r#"SELECT {} FROM {} WHERE "group" = $1 AND key = $2 AND removed_at IS NULL {}"#,
        returning(scope),
        table(scope),
        owner_filter
    );

    let mut query = sqlx::query_as::<_, ParameterRow>(&sql).bind(group).bind(key);
    if scope == ParameterScope::Client {
        query = query.bind(tenant_id);
    }

    let row = query.fetch_optional(conn).await.map_err(|e: sqlx::Error| {
        error!("Database error finding parameter {}.{}.{}: {}", scope, group, key, e);
        DomainError::DatabaseError(e.to_string())
    })?;

    row.map(|r| r.into_parameter(scope)).transpose()
}

async fn select_group(
    conn: &mut PgConnection,
    scope: ParameterScope,
    group: &str,
    tenant_id: Option<Uuid>,
) -> Result<Vec<Parameter>, DomainError> {
    let owner_filter = match scope {
        ParameterScope::Client => "AND tenant_id = $2 AND user_id IS NULL",
        _ => "",
    };
    let sql = format!(
        r#"SELECT {} FROM {} WHERE "group" = $1 AND removed_at IS NULL {} ORDER BY key"#,
        returning(scope),
        table(scope),
        owner_filter
    );

    let mut query = sqlx::query_as::<_, ParameterRow>(&sql).bind(group);
    if scope == ParameterScope::Client {
        query = query.bind(tenant_id);
    }

    let rows = query.fetch_all(conn).await.map_err(|e: sqlx::Error| {
        error!("Database error listing parameter group {}.{}: {}", scope, group, e);
        DomainError::DatabaseError(e.to_string())
    })?;

    rows.into_iter().map(|r| r.into_parameter(scope)).collect()
}

async fn insert_parameter(conn: &mut PgConnection, parameter: &Parameter) -> Result<Parameter, DomainError> {
    let scope = parameter.scope;
    let (owner_columns, owner_values) = match scope {
        ParameterScope::Client => (", tenant_id, user_id", ", $16, $17"),
        _ => ("", ""),
    };
    let sql = format!(
        r#"
        INSERT INTO {} (
            id, "group", key, value, type, array_values, object_values, metadata,
            is_active, is_readonly, translation_key, custom_translations, description,
            created_at, created_by{}
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15{})
        RETURNING {}
        "#,
        table(scope),
        owner_columns,
        owner_values,
        returning(scope)
    );

    let mut query = sqlx::query_as::<_, ParameterRow>(&sql)
        .bind(parameter.id)
        .bind(&parameter.group)
        .bind(&parameter.key)
        .bind(&parameter.value)
        .bind(parameter.value_type.as_str())
        .bind(&parameter.array_values)
        .bind(&parameter.object_values)
        .bind(Json(&parameter.metadata))
        .bind(parameter.is_active)
        .bind(parameter.is_readonly)
        .bind(&parameter.translation_key)
        .bind(Json(&parameter.custom_translations))
        .bind(&parameter.description)
        .bind(parameter.audit.created_at)
        .bind(parameter.audit.created_by);
    if scope == ParameterScope::Client {
        query = query.bind(parameter.tenant_id).bind(parameter.user_id);
    }

    let row = query.fetch_one(conn).await.map_err(|e: sqlx::Error| {
        if let Some(db_err) = e.as_database_error() {
            if db_err.is_unique_violation() {
                return DomainError::ParameterAlreadyExists {
                    scope,
                    group: parameter.group.clone(),
                    key: parameter.key.clone(),
                };
            }
        }
        error!("Database error creating parameter: {}", e);
        DomainError::DatabaseError(e.to_string())
    })?;

    row.into_parameter(scope)
}

async fn update_parameter(conn: &mut PgConnection, parameter: &Parameter) -> Result<Parameter, DomainError> {
    let scope = parameter.scope;
    let sql = format!(
        r#"
        UPDATE {}
        SET value = $2, array_values = $3, object_values = $4, metadata = $5,
            is_active = $6, custom_translations = $7, description = $8,
            modified_at = $9, modified_by = $10
        WHERE id = $1 AND removed_at IS NULL
        RETURNING {}
        "#,
        table(scope),
        returning(scope)
    );

    let row: Option<ParameterRow> = sqlx::query_as(&sql)
        .bind(parameter.id)
        .bind(&parameter.value)
        .bind(&parameter.array_values)
        .bind(&parameter.object_values)
        .bind(Json(&parameter.metadata))
        .bind(parameter.is_active)
        .bind(Json(&parameter.custom_translations))
        .bind(&parameter.description)
        .bind(parameter.audit.modified_at)
        .bind(parameter.audit.modified_by)
        .fetch_optional(conn)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error updating parameter: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

    row.ok_or_else(|| DomainError::ParameterNotFound {
        scope,
        group: parameter.group.clone(),
        key: parameter.key.clone(),
    })?
    .into_parameter(scope)
}

#[async_trait]
impl ParameterRepository for PgParameterRepository {
    async fn find(
        &self,
        scope: ParameterScope,
        group: &str,
        key: &str,
        tenant_id: Option<Uuid>,
    ) -> Result<Option<Parameter>, DomainError> {
        if scope != ParameterScope::Client {
            let mut conn = self.unscoped().await?;
            return select_one(&mut conn, scope, group, key, None).await;
        }

        let tenant = tenant_id.ok_or_else(missing_tenant)?;
        let (group, key) = (group.to_string(), key.to_string());
        self.with_tenant(tenant, move |s| {
            Box::pin(async move { select_one(s.connection()?, scope, &group, &key, Some(tenant)).await })
        })
        .await
    }

    async fn list_group(
        &self,
        scope: ParameterScope,
        group: &str,
        tenant_id: Option<Uuid>,
    ) -> Result<Vec<Parameter>, DomainError> {
        if scope != ParameterScope::Client {
            let mut conn = self.unscoped().await?;
            return select_group(&mut conn, scope, group, None).await;
        }

        let tenant = tenant_id.ok_or_else(missing_tenant)?;
        let group = group.to_string();
        self.with_tenant(tenant, move |s| {
            Box::pin(async move { select_group(s.connection()?, scope, &group, Some(tenant)).await })
        })
        .await
    }

    async fn list_client(
        &self,
        tenant_id: &Uuid,
        user_id: Option<Uuid>,
    ) -> Result<Vec<Parameter>, DomainError> {
        let tenant = *tenant_id;
        let sql = format!(
            r#"
            SELECT {}
            FROM parameters_client
            WHERE tenant_id = $1
              AND removed_at IS NULL
              AND (user_id IS NULL OR user_id = $2)
            ORDER BY "group", key, user_id NULLS FIRST
            "#,
            returning(ParameterScope::Client)
        );

        self.with_tenant(tenant, move |s| {
            Box::pin(async move {
                let rows: Vec<ParameterRow> = sqlx::query_as(&sql)
                    .bind(tenant)
                    .bind(user_id)
                    .fetch_all(s.connection()?)
                    .await
                    .map_err(|e: sqlx::Error| {
                        error!("Database error listing client parameters of {}: {}", tenant, e);
                        DomainError::DatabaseError(e.to_string())
                    })?;

                rows.into_iter()
                    .map(|r| r.into_parameter(ParameterScope::Client))
                    .collect()
            })
        })
        .await
    }

    async fn create(&self, parameter: &Parameter) -> Result<Parameter, DomainError> {
        info!("Creating parameter {}.{}.{}", parameter.scope, parameter.group, parameter.key);

        if parameter.scope != ParameterScope::Client {
            let mut conn = self.unscoped().await?;
            return insert_parameter(&mut conn, parameter).await;
        }

        let tenant = parameter.tenant_id.ok_or_else(missing_tenant)?;
        let parameter = parameter.clone();
        self.with_tenant(tenant, move |s| {
            Box::pin(async move { insert_parameter(s.connection()?, &parameter).await })
        })
        .await
    }

    async fn update(&self, parameter: &Parameter) -> Result<Parameter, DomainError> {
        if parameter.scope != ParameterScope::Client {
            let mut conn = self.unscoped().await?;
            return update_parameter(&mut conn, parameter).await;
        }

        let tenant = parameter.tenant_id.ok_or_else(missing_tenant)?;
        let parameter = parameter.clone();
        self.with_tenant(tenant, move |s| {
            Box::pin(async move { update_parameter(s.connection()?, &parameter).await })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(value_type: &str) -> ParameterRow {
        ParameterRow {
            id: Uuid::new_v4(),
            tenant_id: None,
            user_id: None,
            param_group: "display".to_string(),
            param_key: "theme".to_string(),
            value: "dark".to_string(),
            value_type: value_type.to_string(),
            array_values: None,
            object_values: None,
            metadata: Json(ParameterMetadata::default()),
            is_active: true,
            is_readonly: false,
            translation_key: None,
            custom_translations: Json(HashMap::new()),
            description: None,
            created_at: Utc::now(),
            created_by: None,
            modified_at: None,
            modified_by: None,
            removed_at: None,
            removed_by: None,
        }
    }

    #[test]
    fn test_row_maps_stored_type() {
        let parameter = row("string").into_parameter(ParameterScope::System).unwrap();

        assert_eq!(parameter.value_type, ParameterType::String);
        assert_eq!(parameter.scope, ParameterScope::System);
    }

    #[test]
    fn test_unknown_stored_type_is_a_database_error() {
        let err = row("MATRIX").into_parameter(ParameterScope::Application).unwrap_err();

        assert!(matches!(err, DomainError::DatabaseError(_)));
    }
}
