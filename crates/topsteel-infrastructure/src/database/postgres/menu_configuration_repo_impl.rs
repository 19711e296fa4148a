// ============================================================================
// TopSteel Infrastructure - PostgreSQL Menu Configuration Repository
// File: crates/topsteel-infrastructure/src/database/postgres/menu_configuration_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use tracing::{error, info, warn};
use uuid::Uuid;

use topsteel_core::domain::{MenuConfiguration, MenuItem};
use topsteel_core::error::DomainError;
use topsteel_core::repositories::MenuConfigurationRepository;
use topsteel_shared::AuditFields;

use super::menu_item_repo_impl::insert_item;

/// Serializes concurrent activations
const ACTIVATION_LOCK_KEY: i64 = 0x6d65_6e75_6163_7476;

const CONFIG_COLUMNS: &str = r#"
    id, name, description, is_active, is_system,
    created_at, created_by, modified_at, modified_by, removed_at, removed_by
"#;

pub struct PgMenuConfigurationRepository {
    pool: PgPool,
}

impl PgMenuConfigurationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct MenuConfigurationRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub is_system: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
    pub removed_at: Option<DateTime<Utc>>,
    pub removed_by: Option<Uuid>,
}

impl From<MenuConfigurationRow> for MenuConfiguration {
    fn from(row: MenuConfigurationRow) -> Self {
        MenuConfiguration {
            id: row.id,
            name: row.name,
            description: row.description,
            is_active: row.is_active,
            is_system: row.is_system,
            audit: AuditFields {
                created_at: row.created_at,
                created_by: row.created_by,
                modified_at: row.modified_at,
                modified_by: row.modified_by,
                removed_at: row.removed_at,
                removed_by: row.removed_by,
            },
        }
    }
}

async fn update_config_row(
    conn: &mut PgConnection,
    config: &MenuConfiguration,
) -> Result<MenuConfiguration, DomainError> {
    let sql = format!(
        r#"
        UPDATE menu_configurations
        SET name = $2, description = $3, modified_at = $4, modified_by = $5
        WHERE id = $1 AND removed_at IS NULL
        RETURNING {}
        "#,
        CONFIG_COLUMNS
    );

    let row: Option<MenuConfigurationRow> = sqlx::query_as(&sql)
        .bind(config.id)
        .bind(&config.name)
        .bind(&config.description)
        .bind(config.audit.modified_at)
        .bind(config.audit.modified_by)
        .fetch_optional(conn)
        .await
        .map_err(|e: sqlx::Error| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return DomainError::ConfigurationNameAlreadyExists(config.name.clone());
                }
            }
            error!("Database error updating menu configuration: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

    row.map(|r| r.into())
        .ok_or(DomainError::ConfigurationNotFound(config.id))
}

#[async_trait]
impl MenuConfigurationRepository for PgMenuConfigurationRepository {
    async fn list_all(&self) -> Result<Vec<MenuConfiguration>, DomainError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM menu_configurations
            WHERE removed_at IS NULL
            ORDER BY is_system DESC, name ASC
            "#,
            CONFIG_COLUMNS
        );

        let rows: Vec<MenuConfigurationRow> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error listing menu configurations: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<MenuConfiguration>, DomainError> {
        let sql = format!(
            "SELECT {} FROM menu_configurations WHERE id = $1 AND removed_at IS NULL",
            CONFIG_COLUMNS
        );

        let row: Option<MenuConfigurationRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error finding menu configuration by id: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<MenuConfiguration>, DomainError> {
        let sql = format!(
            "SELECT {} FROM menu_configurations WHERE name = $1 AND removed_at IS NULL",
            CONFIG_COLUMNS
        );

        let row: Option<MenuConfigurationRow> = sqlx::query_as(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error finding menu configuration by name: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_active(&self) -> Result<Option<MenuConfiguration>, DomainError> {
        let sql = format!(
            "SELECT {} FROM menu_configurations WHERE is_active AND removed_at IS NULL",
            CONFIG_COLUMNS
        );

        let row: Option<MenuConfigurationRow> = sqlx::query_as(&sql)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error finding active menu configuration: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;

        Ok(row.map(|r| r.into()))
    }

    async fn create(
        &self,
        config: &MenuConfiguration,
        items: &[MenuItem],
    ) -> Result<MenuConfiguration, DomainError> {
        info!("Creating menu configuration: {}", config.name);

        let mut tx = self.pool.begin().await.map_err(|e: sqlx::Error| {
            error!("Database error starting transaction: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        let sql = format!(
            r#"
            INSERT INTO menu_configurations (
                id, name, description, is_active, is_system, created_at, created_by
            )
            VALUES ($1, $2, $3, FALSE, $4, $5, $6)
            RETURNING {}
            "#,
            CONFIG_COLUMNS
        );

        let row: MenuConfigurationRow = sqlx::query_as(&sql)
            .bind(config.id)
            .bind(&config.name)
            .bind(&config.description)
            .bind(config.is_system)
            .bind(config.audit.created_at)
            .bind(config.audit.created_by)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e: sqlx::Error| {
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_unique_violation() {
                        return DomainError::ConfigurationNameAlreadyExists(config.name.clone());
                    }
                }
                error!("Database error creating menu configuration: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;

        for item in items {
            insert_item(&mut tx, item).await?;
        }

        tx.commit().await.map_err(|e: sqlx::Error| {
            error!("Database error committing menu configuration: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(row.into())
    }

    async fn update(&self, config: &MenuConfiguration) -> Result<MenuConfiguration, DomainError> {
        let mut conn = self.pool.acquire().await.map_err(|e: sqlx::Error| {
            error!("Database error acquiring connection: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        update_config_row(&mut conn, config).await
    }

    async fn update_with_items(
        &self,
        config: &MenuConfiguration,
        items: &[MenuItem],
    ) -> Result<MenuConfiguration, DomainError> {
        let mut tx = self.pool.begin().await.map_err(|e: sqlx::Error| {
            error!("Database error starting transaction: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        // Dropping the transaction on any early return rolls both writes back
        let updated = update_config_row(&mut tx, config).await?;

        sqlx::query("DELETE FROM menu_items WHERE config_id = $1")
            .bind(config.id)
            .execute(&mut *tx)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error clearing menu items of {}: {}", config.id, e);
                DomainError::DatabaseError(e.to_string())
            })?;

        for item in items {
            insert_item(&mut tx, item).await?;
        }

        tx.commit().await.map_err(|e: sqlx::Error| {
            error!("Database error committing menu configuration {}: {}", config.id, e);
            DomainError::DatabaseError(e.to_string())
        })?;

        info!("Updated menu configuration {} with {} items", config.id, items.len());
        Ok(updated)
    }

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM menu_configurations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error deleting menu configuration: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ConfigurationNotFound(*id));
        }
        Ok(())
    }

    async fn activate(&self, id: &Uuid) -> Result<MenuConfiguration, DomainError> {
        let mut tx = self.pool.begin().await.map_err(|e: sqlx::Error| {
            error!("Database error starting transaction: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(ACTIVATION_LOCK_KEY)
            .execute(&mut *tx)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error locking menu activation: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;

        let target: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM menu_configurations WHERE id = $1 AND removed_at IS NULL FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error locking menu configuration {}: {}", id, e);
            DomainError::DatabaseError(e.to_string())
        })?;

        if target.is_none() {
            warn!("Activation of unknown menu configuration {}", id);
            // Dropping the transaction rolls it back
            return Err(DomainError::ConfigurationNotFound(*id));
        }

        sqlx::query(
            r#"
            UPDATE menu_configurations
            SET is_active = FALSE, modified_at = NOW()
            WHERE is_active AND id <> $1
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error deactivating menu configurations: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        let sql = format!(
            r#"
            UPDATE menu_configurations
            SET is_active = TRUE, modified_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            CONFIG_COLUMNS
        );

        let row: MenuConfigurationRow = sqlx::query_as(&sql)
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error activating menu configuration {}: {}", id, e);
                DomainError::DatabaseError(e.to_string())
            })?;

        tx.commit().await.map_err(|e: sqlx::Error| {
            error!("Database error committing activation: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(row.into())
    }
}
