// ============================================================================
// TopSteel Infrastructure - PostgreSQL Menu Item Repository
// File: crates/topsteel-infrastructure/src/database/postgres/menu_item_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use tracing::{error, warn};
use uuid::Uuid;

use topsteel_core::domain::{MenuItem, MenuItemKind};
use topsteel_core::error::DomainError;
use topsteel_core::repositories::MenuItemRepository;
use topsteel_shared::AuditFields;

pub(crate) const MENU_ITEM_COLUMNS: &str = r#"
    id, config_id, parent_id, title, title_key, icon,
    type AS item_type, program_id, external_url, query_builder_id,
    order_index, is_visible, required_roles, required_permissions,
    created_at, created_by, modified_at, modified_by, removed_at, removed_by
"#;

pub struct PgMenuItemRepository {
    pool: PgPool,
}

impl PgMenuItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
pub(crate) struct MenuItemRow {
    pub id: Uuid,
    pub config_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub title: String,
    pub title_key: Option<String>,
    pub icon: Option<String>,
    pub item_type: String,
    pub program_id: Option<String>,
    pub external_url: Option<String>,
    pub query_builder_id: Option<String>,
    pub order_index: i32,
    pub is_visible: bool,
    pub required_roles: Vec<String>,
    pub required_permissions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
    pub removed_at: Option<DateTime<Utc>>,
    pub removed_by: Option<Uuid>,
}

impl From<MenuItemRow> for MenuItem {
    fn from(row: MenuItemRow) -> Self {
        let kind = MenuItemKind::from_parts(
            &row.item_type,
            row.program_id,
            row.external_url,
            row.query_builder_id,
        )
        .unwrap_or_else(|| {
            warn!("Unknown menu item type '{}' on item {}, treating it as a folder", row.item_type, row.id);
            MenuItemKind::default()
        });

        MenuItem {
            id: row.id,
            config_id: row.config_id,
            parent_id: row.parent_id,
            title: row.title,
            title_key: row.title_key,
            icon: row.icon,
            kind,
            order_index: row.order_index,
            is_visible: row.is_visible,
            required_roles: row.required_roles,
            required_permissions: row.required_permissions,
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

/// Insert one item on an open connection or transaction
pub(crate) async fn insert_item(conn: &mut PgConnection, item: &MenuItem) -> Result<MenuItem, DomainError> {
    let sql = format!(
        r#"
        INSERT INTO menu_items (
            id, config_id, parent_id, title, title_key, icon,
            type, program_id, external_url, query_builder_id,
            order_index, is_visible, required_roles, required_permissions,
            created_at, created_by
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        RETURNING {}
        "#,
        MENU_ITEM_COLUMNS
    );

    let row: MenuItemRow = sqlx::query_as(&sql)
        .bind(item.id)
        .bind(item.config_id)
        .bind(item.parent_id)
        .bind(&item.title)
        .bind(&item.title_key)
        .bind(&item.icon)
        .bind(item.kind.code())
        .bind(item.kind.program_id())
        .bind(item.kind.external_url())
        .bind(item.kind.query_builder_id())
        .bind(item.order_index)
        .bind(item.is_visible)
        .bind(&item.required_roles)
        .bind(&item.required_permissions)
        .bind(item.audit.created_at)
        .bind(item.audit.created_by)
        .fetch_one(conn)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error inserting menu item {}: {}", item.id, e);
            DomainError::DatabaseError(e.to_string())
        })?;

    Ok(row.into())
}

#[async_trait]
impl MenuItemRepository for PgMenuItemRepository {
    async fn list_by_config(&self, config_id: &Uuid) -> Result<Vec<MenuItem>, DomainError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM menu_items
            WHERE config_id = $1 AND removed_at IS NULL
            ORDER BY parent_id NULLS FIRST, order_index, seq
            "#,
            MENU_ITEM_COLUMNS
        );

        let rows: Vec<MenuItemRow> = sqlx::query_as(&sql)
            .bind(config_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error listing menu items of {}: {}", config_id, e);
                DomainError::DatabaseError(e.to_string())
            })?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<MenuItem>, DomainError> {
        let sql = format!(
            "SELECT {} FROM menu_items WHERE id = $1 AND removed_at IS NULL",
            MENU_ITEM_COLUMNS
        );

        let row: Option<MenuItemRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error finding menu item by id: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;

        Ok(row.map(|r| r.into()))
    }

    async fn insert(&self, item: &MenuItem) -> Result<MenuItem, DomainError> {
        let mut conn = self.pool.acquire().await.map_err(|e: sqlx::Error| {
            error!("Database error acquiring connection: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        insert_item(&mut conn, item).await
    }

    async fn soft_delete(&self, ids: &[Uuid], removed_by: Option<Uuid>) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE menu_items
            SET removed_at = NOW(), removed_by = $2
            WHERE id = ANY($1) AND removed_at IS NULL
            "#,
        )
        .bind(ids)
        .bind(removed_by)
        .execute(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error soft deleting menu items: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(result.rows_affected())
    }
}
