// ============================================================================
// TopSteel Infrastructure - PostgreSQL User Menu Preference Repository
// File: crates/topsteel-infrastructure/src/database/postgres/user_menu_preference_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use topsteel_core::domain::{
    MenuShortcut, PreferencePatch, UserCustomMenu, UserMenuPreference, UserMenuSettings,
};
use topsteel_core::error::DomainError;
use topsteel_core::repositories::UserMenuPreferenceRepository;
use topsteel_shared::AuditFields;

const PREFERENCE_COLUMNS: &str = r#"
    id, user_id, menu_id, is_visible, "order" AS display_order, custom_label,
    is_favorite, is_pinned, custom_icon, custom_color, custom_badge, version,
    created_at, created_by, modified_at, modified_by, removed_at, removed_by
"#;

pub struct PgUserMenuPreferenceRepository {
    pool: PgPool,
}

impl PgUserMenuPreferenceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row types for SQLx mapping
#[derive(Debug, FromRow)]
struct UserMenuPreferenceRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub menu_id: String,
    pub is_visible: bool,
    pub display_order: Option<i32>,
    pub custom_label: Option<String>,
    pub is_favorite: bool,
    pub is_pinned: bool,
    pub custom_icon: Option<String>,
    pub custom_color: Option<String>,
    pub custom_badge: Option<String>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
    pub removed_at: Option<DateTime<Utc>>,
    pub removed_by: Option<Uuid>,
}

impl From<UserMenuPreferenceRow> for UserMenuPreference {
    fn from(row: UserMenuPreferenceRow) -> Self {
        UserMenuPreference {
            id: row.id,
            user_id: row.user_id,
            menu_id: row.menu_id,
            is_visible: row.is_visible,
            order: row.display_order,
            custom_label: row.custom_label,
            is_favorite: row.is_favorite,
            is_pinned: row.is_pinned,
            custom_icon: row.custom_icon,
            custom_color: row.custom_color,
            custom_badge: row.custom_badge,
            version: row.version,
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

#[derive(Debug, FromRow)]
struct UserCustomMenuRow {
    pub user_id: Uuid,
    pub items: serde_json::Value,
    pub item_count: i32,
    pub saved_at: DateTime<Utc>,
}

impl From<UserCustomMenuRow> for UserCustomMenu {
    fn from(row: UserCustomMenuRow) -> Self {
        UserCustomMenu {
            user_id: row.user_id,
            items: row.items,
            item_count: row.item_count,
            saved_at: row.saved_at,
        }
    }
}

const SETTINGS_COLUMNS: &str = r#"
    user_id, layout_type, show_icons, show_badges, allow_collapse, theme,
    use_custom_layout, shortcuts, updated_at
"#;

#[derive(Debug, FromRow)]
struct UserMenuSettingsRow {
    pub user_id: Uuid,
    pub layout_type: String,
    pub show_icons: bool,
    pub show_badges: bool,
    pub allow_collapse: bool,
    pub theme: String,
    pub use_custom_layout: bool,
    pub shortcuts: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

impl From<UserMenuSettingsRow> for UserMenuSettings {
    fn from(row: UserMenuSettingsRow) -> Self {
        let shortcuts = serde_json::from_value::<Vec<MenuShortcut>>(row.shortcuts).unwrap_or_else(|e| {
            warn!("Dropping unreadable shortcuts of user {}: {}", row.user_id, e);
            Vec::new()
        });

        UserMenuSettings {
            user_id: row.user_id,
            layout_type: row.layout_type,
            show_icons: row.show_icons,
            show_badges: row.show_badges,
            allow_collapse: row.allow_collapse,
            theme: row.theme,
            use_custom_layout: row.use_custom_layout,
            shortcuts,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl UserMenuPreferenceRepository for PgUserMenuPreferenceRepository {
    async fn list_by_user(&self, user_id: &Uuid) -> Result<Vec<UserMenuPreference>, DomainError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM user_menu_preference_items
            WHERE user_id = $1 AND removed_at IS NULL
            ORDER BY "order" NULLS LAST, menu_id
            "#,
            PREFERENCE_COLUMNS
        );

        let rows: Vec<UserMenuPreferenceRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error listing menu preferences: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn upsert(
        &self,
        user_id: &Uuid,
        menu_id: &str,
        patch: &PreferencePatch,
    ) -> Result<UserMenuPreference, DomainError> {
        // A soft-deleted row counts as version 0 and restarts from defaults.
        // The INSERT branch only runs when no row exists or the caller
        // expects version 0.
        let sql = format!(
            r#"
            INSERT INTO user_menu_preference_items AS p (
                id, user_id, menu_id, is_visible, "order", custom_label,
                is_favorite, is_pinned, custom_icon, custom_color, custom_badge,
                version, created_at, created_by
            )
            SELECT $1, $2, $3, COALESCE($4::BOOLEAN, TRUE), $5::INT,
                   NULLIF(BTRIM($6::TEXT), ''),
                   COALESCE($8::BOOLEAN, FALSE), COALESCE($9::BOOLEAN, FALSE),
                   NULLIF(BTRIM($10::TEXT), ''), NULLIF(BTRIM($11::TEXT), ''),
                   NULLIF(BTRIM($12::TEXT), ''),
                   1, NOW(), $2
            WHERE $7::INT IS NULL
               OR $7::INT = 0
               OR EXISTS (
                   SELECT 1 FROM user_menu_preference_items
                   WHERE user_id = $2 AND menu_id = $3
               )
            ON CONFLICT (user_id, menu_id) DO UPDATE SET
                is_visible = COALESCE(
                    $4::BOOLEAN,
                    CASE WHEN p.removed_at IS NULL THEN p.is_visible ELSE TRUE END
                ),
                "order" = CASE
                    WHEN $5::INT IS NOT NULL THEN $5::INT
                    WHEN p.removed_at IS NULL THEN p."order"
                    ELSE NULL
                END,
                custom_label = CASE
                    WHEN $6::TEXT IS NOT NULL THEN NULLIF(BTRIM($6::TEXT), '')
                    WHEN p.removed_at IS NULL THEN p.custom_label
                    ELSE NULL
                END,
                is_favorite = COALESCE(
                    $8::BOOLEAN,
                    CASE WHEN p.removed_at IS NULL THEN p.is_favorite ELSE FALSE END
                ),
                is_pinned = COALESCE(
                    $9::BOOLEAN,
                    CASE WHEN p.removed_at IS NULL THEN p.is_pinned ELSE FALSE END
                ),
                custom_icon = CASE
                    WHEN $10::TEXT IS NOT NULL THEN NULLIF(BTRIM($10::TEXT), '')
                    WHEN p.removed_at IS NULL THEN p.custom_icon
                    ELSE NULL
                END,
                custom_color = CASE
                    WHEN $11::TEXT IS NOT NULL THEN NULLIF(BTRIM($11::TEXT), '')
                    WHEN p.removed_at IS NULL THEN p.custom_color
                    ELSE NULL
                END,
                custom_badge = CASE
                    WHEN $12::TEXT IS NOT NULL THEN NULLIF(BTRIM($12::TEXT), '')
                    WHEN p.removed_at IS NULL THEN p.custom_badge
                    ELSE NULL
                END,
                version = CASE WHEN p.removed_at IS NULL THEN p.version + 1 ELSE 1 END,
                modified_at = NOW(),
                modified_by = $2,
                removed_at = NULL,
                removed_by = NULL
            WHERE $7::INT IS NULL
               OR (CASE WHEN p.removed_at IS NULL THEN p.version ELSE 0 END) = $7::INT
            RETURNING {}
            "#,
            PREFERENCE_COLUMNS
        );

        let row: Option<UserMenuPreferenceRow> = sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(menu_id)
            .bind(patch.is_visible)
            .bind(patch.order)
            .bind(&patch.custom_label)
            .bind(patch.expected_version)
            .bind(patch.is_favorite)
            .bind(patch.is_pinned)
            .bind(&patch.custom_icon)
            .bind(&patch.custom_color)
            .bind(&patch.custom_badge)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error upserting menu preference {}: {}", menu_id, e);
                DomainError::DatabaseError(e.to_string())
            })?;

        match row {
            Some(row) => {
                debug!("Menu preference {} of user {} now at version {}", menu_id, user_id, row.version);
                Ok(row.into())
            }
            None => Err(DomainError::VersionConflict {
                menu_id: menu_id.to_string(),
                expected: patch.expected_version.unwrap_or_default(),
            }),
        }
    }

    async fn soft_delete_all(&self, user_id: &Uuid) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE user_menu_preference_items
            SET removed_at = NOW(), removed_by = $1
            WHERE user_id = $1 AND removed_at IS NULL
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error resetting menu preferences: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        info!("Reset {} menu preferences for user {}", result.rows_affected(), user_id);
        Ok(result.rows_affected())
    }

    async fn find_custom_menu(&self, user_id: &Uuid) -> Result<Option<UserCustomMenu>, DomainError> {
        let row: Option<UserCustomMenuRow> = sqlx::query_as(
            "SELECT user_id, items, item_count, saved_at FROM user_custom_menus WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error finding custom menu: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(row.map(|r| r.into()))
    }

    async fn save_custom_menu(&self, menu: &UserCustomMenu) -> Result<UserCustomMenu, DomainError> {
        let row: UserCustomMenuRow = sqlx::query_as(
            r#"
            INSERT INTO user_custom_menus (user_id, items, item_count, saved_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE SET
                items = EXCLUDED.items,
                item_count = EXCLUDED.item_count,
                saved_at = EXCLUDED.saved_at
            RETURNING user_id, items, item_count, saved_at
            "#,
        )
        .bind(menu.user_id)
        .bind(&menu.items)
        .bind(menu.item_count)
        .bind(menu.saved_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error saving custom menu: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(row.into())
    }

    async fn find_settings(&self, user_id: &Uuid) -> Result<Option<UserMenuSettings>, DomainError> {
        let sql = format!("SELECT {} FROM user_menu_settings WHERE user_id = $1", SETTINGS_COLUMNS);

        let row: Option<UserMenuSettingsRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error finding menu settings: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;

        Ok(row.map(|r| r.into()))
    }

    async fn save_settings(&self, settings: &UserMenuSettings) -> Result<UserMenuSettings, DomainError> {
        let shortcuts = serde_json::to_value(&settings.shortcuts)
            .map_err(|e| DomainError::InternalError(e.to_string()))?;

        let sql = format!(
            r#"
            INSERT INTO user_menu_settings (
                user_id, layout_type, show_icons, show_badges, allow_collapse, theme,
                use_custom_layout, shortcuts, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (user_id) DO UPDATE SET
                layout_type = EXCLUDED.layout_type,
                show_icons = EXCLUDED.show_icons,
                show_badges = EXCLUDED.show_badges,
                allow_collapse = EXCLUDED.allow_collapse,
                theme = EXCLUDED.theme,
                use_custom_layout = EXCLUDED.use_custom_layout,
                shortcuts = EXCLUDED.shortcuts,
                updated_at = EXCLUDED.updated_at
            RETURNING {}
            "#,
            SETTINGS_COLUMNS
        );

        let row: UserMenuSettingsRow = sqlx::query_as(&sql)
            .bind(settings.user_id)
            .bind(&settings.layout_type)
            .bind(settings.show_icons)
            .bind(settings.show_badges)
            .bind(settings.allow_collapse)
            .bind(&settings.theme)
            .bind(settings.use_custom_layout)
            .bind(shortcuts)
            .bind(settings.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error saving menu settings: {}", e);
                DomainError::DatabaseError(e.to_string())
            })?;

        debug!("Saved menu settings of user {}", settings.user_id);
        Ok(row.into())
    }
}
