// ============================================================================
// TopSteel Infrastructure - PostgreSQL Tenant Session
// File: crates/topsteel-infrastructure/src/database/tenant_session.rs
// Description: Pooled connection carrying the row-level-security context
// ============================================================================

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::{PgConnection, PgPool, Postgres};
use tracing::{error, warn};

use topsteel_core::domain::TenantContext;
use topsteel_core::error::DomainError;
use topsteel_core::repositories::TenantSession;

/// Connection checked out for one tenant-scoped unit of work.
///
/// If the context cannot be cleared, or the session is dropped while a
/// context is still set, the connection is detached from the pool and closed
/// so no other request can inherit the tenant.
pub struct PgTenantSession {
    conn: Option<PoolConnection<Postgres>>,
    scoped: bool,
}

impl PgTenantSession {
    pub async fn acquire(pool: &PgPool) -> Result<Self, DomainError> {
        let conn = pool.acquire().await.map_err(|e: sqlx::Error| {
            error!("Database error acquiring tenant session: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(Self {
            conn: Some(conn),
            scoped: false,
        })
    }

    pub fn connection(&mut self) -> Result<&mut PgConnection, DomainError> {
        self.conn
            .as_deref_mut()
            .ok_or_else(|| DomainError::DatabaseError("tenant session connection was closed".to_string()))
    }

    fn discard_connection(&mut self) {
        if let Some(conn) = self.conn.take() {
            drop(conn.detach());
        }
        self.scoped = false;
    }
}

#[async_trait]
impl TenantSession for PgTenantSession {
    async fn set_context(&mut self, ctx: &TenantContext) -> Result<(), DomainError> {
        let conn = self.connection()?;
        sqlx::query("SELECT set_societe_context($1, $2)")
            .bind(ctx.societe_id)
            .bind(ctx.site_id)
            .execute(conn)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error setting societe context {}: {}", ctx.societe_id, e);
                DomainError::DatabaseError(e.to_string())
            })?;

        self.scoped = true;
        Ok(())
    }

    async fn clear_context(&mut self) -> Result<(), DomainError> {
        let conn = self.connection()?;
        let result = sqlx::query("SELECT clear_societe_context()").execute(conn).await;

        match result {
            Ok(_) => {
                self.scoped = false;
                Ok(())
            }
            Err(e) => {
                warn!("Closing connection after failed societe context clear: {}", e);
                self.discard_connection();
                Err(DomainError::DatabaseError(e.to_string()))
            }
        }
    }
}

impl Drop for PgTenantSession {
    fn drop(&mut self) {
        if self.scoped {
            warn!("Tenant session dropped with an active context, closing its connection");
            self.discard_connection();
        }
    }
}
