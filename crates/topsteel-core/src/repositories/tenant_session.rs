//! Row-level-security session context (port)

use async_trait::async_trait;
use crate::domain::TenantContext;
use crate::error::DomainError;

/// A unit of work whose queries are scoped to one tenant.
///
/// Use through [`crate::services::tenant_scope::with_tenant_context`], which
/// guarantees the context is cleared on every exit path.
#[async_trait]
pub trait TenantSession: Send {
    async fn set_context(&mut self, ctx: &TenantContext) -> Result<(), DomainError>;
    async fn clear_context(&mut self) -> Result<(), DomainError>;
}
