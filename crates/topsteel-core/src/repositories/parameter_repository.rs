//! Parameter repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::{Parameter, ParameterScope};
use crate::error::DomainError;

/// Access to the three parameter tables. `tenant_id` is only meaningful for
/// the client scope and ignored otherwise.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ParameterRepository: Send + Sync {
    async fn find(
        &self,
        scope: ParameterScope,
        group: &str,
        key: &str,
        tenant_id: Option<Uuid>,
    ) -> Result<Option<Parameter>, DomainError>;

    async fn list_group(
        &self,
        scope: ParameterScope,
        group: &str,
        tenant_id: Option<Uuid>,
    ) -> Result<Vec<Parameter>, DomainError>;

    /// Client parameters of a tenant; with `user_id`, tenant-wide rows plus
    /// the user's own rows
    async fn list_client(
        &self,
        tenant_id: &Uuid,
        user_id: Option<Uuid>,
    ) -> Result<Vec<Parameter>, DomainError>;

    async fn create(&self, parameter: &Parameter) -> Result<Parameter, DomainError>;
    async fn update(&self, parameter: &Parameter) -> Result<Parameter, DomainError>;
}
