//! Menu configuration repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::{MenuConfiguration, MenuItem};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MenuConfigurationRepository: Send + Sync {
    /// Live configurations, system ones first, then by name
    async fn list_all(&self) -> Result<Vec<MenuConfiguration>, DomainError>;
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<MenuConfiguration>, DomainError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<MenuConfiguration>, DomainError>;
    async fn find_active(&self) -> Result<Option<MenuConfiguration>, DomainError>;

    /// Persist a configuration together with its items in one unit of work
    async fn create(
        &self,
        config: &MenuConfiguration,
        items: &[MenuItem],
    ) -> Result<MenuConfiguration, DomainError>;

    async fn update(&self, config: &MenuConfiguration) -> Result<MenuConfiguration, DomainError>;

    /// Update a configuration and replace its whole item set in one unit of
    /// work; nothing is written when either part fails
    async fn update_with_items(
        &self,
        config: &MenuConfiguration,
        items: &[MenuItem],
    ) -> Result<MenuConfiguration, DomainError>;

    /// Delete a configuration and cascade to its items
    async fn delete(&self, id: &Uuid) -> Result<(), DomainError>;

    /// Make `id` the only active configuration, atomically.
    /// Fails with `ConfigurationNotFound` and leaves the previous
    /// activation untouched when `id` does not exist.
    async fn activate(&self, id: &Uuid) -> Result<MenuConfiguration, DomainError>;
}
