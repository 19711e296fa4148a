//! Menu item repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::MenuItem;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MenuItemRepository: Send + Sync {
    /// Live items of a configuration ordered by
    /// `(parent_id NULLS FIRST, order_index, insertion order)`
    async fn list_by_config(&self, config_id: &Uuid) -> Result<Vec<MenuItem>, DomainError>;
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<MenuItem>, DomainError>;
    async fn insert(&self, item: &MenuItem) -> Result<MenuItem, DomainError>;

    /// Soft delete the given items, returns how many were marked
    async fn soft_delete(&self, ids: &[Uuid], removed_by: Option<Uuid>) -> Result<u64, DomainError>;
}
