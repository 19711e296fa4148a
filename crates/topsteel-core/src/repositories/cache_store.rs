//! Shared JSON cache (port)

use async_trait::async_trait;
use serde_json::Value;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get_json(&self, key: &str) -> Result<Option<Value>, DomainError>;
    async fn set_json(&self, key: &str, value: &Value, ttl_secs: u64) -> Result<(), DomainError>;
    async fn invalidate(&self, key: &str) -> Result<(), DomainError>;
}
