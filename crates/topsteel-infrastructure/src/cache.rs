//! JSON cache adapters
//!
//! [`RedisCache`] backs the shared cache in deployments; [`MemoryCache`] is
//! the single-process fallback used when no Redis URL is configured.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use deadpool_redis::redis::AsyncCommands;
use deadpool_redis::{Config, Pool, PoolConfig, Runtime};
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, error, info};

use topsteel_core::error::DomainError;
use topsteel_core::repositories::CacheStore;
use topsteel_shared::config::RedisSettings;

/// Redis-backed cache over a deadpool connection pool
pub struct RedisCache {
    pool: Pool,
    key_prefix: String,
}

impl RedisCache {
    pub fn new(settings: &RedisSettings) -> Result<Self, DomainError> {
        let mut cfg = Config::from_url(settings.url.clone());
        cfg.pool = Some(PoolConfig::new(settings.max_connections));

        let pool = cfg.create_pool(Some(Runtime::Tokio1)).map_err(|e| {
            error!("Failed to create Redis pool: {}", e);
            DomainError::CacheError(format!("Failed to create Redis pool: {}", e))
        })?;

        info!("Redis cache configured with prefix '{}'", settings.key_prefix);
        Ok(Self {
            pool,
            key_prefix: settings.key_prefix.clone(),
        })
    }

    fn key(&self, key: &str) -> String {
        format!("{}:{}", self.key_prefix, key)
    }

    async fn connection(&self) -> Result<deadpool_redis::Connection, DomainError> {
        self.pool.get().await.map_err(|e| {
            DomainError::CacheError(format!("Failed to get Redis connection: {}", e))
        })
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get_json(&self, key: &str) -> Result<Option<Value>, DomainError> {
        let full_key = self.key(key);
        let mut conn = self.connection().await?;

        let raw: Option<String> = conn.get(&full_key).await.map_err(|e| {
            DomainError::CacheError(format!("Failed to get key '{}': {}", full_key, e))
        })?;

        match raw {
            Some(json) => {
                let value = serde_json::from_str(&json).map_err(|e| {
                    DomainError::CacheError(format!("Failed to parse cached value: {}", e))
                })?;
                debug!(key = %full_key, "Cache hit");
                Ok(Some(value))
            }
            None => {
                debug!(key = %full_key, "Cache miss");
                Ok(None)
            }
        }
    }

    async fn set_json(&self, key: &str, value: &Value, ttl_secs: u64) -> Result<(), DomainError> {
        let full_key = self.key(key);
        let json = serde_json::to_string(value).map_err(|e| {
            DomainError::CacheError(format!("Failed to serialize value: {}", e))
        })?;

        let mut conn = self.connection().await?;
        let _: () = conn.set_ex(&full_key, json, ttl_secs).await.map_err(|e| {
            DomainError::CacheError(format!("Failed to set key '{}': {}", full_key, e))
        })?;

        debug!(key = %full_key, ttl_secs, "Cache set");
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> Result<(), DomainError> {
        let full_key = self.key(key);
        let mut conn = self.connection().await?;

        let deleted: i64 = conn.del(&full_key).await.map_err(|e| {
            DomainError::CacheError(format!("Failed to delete key '{}': {}", full_key, e))
        })?;

        debug!(key = %full_key, deleted = deleted > 0, "Cache delete");
        Ok(())
    }
}

/// In-process cache with per-entry expiry
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (Value, Instant)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get_json(&self, key: &str) -> Result<Option<Value>, DomainError> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some((value, expires_at)) if *expires_at > Instant::now() => Ok(Some(value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set_json(&self, key: &str, value: &Value, ttl_secs: u64) -> Result<(), DomainError> {
        let expires_at = Instant::now() + Duration::from_secs(ttl_secs);
        self.entries.lock().insert(key.to_string(), (value.clone(), expires_at));
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> Result<(), DomainError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}
