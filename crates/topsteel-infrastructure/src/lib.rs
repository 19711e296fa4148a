//! # TopSteel Infrastructure
//! 
//! Database and cache implementations (adapters).

pub mod database;
pub mod cache;
pub mod memory;

pub use database::{
    create_pool, run_migrations, PgMenuConfigurationRepository, PgMenuItemRepository,
    PgParameterRepository, PgTenantSession, PgUserMenuPreferenceRepository,
};
pub use cache::{MemoryCache, RedisCache};
pub use memory::{MemoryMenuStore, MemoryParameterStore, MemoryPreferenceStore};
