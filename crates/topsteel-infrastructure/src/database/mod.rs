//! Database module (PostgreSQL adapters)

pub mod connection;
pub mod migrations;
pub mod postgres;
pub mod tenant_session;

pub use connection::create_pool;
pub use migrations::run_migrations;
pub use postgres::{
    PgMenuConfigurationRepository, PgMenuItemRepository, PgParameterRepository,
    PgUserMenuPreferenceRepository,
};
pub use tenant_session::PgTenantSession;
