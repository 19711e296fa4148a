//! Repository traits (ports)

pub mod menu_configuration_repository;
pub mod menu_item_repository;
pub mod user_menu_preference_repository;
pub mod parameter_repository;
pub mod cache_store;
pub mod tenant_session;

pub use menu_configuration_repository::MenuConfigurationRepository;
pub use menu_item_repository::MenuItemRepository;
pub use user_menu_preference_repository::UserMenuPreferenceRepository;
pub use parameter_repository::ParameterRepository;
pub use cache_store::CacheStore;
pub use tenant_session::TenantSession;

#[cfg(test)]
pub use menu_configuration_repository::MockMenuConfigurationRepository;
#[cfg(test)]
pub use menu_item_repository::MockMenuItemRepository;
#[cfg(test)]
pub use user_menu_preference_repository::MockUserMenuPreferenceRepository;
#[cfg(test)]
pub use parameter_repository::MockParameterRepository;
#[cfg(test)]
pub use cache_store::MockCacheStore;
