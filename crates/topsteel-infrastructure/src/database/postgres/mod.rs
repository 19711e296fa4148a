//! PostgreSQL repository implementations

pub mod menu_configuration_repo_impl;
pub mod menu_item_repo_impl;
pub mod user_menu_preference_repo_impl;
pub mod parameter_repo_impl;

pub use menu_configuration_repo_impl::PgMenuConfigurationRepository;
pub use menu_item_repo_impl::PgMenuItemRepository;
pub use user_menu_preference_repo_impl::PgUserMenuPreferenceRepository;
pub use parameter_repo_impl::PgParameterRepository;
