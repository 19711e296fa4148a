//! Domain services

pub mod menu_tree;
pub mod default_menu;
pub mod envelope;
pub mod tenant_scope;
pub mod menu_definition_service;
pub mod menu_preference_service;
pub mod menu_resolution_service;
pub mod parameter_service;

pub use menu_definition_service::MenuDefinitionService;
pub use menu_preference_service::MenuPreferenceService;
pub use menu_resolution_service::MenuResolutionService;
pub use parameter_service::ParameterService;
pub use tenant_scope::with_tenant_context;
