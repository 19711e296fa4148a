//! # TopSteel Core - Domain Module
//! 
//! Domain entities for menu configuration, user preferences, parameters
//! and tenant scoping.

pub mod menu_configuration;
pub mod menu_item;
pub mod user_menu_preference;
pub mod user_menu_settings;
pub mod parameter;
pub mod tenant;

// Re-export all entities and enums
pub use menu_configuration::MenuConfiguration;
pub use menu_item::{MenuItem, MenuItemKind};
pub use user_menu_preference::{
    CustomMenuItem, MenuItemAction, PreferencePatch, UserCustomMenu, UserMenuPreference,
};
pub use user_menu_settings::{MenuSettingsUpdate, MenuShortcut, MenuTemplate, UserMenuSettings};
pub use parameter::{
    Parameter, ParameterMetadata, ParameterScope, ParameterType, ParameterUpdate, ParameterValue,
    ParameterView,
};
pub use tenant::{inject_tenant_ids, Principal, TenantContext};
