use std::sync::Arc;

use topsteel_core::repositories::{
    CacheStore, MenuConfigurationRepository, MenuItemRepository, ParameterRepository,
    UserMenuPreferenceRepository,
};
use topsteel_core::services::{
    MenuDefinitionService, MenuPreferenceService, MenuResolutionService, ParameterService,
};
use topsteel_security::JwtService;
use topsteel_shared::constants::{DEFAULT_CUSTOM_MENU_TTL_SECS, DEFAULT_PARAMETER_CACHE_TTL_SECS};

pub type MenuDefinitions = MenuDefinitionService<dyn MenuConfigurationRepository, dyn MenuItemRepository>;
pub type MenuResolution =
    MenuResolutionService<dyn MenuConfigurationRepository, dyn MenuItemRepository, dyn UserMenuPreferenceRepository>;
pub type MenuPreferences = MenuPreferenceService<dyn UserMenuPreferenceRepository>;
pub type Parameters = ParameterService<dyn ParameterRepository>;

/// Storage adapters the services are wired on
#[derive(Clone)]
pub struct Repositories {
    pub configurations: Arc<dyn MenuConfigurationRepository>,
    pub items: Arc<dyn MenuItemRepository>,
    pub preferences: Arc<dyn UserMenuPreferenceRepository>,
    pub parameters: Arc<dyn ParameterRepository>,
}

#[derive(Debug, Clone)]
pub struct StateOptions {
    pub fallback_to_default: bool,
    pub custom_menu_ttl_secs: u64,
    pub parameter_cache_ttl_secs: u64,
}

impl Default for StateOptions {
    fn default() -> Self {
        Self {
            fallback_to_default: true,
            custom_menu_ttl_secs: DEFAULT_CUSTOM_MENU_TTL_SECS,
            parameter_cache_ttl_secs: DEFAULT_PARAMETER_CACHE_TTL_SECS,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub menu_definitions: Arc<MenuDefinitions>,
    pub menu_resolution: Arc<MenuResolution>,
    pub menu_preferences: Arc<MenuPreferences>,
    pub parameters: Arc<Parameters>,
    pub jwt: Arc<JwtService>,
}

impl AppState {
    pub fn new(
        repos: Repositories,
        cache: Option<Arc<dyn CacheStore>>,
        jwt: JwtService,
        options: StateOptions,
    ) -> Self {
        let mut menu_preferences = MenuPreferenceService::new(repos.preferences.clone());
        if let Some(cache) = cache {
            menu_preferences = menu_preferences.with_cache(cache, options.custom_menu_ttl_secs);
        }

        Self {
            menu_definitions: Arc::new(MenuDefinitionService::new(
                repos.configurations.clone(),
                repos.items.clone(),
            )),
            menu_resolution: Arc::new(MenuResolutionService::new(
                repos.configurations,
                repos.items,
                repos.preferences,
                options.fallback_to_default,
            )),
            menu_preferences: Arc::new(menu_preferences),
            parameters: Arc::new(ParameterService::new(
                repos.parameters,
                options.parameter_cache_ttl_secs,
            )),
            jwt: Arc::new(jwt),
        }
    }
}
