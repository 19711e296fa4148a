// ============================================================================
// TopSteel Infrastructure - In-Memory Stores
// File: crates/topsteel-infrastructure/src/memory.rs
// Description: Lock-guarded stores with the same contracts as the PostgreSQL
//              repositories, used for local runs and HTTP tests
// ============================================================================

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use topsteel_core::domain::{
    MenuConfiguration, MenuItem, Parameter, ParameterScope, PreferencePatch, UserCustomMenu,
    UserMenuPreference, UserMenuSettings,
};
use topsteel_core::error::DomainError;
use topsteel_core::repositories::{
    MenuConfigurationRepository, MenuItemRepository, ParameterRepository,
    UserMenuPreferenceRepository,
};

// ----------------------------------------------------------------------------
// Menu definitions
// ----------------------------------------------------------------------------

#[derive(Default)]
struct MenuState {
    configs: Vec<MenuConfiguration>,
    items: Vec<MenuItem>,
    /// Single activation pointer; `is_active` on read is derived from it
    active: Option<Uuid>,
}

impl MenuState {
    fn live_config(&self, id: &Uuid) -> Option<&MenuConfiguration> {
        self.configs.iter().find(|c| c.id == *id && !c.is_deleted())
    }

    fn present(&self, config: &MenuConfiguration) -> MenuConfiguration {
        let mut config = config.clone();
        config.is_active = self.active == Some(config.id);
        config
    }

    fn apply_update(&mut self, config: &MenuConfiguration) -> Result<MenuConfiguration, DomainError> {
        if self.name_taken(&config.name, Some(config.id)) {
            return Err(DomainError::ConfigurationNameAlreadyExists(config.name.clone()));
        }

        let active = self.active;
        let stored = self
            .configs
            .iter_mut()
            .find(|c| c.id == config.id && !c.is_deleted())
            .ok_or(DomainError::ConfigurationNotFound(config.id))?;

        stored.name = config.name.clone();
        stored.description = config.description.clone();
        stored.audit.modified_at = config.audit.modified_at;
        stored.audit.modified_by = config.audit.modified_by;

        let mut updated = stored.clone();
        updated.is_active = active == Some(updated.id);
        Ok(updated)
    }

    fn name_taken(&self, name: &str, except: Option<Uuid>) -> bool {
        self.configs
            .iter()
            .any(|c| !c.is_deleted() && c.name == name && Some(c.id) != except)
    }
}

/// Menu configurations and items behind one lock, so activation and
/// cascading deletes are atomic.
#[derive(Default)]
pub struct MemoryMenuStore {
    state: RwLock<MenuState>,
}

impl MemoryMenuStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MenuConfigurationRepository for MemoryMenuStore {
    async fn list_all(&self) -> Result<Vec<MenuConfiguration>, DomainError> {
        let state = self.state.read();
        let mut configs: Vec<MenuConfiguration> = state
            .configs
            .iter()
            .filter(|c| !c.is_deleted())
            .map(|c| state.present(c))
            .collect();
        configs.sort_by(|a, b| b.is_system.cmp(&a.is_system).then_with(|| a.name.cmp(&b.name)));
        Ok(configs)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<MenuConfiguration>, DomainError> {
        let state = self.state.read();
        Ok(state.live_config(id).map(|c| state.present(c)))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<MenuConfiguration>, DomainError> {
        let state = self.state.read();
        Ok(state
            .configs
            .iter()
            .find(|c| !c.is_deleted() && c.name == name)
            .map(|c| state.present(c)))
    }

    async fn find_active(&self) -> Result<Option<MenuConfiguration>, DomainError> {
        let state = self.state.read();
        Ok(state
            .active
            .and_then(|id| state.live_config(&id))
            .map(|c| state.present(c)))
    }

    async fn create(
        &self,
        config: &MenuConfiguration,
        items: &[MenuItem],
    ) -> Result<MenuConfiguration, DomainError> {
        let mut state = self.state.write();
        if state.name_taken(&config.name, None) {
            return Err(DomainError::ConfigurationNameAlreadyExists(config.name.clone()));
        }

        let mut stored = config.clone();
        stored.is_active = false;
        state.configs.push(stored.clone());
        state.items.extend(items.iter().cloned());

        info!("Stored menu configuration {} with {} items", stored.name, items.len());
        Ok(stored)
    }

    async fn update(&self, config: &MenuConfiguration) -> Result<MenuConfiguration, DomainError> {
        self.state.write().apply_update(config)
    }

    async fn update_with_items(
        &self,
        config: &MenuConfiguration,
        items: &[MenuItem],
    ) -> Result<MenuConfiguration, DomainError> {
        let mut state = self.state.write();
        let updated = state.apply_update(config)?;
        state.items.retain(|i| i.config_id != config.id);
        state.items.extend(items.iter().cloned());
        Ok(updated)
    }

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        let mut state = self.state.write();
        let before = state.configs.len();
        state.configs.retain(|c| c.id != *id);
        if state.configs.len() == before {
            return Err(DomainError::ConfigurationNotFound(*id));
        }

        state.items.retain(|i| i.config_id != *id);
        if state.active == Some(*id) {
            state.active = None;
        }
        Ok(())
    }

    async fn activate(&self, id: &Uuid) -> Result<MenuConfiguration, DomainError> {
        let mut state = self.state.write();
        let config = state
            .live_config(id)
            .cloned()
            .ok_or(DomainError::ConfigurationNotFound(*id))?;

        let previous = state.active.replace(*id);
        debug!("Menu activation moved from {:?} to {}", previous, id);

        Ok(state.present(&config))
    }
}

#[async_trait]
impl MenuItemRepository for MemoryMenuStore {
    async fn list_by_config(&self, config_id: &Uuid) -> Result<Vec<MenuItem>, DomainError> {
        let state = self.state.read();
        let mut items: Vec<MenuItem> = state
            .items
            .iter()
            .filter(|i| i.config_id == *config_id && !i.is_deleted())
            .cloned()
            .collect();
        // Stable sort keeps insertion order among equal keys
        items.sort_by_key(|i| (i.parent_id.is_some(), i.order_index));
        Ok(items)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<MenuItem>, DomainError> {
        let state = self.state.read();
        Ok(state.items.iter().find(|i| i.id == *id && !i.is_deleted()).cloned())
    }

    async fn insert(&self, item: &MenuItem) -> Result<MenuItem, DomainError> {
        let mut state = self.state.write();
        if state.live_config(&item.config_id).is_none() {
            return Err(DomainError::ConfigurationNotFound(item.config_id));
        }
        state.items.push(item.clone());
        Ok(item.clone())
    }

    async fn soft_delete(&self, ids: &[Uuid], removed_by: Option<Uuid>) -> Result<u64, DomainError> {
        let mut state = self.state.write();
        let mut count = 0;
        for item in state.items.iter_mut() {
            if ids.contains(&item.id) && !item.is_deleted() {
                item.audit.soft_delete(removed_by);
                count += 1;
            }
        }
        Ok(count)
    }
}

// ----------------------------------------------------------------------------
// User preferences
// ----------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryPreferenceStore {
    rows: RwLock<Vec<UserMenuPreference>>,
    custom_menus: RwLock<HashMap<Uuid, UserCustomMenu>>,
    settings: RwLock<HashMap<Uuid, UserMenuSettings>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserMenuPreferenceRepository for MemoryPreferenceStore {
    async fn list_by_user(&self, user_id: &Uuid) -> Result<Vec<UserMenuPreference>, DomainError> {
        Ok(self
            .rows
            .read()
            .iter()
            .filter(|p| p.user_id == *user_id && !p.is_deleted())
            .cloned()
            .collect())
    }

    async fn upsert(
        &self,
        user_id: &Uuid,
        menu_id: &str,
        patch: &PreferencePatch,
    ) -> Result<UserMenuPreference, DomainError> {
        let mut rows = self.rows.write();
        let position = rows.iter().position(|p| p.user_id == *user_id && p.menu_id == menu_id);

        let live_version = match position {
            Some(idx) if !rows[idx].is_deleted() => rows[idx].version,
            _ => 0,
        };
        if let Some(expected) = patch.expected_version {
            if expected != live_version {
                return Err(DomainError::VersionConflict {
                    menu_id: menu_id.to_string(),
                    expected,
                });
            }
        }

        let row = match position {
            Some(idx) => {
                let row = &mut rows[idx];
                if row.is_deleted() {
                    let id = row.id;
                    *row = UserMenuPreference::new(*user_id, menu_id);
                    row.id = id;
                }
                row
            }
            None => {
                rows.push(UserMenuPreference::new(*user_id, menu_id));
                let last = rows.len() - 1;
                &mut rows[last]
            }
        };

        row.apply(patch);
        Ok(row.clone())
    }

    async fn soft_delete_all(&self, user_id: &Uuid) -> Result<u64, DomainError> {
        let mut rows = self.rows.write();
        let mut count = 0;
        for row in rows.iter_mut().filter(|p| p.user_id == *user_id && !p.is_deleted()) {
            row.audit.soft_delete(Some(*user_id));
            count += 1;
        }
        Ok(count)
    }

    async fn find_custom_menu(&self, user_id: &Uuid) -> Result<Option<UserCustomMenu>, DomainError> {
        Ok(self.custom_menus.read().get(user_id).cloned())
    }

    async fn save_custom_menu(&self, menu: &UserCustomMenu) -> Result<UserCustomMenu, DomainError> {
        self.custom_menus.write().insert(menu.user_id, menu.clone());
        Ok(menu.clone())
    }

    async fn find_settings(&self, user_id: &Uuid) -> Result<Option<UserMenuSettings>, DomainError> {
        Ok(self.settings.read().get(user_id).cloned())
    }

    async fn save_settings(&self, settings: &UserMenuSettings) -> Result<UserMenuSettings, DomainError> {
        self.settings.write().insert(settings.user_id, settings.clone());
        Ok(settings.clone())
    }
}

// ----------------------------------------------------------------------------
// Parameters
// ----------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryParameterStore {
    rows: RwLock<Vec<Parameter>>,
}

impl MemoryParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed rows directly, bypassing service validation
    pub fn with_parameters(parameters: Vec<Parameter>) -> Self {
        Self {
            rows: RwLock::new(parameters),
        }
    }
}

fn same_owner(p: &Parameter, scope: ParameterScope, tenant_id: Option<Uuid>) -> bool {
    match scope {
        ParameterScope::Client => p.tenant_id.is_some() && p.tenant_id == tenant_id && p.user_id.is_none(),
        _ => true,
    }
}

#[async_trait]
impl ParameterRepository for MemoryParameterStore {
    async fn find(
        &self,
        scope: ParameterScope,
        group: &str,
        key: &str,
        tenant_id: Option<Uuid>,
    ) -> Result<Option<Parameter>, DomainError> {
        Ok(self
            .rows
            .read()
            .iter()
            .find(|p| {
                p.scope == scope
                    && p.group == group
                    && p.key == key
                    && !p.audit.is_deleted()
                    && same_owner(p, scope, tenant_id)
            })
            .cloned())
    }

    async fn list_group(
        &self,
        scope: ParameterScope,
        group: &str,
        tenant_id: Option<Uuid>,
    ) -> Result<Vec<Parameter>, DomainError> {
        let mut params: Vec<Parameter> = self
            .rows
            .read()
            .iter()
            .filter(|p| {
                p.scope == scope && p.group == group && !p.audit.is_deleted() && same_owner(p, scope, tenant_id)
            })
            .cloned()
            .collect();
        params.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(params)
    }

    async fn list_client(
        &self,
        tenant_id: &Uuid,
        user_id: Option<Uuid>,
    ) -> Result<Vec<Parameter>, DomainError> {
        let mut params: Vec<Parameter> = self
            .rows
            .read()
            .iter()
            .filter(|p| {
                p.scope == ParameterScope::Client
                    && p.tenant_id == Some(*tenant_id)
                    && !p.audit.is_deleted()
                    && (p.user_id.is_none() || p.user_id == user_id)
            })
            .cloned()
            .collect();
        params.sort_by(|a, b| {
            (&a.group, &a.key, a.user_id.is_some()).cmp(&(&b.group, &b.key, b.user_id.is_some()))
        });
        Ok(params)
    }

    async fn create(&self, parameter: &Parameter) -> Result<Parameter, DomainError> {
        let mut rows = self.rows.write();
        let exists = rows.iter().any(|p| {
            p.scope == parameter.scope
                && p.group == parameter.group
                && p.key == parameter.key
                && p.tenant_id == parameter.tenant_id
                && p.user_id == parameter.user_id
                && !p.audit.is_deleted()
        });
        if exists {
            return Err(DomainError::ParameterAlreadyExists {
                scope: parameter.scope,
                group: parameter.group.clone(),
                key: parameter.key.clone(),
            });
        }

        rows.push(parameter.clone());
        Ok(parameter.clone())
    }

    async fn update(&self, parameter: &Parameter) -> Result<Parameter, DomainError> {
        let mut rows = self.rows.write();
        let stored = rows
            .iter_mut()
            .find(|p| p.id == parameter.id && !p.audit.is_deleted())
            .ok_or_else(|| DomainError::ParameterNotFound {
                scope: parameter.scope,
                group: parameter.group.clone(),
                key: parameter.key.clone(),
            })?;

        *stored = parameter.clone();
        Ok(parameter.clone())
    }
}
