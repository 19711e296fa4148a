// ============================================================================
// TopSteel Core - Menu Definition Service
// File: crates/topsteel-core/src/services/menu_definition_service.rs
// Description: Administration of menu configurations and their item trees
// ============================================================================

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{MenuConfiguration, MenuItem, MenuItemKind};
use crate::error::DomainError;
use crate::repositories::{MenuConfigurationRepository, MenuItemRepository};
use crate::services::default_menu::{
    default_menu, DEFAULT_CONFIGURATION_DESCRIPTION, DEFAULT_CONFIGURATION_NAME,
};
use crate::services::menu_tree::{flatten_inputs, MenuArena, MenuItemInput, MenuTreeNode};

pub const EXPORT_FORMAT_VERSION: &str = "1.0";
const PERSONAL_CONFIG_DESCRIPTION: &str = "Configuration personnelle de menus utilisateur";
const PERSONAL_DATA_VIEW_ICON: &str = "BarChart3";

fn personal_config_name(user_id: &Uuid) -> String {
    format!("Menus personnels - {}", user_id)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMenuConfiguration {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub items: Vec<MenuItemInput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMenuConfiguration {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Replaces the whole item set when present
    pub items: Option<Vec<MenuItemInput>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddDataViewItem {
    pub query_builder_id: String,
    pub title: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
}

/// Configuration with its unfiltered tree
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuConfigurationDetail {
    #[serde(flatten)]
    pub configuration: MenuConfiguration,
    pub items: Vec<MenuTreeNode>,
}

/// Portable document produced by export and accepted by import
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuConfigurationExport {
    pub name: String,
    pub description: Option<String>,
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub items: Vec<MenuTreeNode>,
}

/// Menu definition store operations
pub struct MenuDefinitionService<C, I>
where
    C: MenuConfigurationRepository + ?Sized,
    I: MenuItemRepository + ?Sized,
{
    config_repo: Arc<C>,
    item_repo: Arc<I>,
}

impl<C, I> MenuDefinitionService<C, I>
where
    C: MenuConfigurationRepository + ?Sized,
    I: MenuItemRepository + ?Sized,
{
    pub fn new(config_repo: Arc<C>, item_repo: Arc<I>) -> Self {
        Self { config_repo, item_repo }
    }

    /// All configurations, system ones first, then by name
    pub async fn list_configurations(&self) -> Result<Vec<MenuConfiguration>, DomainError> {
        let mut configs = self.config_repo.list_all().await?;
        configs.sort_by(|a, b| b.is_system.cmp(&a.is_system).then_with(|| a.name.cmp(&b.name)));
        Ok(configs)
    }

    async fn require_configuration(&self, id: &Uuid) -> Result<MenuConfiguration, DomainError> {
        self.config_repo
            .find_by_id(id)
            .await?
            .filter(|c| !c.is_deleted())
            .ok_or(DomainError::ConfigurationNotFound(*id))
    }

    pub async fn get_configuration(&self, id: &Uuid) -> Result<MenuConfigurationDetail, DomainError> {
        let configuration = self.require_configuration(id).await?;
        let items = self.item_repo.list_by_config(id).await?;
        let tree = MenuArena::build(&items)?.to_tree();

        Ok(MenuConfigurationDetail { configuration, items: tree })
    }

    /// Items of a configuration in storage order
    pub async fn list_items(&self, config_id: &Uuid) -> Result<Vec<MenuItem>, DomainError> {
        self.require_configuration(config_id).await?;
        self.item_repo.list_by_config(config_id).await
    }

    pub async fn create_configuration(
        &self,
        input: CreateMenuConfiguration,
        created_by: Option<Uuid>,
    ) -> Result<MenuConfiguration, DomainError> {
        let config = MenuConfiguration::new(input.name, input.description, created_by)?;
        self.insert_configuration(config, &input.items, created_by).await
    }

    async fn insert_configuration(
        &self,
        config: MenuConfiguration,
        inputs: &[MenuItemInput],
        created_by: Option<Uuid>,
    ) -> Result<MenuConfiguration, DomainError> {
        if self.config_repo.find_by_name(&config.name).await?.is_some() {
            warn!("Menu configuration name already in use: {}", config.name);
            return Err(DomainError::ConfigurationNameAlreadyExists(config.name));
        }

        let mut items = Vec::new();
        flatten_inputs(config.id, None, inputs, created_by, &mut items)?;

        let created = self.config_repo.create(&config, &items).await?;
        info!(
            "Menu configuration created: {} ({}) with {} items",
            created.name,
            created.id,
            items.len()
        );
        Ok(created)
    }

    pub async fn update_configuration(
        &self,
        id: &Uuid,
        input: UpdateMenuConfiguration,
        updated_by: Option<Uuid>,
    ) -> Result<MenuConfiguration, DomainError> {
        let mut config = self.require_configuration(id).await?;

        if let Some(name) = input.name.map(|n| n.trim().to_string()) {
            if name != config.name {
                if config.is_system {
                    warn!("Refusing to rename system configuration {}", config.name);
                    return Err(DomainError::SystemConfigurationProtected(config.name));
                }
                if self.config_repo.find_by_name(&name).await?.is_some() {
                    return Err(DomainError::ConfigurationNameAlreadyExists(name));
                }
                config.name = name;
            }
        }

        if let Some(description) = input.description {
            let description = description.trim().to_string();
            config.description = if description.is_empty() { None } else { Some(description) };
        }

        config.audit.touch(updated_by);
        validator::Validate::validate(&config)?;

        match input.items {
            Some(inputs) => {
                let mut items = Vec::new();
                flatten_inputs(config.id, None, &inputs, updated_by, &mut items)?;
                let updated = self.config_repo.update_with_items(&config, &items).await?;
                info!("Replaced items of menu configuration {}: {} items", config.id, items.len());
                Ok(updated)
            }
            None => self.config_repo.update(&config).await,
        }
    }

    pub async fn delete_configuration(&self, id: &Uuid) -> Result<(), DomainError> {
        let config = self.require_configuration(id).await?;

        if config.is_system {
            warn!("Refusing to delete system configuration {}", config.name);
            return Err(DomainError::SystemConfigurationProtected(config.name));
        }
        if config.is_active {
            return Err(DomainError::ActiveConfigurationProtected);
        }

        self.config_repo.delete(id).await?;
        info!("Menu configuration deleted: {} ({})", config.name, id);
        Ok(())
    }

    /// Make `id` the single active configuration
    pub async fn activate(&self, id: &Uuid) -> Result<MenuConfiguration, DomainError> {
        let activated = self.config_repo.activate(id).await?;
        info!("Menu configuration activated: {} ({})", activated.name, activated.id);
        Ok(activated)
    }

    /// Unfiltered tree of a configuration, the active one when `config_id`
    /// is omitted. Empty when nothing is active.
    pub async fn get_menu_tree(&self, config_id: Option<Uuid>) -> Result<Vec<MenuTreeNode>, DomainError> {
        let config_id = match config_id {
            Some(id) => self.require_configuration(&id).await?.id,
            None => match self.config_repo.find_active().await? {
                Some(active) => active.id,
                None => return Ok(Vec::new()),
            },
        };

        let items = self.item_repo.list_by_config(&config_id).await?;
        Ok(MenuArena::build(&items)?.to_tree())
    }

    pub async fn export_configuration(&self, id: &Uuid) -> Result<MenuConfigurationExport, DomainError> {
        let detail = self.get_configuration(id).await?;

        Ok(MenuConfigurationExport {
            name: detail.configuration.name,
            description: detail.configuration.description,
            version: EXPORT_FORMAT_VERSION.to_string(),
            exported_at: Utc::now(),
            items: detail.items,
        })
    }

    /// Create a custom configuration from an exported document
    pub async fn import_configuration(
        &self,
        document: serde_json::Value,
        created_by: Option<Uuid>,
    ) -> Result<MenuConfiguration, DomainError> {
        let input: CreateMenuConfiguration = serde_json::from_value(document)
            .map_err(|e| DomainError::ValidationError(format!("Invalid menu export: {}", e)))?;

        self.create_configuration(input, created_by).await
    }

    /// Persist the built-in tree as a system configuration. It becomes the
    /// active one when nothing else is active.
    pub async fn create_default_configuration(&self) -> Result<MenuConfiguration, DomainError> {
        let config = MenuConfiguration::new_system(
            DEFAULT_CONFIGURATION_NAME.to_string(),
            Some(DEFAULT_CONFIGURATION_DESCRIPTION.to_string()),
        )?;
        let created = self.insert_configuration(config, &default_menu(), None).await?;

        if self.config_repo.find_active().await?.is_none() {
            return self.activate(&created.id).await;
        }
        Ok(created)
    }

    /// Add a subtree below `parent_id` (or at the root)
    pub async fn add_item(
        &self,
        config_id: &Uuid,
        parent_id: Option<Uuid>,
        input: MenuItemInput,
        created_by: Option<Uuid>,
    ) -> Result<Vec<MenuItem>, DomainError> {
        self.require_configuration(config_id).await?;
        let mut existing = self.item_repo.list_by_config(config_id).await?;

        if let Some(parent_id) = parent_id {
            if !existing.iter().any(|item| item.id == parent_id) {
                warn!("Parent {} is not an item of configuration {}", parent_id, config_id);
                return Err(DomainError::InvalidParent {
                    config_id: *config_id,
                    parent_id,
                });
            }
        }

        let mut created = Vec::new();
        flatten_inputs(*config_id, parent_id, std::slice::from_ref(&input), created_by, &mut created)?;

        existing.extend(created.iter().cloned());
        MenuArena::build(&existing)?;

        for item in &created {
            self.item_repo.insert(item).await?;
        }

        info!("Added {} menu items to configuration {}", created.len(), config_id);
        Ok(created)
    }

    pub async fn add_data_view_item(
        &self,
        config_id: &Uuid,
        input: AddDataViewItem,
        created_by: Option<Uuid>,
    ) -> Result<MenuItem, DomainError> {
        let mut item = MenuItemInput::new(
            input.title,
            MenuItemKind::DataView { query_builder_id: Some(input.query_builder_id) },
        );
        item.icon = input.icon.or_else(|| Some("Table".to_string()));

        self.add_item(config_id, input.parent_id, item, created_by)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::InternalError("data view item was not created".to_string()))
    }

    /// Add a data view to the user's personal configuration, creating that
    /// configuration on first use. It is never activated here.
    pub async fn add_user_data_view(&self, user_id: &Uuid, input: AddDataViewItem) -> Result<MenuItem, DomainError> {
        let name = personal_config_name(user_id);
        let personal = self
            .config_repo
            .find_by_name(&name)
            .await?
            .filter(|c| !c.is_deleted() && c.audit.created_by == Some(*user_id));

        let config = match personal {
            Some(config) => config,
            None => {
                let config = MenuConfiguration::new(
                    name,
                    Some(PERSONAL_CONFIG_DESCRIPTION.to_string()),
                    Some(*user_id),
                )?;
                self.insert_configuration(config, &[], Some(*user_id)).await?
            }
        };

        let input = AddDataViewItem {
            icon: input.icon.or_else(|| Some(PERSONAL_DATA_VIEW_ICON.to_string())),
            ..input
        };
        self.add_data_view_item(&config.id, input, Some(*user_id)).await
    }

    /// Soft delete an item and everything below it
    pub async fn remove_item(
        &self,
        config_id: &Uuid,
        item_id: &Uuid,
        removed_by: Option<Uuid>,
    ) -> Result<u64, DomainError> {
        let items = self.item_repo.list_by_config(config_id).await?;
        if !items.iter().any(|item| item.id == *item_id) {
            return Err(DomainError::MenuItemNotFound(*item_id));
        }

        let ids = MenuArena::build(&items)?.subtree_ids(item_id);
        let removed = self.item_repo.soft_delete(&ids, removed_by).await?;
        info!("Removed menu item {} from configuration {} ({} items)", item_id, config_id, removed);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{MockMenuConfigurationRepository, MockMenuItemRepository};
    use serde_json::json;

    fn service(
        configs: MockMenuConfigurationRepository,
        items: MockMenuItemRepository,
    ) -> MenuDefinitionService<MockMenuConfigurationRepository, MockMenuItemRepository> {
        MenuDefinitionService::new(Arc::new(configs), Arc::new(items))
    }

    fn config(name: &str, is_system: bool, is_active: bool) -> MenuConfiguration {
        let mut c = MenuConfiguration::new(name.to_string(), None, None).unwrap();
        c.is_system = is_system;
        c.is_active = is_active;
        c
    }

    #[tokio::test]
    async fn test_list_puts_system_first() {
        let mut configs = MockMenuConfigurationRepository::new();
        configs.expect_list_all().returning(|| {
            Ok(vec![config("Beta", false, false), config("Zeta", true, true), config("Alpha", false, false)])
        });

        let list = service(configs, MockMenuItemRepository::new())
            .list_configurations()
            .await
            .unwrap();

        let names: Vec<_> = list.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Beta"]);
    }

    #[tokio::test]
    async fn test_create_flattens_items_and_checks_name() {
        let mut configs = MockMenuConfigurationRepository::new();
        configs.expect_find_by_name().returning(|_| Ok(None));
        configs
            .expect_create()
            .withf(|_, items| items.len() == 2 && items[1].parent_id == Some(items[0].id))
            .times(1)
            .returning(|c, _| Ok(c.clone()));

        let input: CreateMenuConfiguration = serde_json::from_value(json!({
            "name": "Atelier",
            "items": [{ "title": "Production", "type": "M", "children": [
                { "title": "Ordres", "type": "P", "programId": "/production/orders" }
            ]}]
        }))
        .unwrap();

        let created = service(configs, MockMenuItemRepository::new())
            .create_configuration(input, None)
            .await
            .unwrap();

        assert_eq!(created.name, "Atelier");
        assert!(!created.is_system);
    }

    #[tokio::test]
    async fn test_create_duplicate_name_conflicts() {
        let mut configs = MockMenuConfigurationRepository::new();
        configs
            .expect_find_by_name()
            .returning(|name| Ok(Some(config(name, false, false))));
        configs.expect_create().never();

        let input = CreateMenuConfiguration {
            name: "Atelier".to_string(),
            description: None,
            items: vec![],
        };
        let result = service(configs, MockMenuItemRepository::new())
            .create_configuration(input, None)
            .await;

        assert!(matches!(result, Err(DomainError::ConfigurationNameAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_rename_system_configuration_forbidden() {
        let system = config("Default", true, true);
        let id = system.id;

        let mut configs = MockMenuConfigurationRepository::new();
        configs
            .expect_find_by_id()
            .returning(move |_| Ok(Some(system.clone())));
        configs.expect_update().never();

        let update = UpdateMenuConfiguration {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };
        let result = service(configs, MockMenuItemRepository::new())
            .update_configuration(&id, update, None)
            .await;

        assert!(matches!(result, Err(DomainError::SystemConfigurationProtected(_))));
    }

    #[tokio::test]
    async fn test_update_replaces_items() {
        let existing = config("Atelier", false, false);
        let id = existing.id;

        let mut configs = MockMenuConfigurationRepository::new();
        configs
            .expect_find_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        configs.expect_update().never();
        configs
            .expect_update_with_items()
            .withf(move |config, items| config.id == id && items.len() == 1 && items[0].config_id == id)
            .times(1)
            .returning(|c, _| Ok(c.clone()));

        let update = UpdateMenuConfiguration {
            description: Some("Menus atelier".to_string()),
            items: Some(vec![MenuItemInput::new(
                "Stock",
                MenuItemKind::Program { program_id: Some("/stock".to_string()) },
            )]),
            ..Default::default()
        };

        let updated = service(configs, MockMenuItemRepository::new())
            .update_configuration(&id, update, None)
            .await
            .unwrap();

        assert_eq!(updated.description.as_deref(), Some("Menus atelier"));
        assert!(updated.audit.modified_at.is_some());
    }

    #[tokio::test]
    async fn test_failed_update_writes_no_items_separately() {
        let existing = config("Atelier", false, false);
        let id = existing.id;

        let mut configs = MockMenuConfigurationRepository::new();
        configs
            .expect_find_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        configs
            .expect_update_with_items()
            .times(1)
            .returning(|c, _| Err(DomainError::ConfigurationNotFound(c.id)));

        let update = UpdateMenuConfiguration {
            items: Some(vec![MenuItemInput::new("Ventes", MenuItemKind::Folder)]),
            ..Default::default()
        };

        // The item mock has no expectations: any direct item write panics
        let result = service(configs, MockMenuItemRepository::new())
            .update_configuration(&id, update, None)
            .await;

        assert!(matches!(result, Err(DomainError::ConfigurationNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_guards() {
        let system = config("Default", true, false);
        let active = config("Live", false, true);
        let (system_id, active_id) = (system.id, active.id);

        let mut configs = MockMenuConfigurationRepository::new();
        configs.expect_find_by_id().returning(move |id| {
            if *id == system_id {
                Ok(Some(system.clone()))
            } else {
                Ok(Some(active.clone()))
            }
        });
        configs.expect_delete().never();

        let svc = service(configs, MockMenuItemRepository::new());

        assert!(matches!(
            svc.delete_configuration(&system_id).await,
            Err(DomainError::SystemConfigurationProtected(_))
        ));
        assert!(matches!(
            svc.delete_configuration(&active_id).await,
            Err(DomainError::ActiveConfigurationProtected)
        ));
    }

    #[tokio::test]
    async fn test_activate_missing_configuration() {
        let mut configs = MockMenuConfigurationRepository::new();
        configs
            .expect_activate()
            .returning(|id| Err(DomainError::ConfigurationNotFound(*id)));

        let result = service(configs, MockMenuItemRepository::new())
            .activate(&Uuid::new_v4())
            .await;

        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_tree_empty_without_active_configuration() {
        let mut configs = MockMenuConfigurationRepository::new();
        configs.expect_find_active().returning(|| Ok(None));

        let tree = service(configs, MockMenuItemRepository::new())
            .get_menu_tree(None)
            .await
            .unwrap();

        assert!(tree.is_empty());
    }

    #[tokio::test]
    async fn test_add_item_rejects_foreign_parent() {
        let existing = config("Atelier", false, false);
        let id = existing.id;

        let mut configs = MockMenuConfigurationRepository::new();
        configs
            .expect_find_by_id()
            .returning(move |_| Ok(Some(existing.clone())));

        let mut items = MockMenuItemRepository::new();
        items.expect_list_by_config().returning(|_| Ok(vec![]));
        items.expect_insert().never();

        let result = service(configs, items)
            .add_item(
                &id,
                Some(Uuid::new_v4()),
                MenuItemInput::new("Orphan", MenuItemKind::Folder),
                None,
            )
            .await;

        assert!(matches!(result, Err(DomainError::InvalidParent { .. })));
    }

    #[tokio::test]
    async fn test_add_data_view_item() {
        let existing = config("Atelier", false, false);
        let id = existing.id;

        let mut configs = MockMenuConfigurationRepository::new();
        configs
            .expect_find_by_id()
            .returning(move |_| Ok(Some(existing.clone())));

        let mut items = MockMenuItemRepository::new();
        items.expect_list_by_config().returning(|_| Ok(vec![]));
        items.expect_insert().times(1).returning(|item| Ok(item.clone()));

        let item = service(configs, items)
            .add_data_view_item(
                &id,
                AddDataViewItem {
                    query_builder_id: "qb-12".to_string(),
                    title: "Stocks bas".to_string(),
                    icon: None,
                    parent_id: None,
                },
                None,
            )
            .await
            .unwrap();

        assert_eq!(item.kind.query_builder_id(), Some("qb-12"));
        assert_eq!(item.icon.as_deref(), Some("Table"));
    }

    fn data_view(query_builder_id: &str) -> AddDataViewItem {
        AddDataViewItem {
            query_builder_id: query_builder_id.to_string(),
            title: "Marges".to_string(),
            icon: None,
            parent_id: None,
        }
    }

    #[tokio::test]
    async fn test_user_data_view_creates_personal_configuration() {
        let user = Uuid::new_v4();
        let created: Arc<std::sync::Mutex<Option<MenuConfiguration>>> = Arc::default();
        let stored = created.clone();
        let lookup = created.clone();

        let mut configs = MockMenuConfigurationRepository::new();
        configs.expect_find_by_name().times(2).returning(|_| Ok(None));
        configs
            .expect_create()
            .withf(move |config, items| {
                config.name == format!("Menus personnels - {}", user)
                    && config.audit.created_by == Some(user)
                    && !config.is_active
                    && items.is_empty()
            })
            .times(1)
            .returning(move |config, _| {
                *stored.lock().unwrap() = Some(config.clone());
                Ok(config.clone())
            });
        configs
            .expect_find_by_id()
            .returning(move |_| Ok(lookup.lock().unwrap().clone()));

        let mut items = MockMenuItemRepository::new();
        items.expect_list_by_config().returning(|_| Ok(vec![]));
        items.expect_insert().times(1).returning(|item| Ok(item.clone()));

        let item = service(configs, items)
            .add_user_data_view(&user, data_view("qb-7"))
            .await
            .unwrap();

        assert_eq!(item.icon.as_deref(), Some("BarChart3"));
        assert_eq!(Some(item.config_id), created.lock().unwrap().as_ref().map(|c| c.id));
    }

    #[tokio::test]
    async fn test_user_data_view_reuses_personal_configuration() {
        let user = Uuid::new_v4();
        let personal = MenuConfiguration::new(personal_config_name(&user), None, Some(user)).unwrap();
        let personal_id = personal.id;
        let by_id = personal.clone();

        let mut configs = MockMenuConfigurationRepository::new();
        configs
            .expect_find_by_name()
            .returning(move |_| Ok(Some(personal.clone())));
        configs.expect_create().never();
        configs
            .expect_find_by_id()
            .returning(move |_| Ok(Some(by_id.clone())));

        let mut items = MockMenuItemRepository::new();
        items.expect_list_by_config().returning(|_| Ok(vec![]));
        items.expect_insert().times(1).returning(|item| Ok(item.clone()));

        let mut input = data_view("qb-8");
        input.icon = Some("PieChart".to_string());
        let item = service(configs, items).add_user_data_view(&user, input).await.unwrap();

        assert_eq!(item.config_id, personal_id);
        assert_eq!(item.icon.as_deref(), Some("PieChart"));
    }

    #[tokio::test]
    async fn test_remove_item_cascades_to_children() {
        let config_id = Uuid::new_v4();
        let parent = MenuItem::new(config_id, None, "Parent".to_string(), MenuItemKind::Folder, 1).unwrap();
        let child = MenuItem::new(
            config_id,
            Some(parent.id),
            "Child".to_string(),
            MenuItemKind::Program { program_id: Some("/x".to_string()) },
            1,
        )
        .unwrap();
        let (parent_id, child_id) = (parent.id, child.id);
        let stored = vec![parent, child];

        let mut items = MockMenuItemRepository::new();
        items
            .expect_list_by_config()
            .returning(move |_| Ok(stored.clone()));
        items
            .expect_soft_delete()
            .withf(move |ids, _| ids == [parent_id, child_id])
            .times(1)
            .returning(|ids, _| Ok(ids.len() as u64));

        let removed = service(MockMenuConfigurationRepository::new(), items)
            .remove_item(&config_id, &parent_id, None)
            .await
            .unwrap();

        assert_eq!(removed, 2);
    }

    #[tokio::test]
    async fn test_import_rejects_invalid_document() {
        let result = service(MockMenuConfigurationRepository::new(), MockMenuItemRepository::new())
            .import_configuration(json!({ "items": "nope" }), None)
            .await;

        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }
}
