// ============================================================================
// TopSteel Core - Menu Resolution Service
// File: crates/topsteel-core/src/services/menu_resolution_service.rs
// Description: Merge of the active menu tree with user preference overrides
// ============================================================================

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::{MenuItem, UserMenuPreference};
use crate::error::DomainError;
use crate::repositories::{MenuConfigurationRepository, MenuItemRepository, UserMenuPreferenceRepository};
use crate::services::default_menu::fallback_menu_items;
use crate::services::menu_tree::{ArenaNode, MenuArena};

/// Node of the menu returned to a user
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedMenuNode {
    pub id: String,
    pub title: String,
    pub title_key: Option<String>,
    #[serde(rename = "type")]
    pub item_type: &'static str,
    pub icon: Option<String>,
    pub program_id: Option<String>,
    pub href: Option<String>,
    pub external_url: Option<String>,
    pub query_builder_id: Option<String>,
    pub is_visible: bool,
    pub is_favorite: bool,
    pub is_pinned: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    /// Effective sibling order after preference overrides
    pub order: i32,
    pub depth: u32,
    pub children: Vec<ResolvedMenuNode>,
}

/// Preference rows indexed by normalized menu id
struct PreferenceIndex<'p> {
    by_menu_id: HashMap<String, &'p UserMenuPreference>,
}

impl<'p> PreferenceIndex<'p> {
    fn new(preferences: &'p [UserMenuPreference]) -> Self {
        let by_menu_id = preferences
            .iter()
            .filter(|p| !p.is_deleted())
            .map(|p| (normalize_menu_id(&p.menu_id), p))
            .collect();
        Self { by_menu_id }
    }

    /// Match on the item id first, then on the title key
    fn lookup(&self, item: &MenuItem) -> Option<&'p UserMenuPreference> {
        self.by_menu_id
            .get(&item.id.to_string())
            .or_else(|| {
                item.title_key
                    .as_ref()
                    .and_then(|key| self.by_menu_id.get(&normalize_menu_id(key)))
            })
            .copied()
    }
}

fn normalize_menu_id(menu_id: &str) -> String {
    let trimmed = menu_id.trim();
    match Uuid::parse_str(trimmed) {
        Ok(id) => id.to_string(),
        Err(_) => trimmed.to_string(),
    }
}

/// Menu resolution service
pub struct MenuResolutionService<C, I, P>
where
    C: MenuConfigurationRepository + ?Sized,
    I: MenuItemRepository + ?Sized,
    P: UserMenuPreferenceRepository + ?Sized,
{
    config_repo: Arc<C>,
    item_repo: Arc<I>,
    preference_repo: Arc<P>,
    fallback_to_default: bool,
}

impl<C, I, P> MenuResolutionService<C, I, P>
where
    C: MenuConfigurationRepository + ?Sized,
    I: MenuItemRepository + ?Sized,
    P: UserMenuPreferenceRepository + ?Sized,
{
    pub fn new(config_repo: Arc<C>, item_repo: Arc<I>, preference_repo: Arc<P>, fallback_to_default: bool) -> Self {
        Self {
            config_repo,
            item_repo,
            preference_repo,
            fallback_to_default,
        }
    }

    /// Menu tree of the active configuration as seen by one user
    pub async fn resolve(
        &self,
        user_id: &Uuid,
        roles: &[String],
        permissions: &[String],
    ) -> Result<Vec<ResolvedMenuNode>, DomainError> {
        let items = self.load_items().await?;
        let preferences = self.preference_repo.list_by_user(user_id).await?;
        debug!(
            "Resolving menu for user {}: {} items, {} preference rows",
            user_id,
            items.len(),
            preferences.len()
        );

        resolve_tree(&items, &preferences, roles, permissions)
    }

    async fn load_items(&self) -> Result<Vec<MenuItem>, DomainError> {
        match self.config_repo.find_active().await? {
            Some(config) => self.item_repo.list_by_config(&config.id).await,
            None if self.fallback_to_default => {
                warn!("No active menu configuration, using the built-in default menu");
                fallback_menu_items()
            }
            None => Err(DomainError::NoActiveConfiguration),
        }
    }
}

/// Filter and order a flat item list for one caller.
///
/// Items that are not visible by definition or fail the role/permission gate
/// are dropped with their subtree. A preference hiding an item wins over any
/// other override. Pinned items come first among their siblings. Folders
/// left without children are dropped.
pub fn resolve_tree(
    items: &[MenuItem],
    preferences: &[UserMenuPreference],
    roles: &[String],
    permissions: &[String],
) -> Result<Vec<ResolvedMenuNode>, DomainError> {
    let arena = MenuArena::build(items)?;
    let index = PreferenceIndex::new(preferences);
    let ctx = ResolveContext {
        arena: &arena,
        preferences: &index,
        roles,
        permissions,
    };

    Ok(ctx.resolve_siblings(&arena.nodes()))
}

struct ResolveContext<'a, 'p> {
    arena: &'a MenuArena<'a>,
    preferences: &'a PreferenceIndex<'p>,
    roles: &'a [String],
    permissions: &'a [String],
}

impl ResolveContext<'_, '_> {
    fn resolve_siblings(&self, nodes: &[ArenaNode]) -> Vec<ResolvedMenuNode> {
        let mut resolved: Vec<((bool, i32, i32, usize), ResolvedMenuNode)> = nodes
            .iter()
            .filter_map(|node| {
                let base_order = self.arena.item(node.index).order_index;
                self.resolve_node(node).map(|resolved| {
                    ((!resolved.is_pinned, resolved.order, base_order, node.index), resolved)
                })
            })
            .collect();

        resolved.sort_by_key(|(key, _)| *key);
        resolved.into_iter().map(|(_, node)| node).collect()
    }

    fn resolve_node(&self, node: &ArenaNode) -> Option<ResolvedMenuNode> {
        let item = self.arena.item(node.index);

        if !item.is_visible || !item.is_accessible(self.roles, self.permissions) {
            return None;
        }

        let preference = self.preferences.lookup(item);
        if preference.is_some_and(|p| !p.is_visible) {
            return None;
        }

        let children = self.resolve_siblings(&node.children);
        if item.kind.is_folder() && children.is_empty() {
            return None;
        }

        let title = preference
            .and_then(|p| p.custom_label.clone())
            .unwrap_or_else(|| item.title.clone());
        let order = preference.and_then(|p| p.order).unwrap_or(item.order_index);

        Some(ResolvedMenuNode {
            id: item.id.to_string(),
            title,
            title_key: item.title_key.clone(),
            item_type: item.kind.code(),
            icon: preference
                .and_then(|p| p.custom_icon.clone())
                .or_else(|| item.icon.clone()),
            program_id: item.kind.program_id().map(str::to_string),
            href: item.kind.href(),
            external_url: item.kind.external_url().map(str::to_string),
            query_builder_id: item.kind.query_builder_id().map(str::to_string),
            is_visible: true,
            is_favorite: preference.is_some_and(|p| p.is_favorite),
            is_pinned: preference.is_some_and(|p| p.is_pinned),
            color: preference.and_then(|p| p.custom_color.clone()),
            badge: preference.and_then(|p| p.custom_badge.clone()),
            order,
            depth: node.depth,
            children,
        })
    }
}
