//! Built-in navigation tree, used to seed the default configuration and as
//! the resolution fallback when no configuration is active.

use std::collections::HashMap;

use uuid::Uuid;

use topsteel_shared::constants::{ROLE_ADMIN, ROLE_SUPER_ADMIN};

use crate::domain::{MenuItem, MenuItemKind};
use crate::error::DomainError;
use crate::services::menu_tree::{flatten_inputs, MenuItemInput};

pub const DEFAULT_CONFIGURATION_NAME: &str = "Configuration par défaut";
pub const DEFAULT_CONFIGURATION_DESCRIPTION: &str = "Configuration de menu par défaut";

fn program(title: &str, title_key: &str, route: &str, icon: &str, order: i32) -> MenuItemInput {
    let mut input = MenuItemInput::new(
        title,
        MenuItemKind::Program { program_id: Some(route.to_string()) },
    );
    input.title_key = Some(title_key.to_string());
    input.icon = Some(icon.to_string());
    input.order_index = Some(order);
    input
}

fn admin_program(
    title: &str,
    title_key: &str,
    route: &str,
    icon: &str,
    order: i32,
    permission: &str,
) -> MenuItemInput {
    let mut input = program(title, title_key, route, icon, order);
    input.required_permissions = vec![permission.to_string()];
    input
}

pub fn default_menu() -> Vec<MenuItemInput> {
    let mut administration = MenuItemInput::new("Administration", MenuItemKind::Folder);
    administration.title_key = Some("administration".to_string());
    administration.icon = Some("Shield".to_string());
    administration.order_index = Some(100);
    administration.required_roles = vec![ROLE_ADMIN.to_string(), ROLE_SUPER_ADMIN.to_string()];
    administration.children = vec![
        admin_program("Gestion des utilisateurs", "users_management", "/admin/users", "Users", 1, "USER_MANAGEMENT_VIEW"),
        admin_program("Gestion des rôles", "roles_management", "/admin/roles", "Shield", 2, "ROLE_MANAGEMENT_VIEW"),
        admin_program("Gestion des groupes", "groups_management", "/admin/groups", "Building", 3, "USER_MANAGEMENT_VIEW"),
        admin_program("Gestion des menus", "menu_management", "/admin/menus", "Menu", 4, "MENU_MANAGEMENT_VIEW"),
    ];

    vec![
        program("Tableau de bord", "dashboard", "/dashboard", "Home", 1),
        administration,
        program("Query Builder", "query_builder", "/query-builder", "Database", 50),
    ]
}

/// Namespace of the ids given to the built-in tree when it is served
/// without a stored configuration
const FALLBACK_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2a7e_4d0b_4c5e_9a3f_1b8d_7e20_c915);

/// Built-in tree as flat items whose ids derive from each item's key path.
///
/// Clients store preferences against served ids, so the same item must get
/// the same id on every call and across restarts.
pub fn fallback_menu_items() -> Result<Vec<MenuItem>, DomainError> {
    let mut items = Vec::new();
    flatten_inputs(Uuid::nil(), None, &default_menu(), None, &mut items)?;

    // minted id -> (stable id, key path); parents are flattened first
    let mut assigned: HashMap<Uuid, (Uuid, String)> = HashMap::new();
    for item in &mut items {
        let key = item.title_key.clone().unwrap_or_else(|| item.title.clone());
        let path = match item.parent_id.and_then(|parent| assigned.get(&parent)) {
            Some((stable_parent, parent_path)) => {
                item.parent_id = Some(*stable_parent);
                format!("{}/{}", parent_path, key)
            }
            None => key,
        };

        let stable = Uuid::new_v5(&FALLBACK_NAMESPACE, path.as_bytes());
        assigned.insert(item.id, (stable, path));
        item.id = stable;
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_menu_flattens() {
        let mut items = Vec::new();
        flatten_inputs(Uuid::nil(), None, &default_menu(), None, &mut items).unwrap();

        assert_eq!(items.len(), 7);
        let admin = items.iter().find(|i| i.title == "Administration").unwrap();
        assert!(admin.kind.is_folder());
        assert_eq!(items.iter().filter(|i| i.parent_id == Some(admin.id)).count(), 4);
    }

    #[test]
    fn test_fallback_ids_are_stable() {
        let first = fallback_menu_items().unwrap();
        let second = fallback_menu_items().unwrap();

        let ids = |items: &[MenuItem]| items.iter().map(|i| (i.id, i.parent_id)).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn test_fallback_children_point_at_stable_parent() {
        let items = fallback_menu_items().unwrap();
        let admin = items.iter().find(|i| i.title == "Administration").unwrap();

        assert_eq!(items.iter().filter(|i| i.parent_id == Some(admin.id)).count(), 4);
        assert!(items
            .iter()
            .filter_map(|i| i.parent_id)
            .all(|parent| items.iter().any(|i| i.id == parent)));
    }
}
