// ============================================================================
// TopSteel Core - Menu Tree
// File: crates/topsteel-core/src/services/menu_tree.rs
// Description: Arena tree over a flat item list, nested item input/output
// ============================================================================

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::domain::{MenuItem, MenuItemKind};
use crate::error::DomainError;

/// Tree node pointing into the item slice the arena was built from
#[derive(Debug, Clone, PartialEq)]
pub struct ArenaNode {
    pub index: usize,
    pub depth: u32,
    pub children: Vec<ArenaNode>,
}

/// Flat item storage plus a parent → children index.
///
/// Siblings are kept in `(order_index, insertion order)` order. Items whose
/// parent is not part of the slice are dropped with a warning, together with
/// their descendants.
#[derive(Debug)]
pub struct MenuArena<'a> {
    items: &'a [MenuItem],
    roots: Vec<usize>,
    children: HashMap<Uuid, Vec<usize>>,
}

impl<'a> MenuArena<'a> {
    /// Index `items`, failing with `MenuTreeCycle` on circular parent links
    pub fn build(items: &'a [MenuItem]) -> Result<Self, DomainError> {
        let by_id: HashMap<Uuid, usize> = items
            .iter()
            .enumerate()
            .map(|(index, item)| (item.id, index))
            .collect();

        let mut roots = Vec::new();
        let mut children: HashMap<Uuid, Vec<usize>> = HashMap::new();

        for (index, item) in items.iter().enumerate() {
            match item.parent_id {
                None => roots.push(index),
                Some(parent_id) if parent_id == item.id => {
                    return Err(DomainError::MenuTreeCycle(item.id));
                }
                Some(parent_id) if by_id.contains_key(&parent_id) => {
                    children.entry(parent_id).or_default().push(index);
                }
                Some(parent_id) => {
                    warn!(
                        "Dropping menu item {} ({}): parent {} is not in configuration {}",
                        item.id, item.title, parent_id, item.config_id
                    );
                }
            }
        }

        let sibling_key = |index: &usize| (items[*index].order_index, *index);
        roots.sort_by_key(sibling_key);
        for siblings in children.values_mut() {
            siblings.sort_by_key(sibling_key);
        }

        let arena = Self { items, roots, children };
        arena.check_cycles(&by_id)?;
        Ok(arena)
    }

    /// Items unreachable from a root either hang below an orphan or sit on a
    /// cycle; walking up their parent chain tells the two apart.
    fn check_cycles(&self, by_id: &HashMap<Uuid, usize>) -> Result<(), DomainError> {
        let reachable = self.reachable();
        if reachable.len() == self.items.len() {
            return Ok(());
        }

        for (index, item) in self.items.iter().enumerate() {
            if reachable.contains(&index) {
                continue;
            }

            let mut seen = HashSet::new();
            let mut current = item;
            while let Some(parent_id) = current.parent_id {
                if !seen.insert(current.id) {
                    return Err(DomainError::MenuTreeCycle(current.id));
                }
                match by_id.get(&parent_id) {
                    Some(&parent_index) => current = &self.items[parent_index],
                    None => break,
                }
            }
        }

        Ok(())
    }

    fn reachable(&self) -> HashSet<usize> {
        let mut seen = HashSet::with_capacity(self.items.len());
        let mut stack: Vec<usize> = self.roots.clone();

        while let Some(index) = stack.pop() {
            if seen.insert(index) {
                if let Some(kids) = self.children.get(&self.items[index].id) {
                    stack.extend(kids.iter().copied());
                }
            }
        }

        seen
    }

    pub fn item(&self, index: usize) -> &'a MenuItem {
        &self.items[index]
    }

    /// Whole forest, depth 0 at the roots
    pub fn nodes(&self) -> Vec<ArenaNode> {
        self.roots.iter().map(|&index| self.node(index, 0)).collect()
    }

    fn node(&self, index: usize, depth: u32) -> ArenaNode {
        let children = self
            .children
            .get(&self.items[index].id)
            .map(|kids| kids.iter().map(|&kid| self.node(kid, depth + 1)).collect())
            .unwrap_or_default();

        ArenaNode { index, depth, children }
    }

    /// Ids of `id` and everything below it
    pub fn subtree_ids(&self, id: &Uuid) -> Vec<Uuid> {
        let mut ids = vec![*id];
        let mut cursor = 0;
        while cursor < ids.len() {
            if let Some(kids) = self.children.get(&ids[cursor]) {
                ids.extend(kids.iter().map(|&kid| self.items[kid].id));
            }
            cursor += 1;
        }
        ids
    }

    /// Unfiltered tree of full item data
    pub fn to_tree(&self) -> Vec<MenuTreeNode> {
        fn convert(arena: &MenuArena<'_>, node: &ArenaNode) -> MenuTreeNode {
            let item = arena.item(node.index);
            MenuTreeNode {
                id: item.id,
                parent_id: item.parent_id,
                title: item.title.clone(),
                title_key: item.title_key.clone(),
                icon: item.icon.clone(),
                kind: item.kind.clone(),
                order_index: item.order_index,
                is_visible: item.is_visible,
                required_roles: item.required_roles.clone(),
                required_permissions: item.required_permissions.clone(),
                depth: node.depth,
                children: node.children.iter().map(|c| convert(arena, c)).collect(),
            }
        }

        self.nodes().iter().map(|n| convert(self, n)).collect()
    }
}

/// Administrative view of a configuration tree
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuTreeNode {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub title: String,
    pub title_key: Option<String>,
    pub icon: Option<String>,
    #[serde(flatten)]
    pub kind: MenuItemKind,
    pub order_index: i32,
    pub is_visible: bool,
    pub required_roles: Vec<String>,
    pub required_permissions: Vec<String>,
    pub depth: u32,
    pub children: Vec<MenuTreeNode>,
}

fn default_true() -> bool {
    true
}

/// Nested item description used to create, replace and import trees.
/// Exported trees deserialize into it directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemInput {
    pub title: String,
    #[serde(default)]
    pub title_key: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(flatten)]
    pub kind: MenuItemKind,
    #[serde(default)]
    pub order_index: Option<i32>,
    #[serde(default = "default_true")]
    pub is_visible: bool,
    #[serde(default, alias = "roles")]
    pub required_roles: Vec<String>,
    #[serde(default, alias = "permissions")]
    pub required_permissions: Vec<String>,
    #[serde(default)]
    pub children: Vec<MenuItemInput>,
}

impl MenuItemInput {
    pub fn new(title: impl Into<String>, kind: MenuItemKind) -> Self {
        Self {
            title: title.into(),
            title_key: None,
            icon: None,
            kind,
            order_index: None,
            is_visible: true,
            required_roles: Vec::new(),
            required_permissions: Vec::new(),
            children: Vec::new(),
        }
    }
}

/// Flatten nested inputs into items of `config_id`, parents before children.
///
/// Items without an explicit order are numbered by position, starting at 1.
/// Non-folder items must carry their type-specific target.
pub fn flatten_inputs(
    config_id: Uuid,
    parent_id: Option<Uuid>,
    inputs: &[MenuItemInput],
    created_by: Option<Uuid>,
    out: &mut Vec<MenuItem>,
) -> Result<(), DomainError> {
    for (position, input) in inputs.iter().enumerate() {
        if !input.kind.has_target() {
            return Err(DomainError::ValidationError(format!(
                "Menu item '{}' of type {} has no target",
                input.title,
                input.kind.code()
            )));
        }

        let order_index = input.order_index.unwrap_or(position as i32 + 1);
        let mut item = MenuItem::new(
            config_id,
            parent_id,
            input.title.clone(),
            input.kind.clone(),
            order_index,
        )?;
        item.title_key = input.title_key.clone();
        item.icon = input.icon.clone();
        item.is_visible = input.is_visible;
        item.required_roles = input.required_roles.clone();
        item.required_permissions = input.required_permissions.clone();
        item.audit.created_by = created_by;

        let item_id = item.id;
        out.push(item);
        flatten_inputs(config_id, Some(item_id), &input.children, created_by, out)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(config_id: Uuid, parent_id: Option<Uuid>, title: &str, order: i32) -> MenuItem {
        MenuItem::new(config_id, parent_id, title.to_string(), MenuItemKind::Folder, order).unwrap()
    }

    #[test]
    fn test_siblings_sorted_by_order_then_insertion() {
        let config = Uuid::new_v4();
        let root = item(config, None, "Root", 1);
        let items = vec![
            root.clone(),
            item(config, Some(root.id), "B", 2),
            item(config, Some(root.id), "A", 1),
            item(config, Some(root.id), "C", 2),
        ];

        let arena = MenuArena::build(&items).unwrap();
        let tree = arena.to_tree();

        let titles: Vec<_> = tree[0].children.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
        assert_eq!(tree[0].children[0].depth, 1);
    }

    #[test]
    fn test_orphans_are_dropped() {
        let config = Uuid::new_v4();
        let orphan = item(config, Some(Uuid::new_v4()), "Orphan", 1);
        let items = vec![
            item(config, None, "Root", 1),
            orphan.clone(),
            item(config, Some(orphan.id), "Below orphan", 1),
        ];

        let arena = MenuArena::build(&items).unwrap();
        assert_eq!(arena.nodes().len(), 1);
        assert!(arena.nodes()[0].children.is_empty());
    }

    #[test]
    fn test_cycle_is_reported() {
        let config = Uuid::new_v4();
        let mut a = item(config, None, "A", 1);
        let mut b = item(config, None, "B", 2);
        a.parent_id = Some(b.id);
        b.parent_id = Some(a.id);
        let items = vec![item(config, None, "Root", 1), a, b];

        assert!(matches!(
            MenuArena::build(&items),
            Err(DomainError::MenuTreeCycle(_))
        ));
    }

    #[test]
    fn test_self_parent_is_a_cycle() {
        let config = Uuid::new_v4();
        let mut a = item(config, None, "A", 1);
        a.parent_id = Some(a.id);

        let items = [a.clone()];
        assert!(matches!(
            MenuArena::build(&items),
            Err(DomainError::MenuTreeCycle(id)) if id == a.id
        ));
    }

    #[test]
    fn test_subtree_ids() {
        let config = Uuid::new_v4();
        let root = item(config, None, "Root", 1);
        let child = item(config, Some(root.id), "Child", 1);
        let grandchild = item(config, Some(child.id), "Grandchild", 1);
        let other = item(config, None, "Other", 2);
        let items = vec![root.clone(), child.clone(), grandchild.clone(), other];

        let arena = MenuArena::build(&items).unwrap();
        let ids = arena.subtree_ids(&root.id);

        assert_eq!(ids, vec![root.id, child.id, grandchild.id]);
    }

    #[test]
    fn test_flatten_assigns_parents_and_positions() {
        let inputs: Vec<MenuItemInput> = serde_json::from_value(json!([
            { "title": "Admin", "type": "M", "roles": ["ADMIN"], "children": [
                { "title": "Users", "type": "P", "programId": "/admin/users" },
                { "title": "Docs", "type": "L", "externalUrl": "https://docs.topsteel.tech", "orderIndex": 9 }
            ]}
        ]))
        .unwrap();

        let config = Uuid::new_v4();
        let mut items = Vec::new();
        flatten_inputs(config, None, &inputs, None, &mut items).unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].required_roles, vec!["ADMIN".to_string()]);
        assert_eq!(items[1].parent_id, Some(items[0].id));
        assert_eq!(items[1].order_index, 1);
        assert_eq!(items[2].order_index, 9);
        assert_eq!(items[2].kind.external_url(), Some("https://docs.topsteel.tech"));
    }

    #[test]
    fn test_flatten_rejects_missing_target() {
        let inputs = vec![MenuItemInput::new("Broken", MenuItemKind::Program { program_id: None })];
        let mut items = Vec::new();

        let result = flatten_inputs(Uuid::new_v4(), None, &inputs, None, &mut items);
        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }
}
