//! The tray's context menu.
//!
//! The menu is static: a flat list under root id 0, published at a fixed
//! revision. Item ids double as the key for dispatching clicks.

use std::collections::BTreeMap;

use bolt_core::AppAction;

use crate::value::PropValue;

pub const MENU_REVISION: u32 = 1;
pub const ROOT_ID: i32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuEntry {
    pub id: i32,
    pub label: Option<&'static str>,
    pub action: Option<AppAction>,
    pub icon_name: Option<&'static str>,
}

impl MenuEntry {
    #[must_use]
    pub fn is_separator(&self) -> bool {
        self.label.is_none() && self.action.is_none()
    }
}

pub const MENU_ENTRIES: [MenuEntry; 5] = [
    MenuEntry {
        id: 1,
        label: Some("Show / Hide"),
        action: Some(AppAction::ToggleWindow),
        icon_name: None,
    },
    MenuEntry {
        id: 2,
        label: Some("Preferences"),
        action: Some(AppAction::Preferences),
        icon_name: Some("preferences-system-symbolic"),
    },
    MenuEntry {
        id: 3,
        label: Some("About"),
        action: Some(AppAction::About),
        icon_name: Some("help-about-symbolic"),
    },
    MenuEntry {
        id: 4,
        label: None,
        action: None,
        icon_name: None,
    },
    MenuEntry {
        id: 5,
        label: Some("Quit"),
        action: Some(AppAction::Quit),
        icon_name: Some("application-exit-symbolic"),
    },
];

/// Action bound to a menu item id. Separators and unknown ids have none.
#[must_use]
pub fn action_for_item(id: i32) -> Option<AppAction> {
    MENU_ENTRIES
        .iter()
        .find(|entry| entry.id == id)
        .and_then(|entry| entry.action)
}

/// One node of a `GetLayout` reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutNode {
    pub id: i32,
    pub properties: BTreeMap<&'static str, PropValue>,
    pub children: Vec<LayoutNode>,
}

impl LayoutNode {
    fn entry(entry: &MenuEntry) -> Self {
        let mut properties = BTreeMap::new();
        properties.insert("visible", PropValue::Bool(true));
        properties.insert("enabled", PropValue::Bool(true));
        let kind = if entry.is_separator() { "separator" } else { "standard" };
        properties.insert("type", PropValue::from(kind));
        if let Some(label) = entry.label {
            properties.insert("label", PropValue::from(label));
        }
        if let Some(action) = entry.action {
            properties.insert("action", PropValue::Str(action.detailed_name()));
        }
        if let Some(icon) = entry.icon_name {
            properties.insert("icon-name", PropValue::from(icon));
        }

        Self {
            id: entry.id,
            properties,
            children: Vec::new(),
        }
    }

    /// Property lookup by name, used by tests and debugging.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropValue> {
        self.properties.get(name)
    }
}

/// Menu layout with its revision.
///
/// Depth and property filters are not applied; the root always carries the
/// full static tree. Any other parent id yields an empty root.
#[must_use]
pub fn layout(parent_id: i32) -> (u32, LayoutNode) {
    let mut root = LayoutNode {
        id: ROOT_ID,
        properties: BTreeMap::from([("children-display", PropValue::from("submenu"))]),
        children: Vec::new(),
    };
    if parent_id == ROOT_ID {
        root.children = MENU_ENTRIES.iter().map(LayoutNode::entry).collect();
    }
    (MENU_REVISION, root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_for_item() {
        assert_eq!(action_for_item(1), Some(AppAction::ToggleWindow));
        assert_eq!(action_for_item(2), Some(AppAction::Preferences));
        assert_eq!(action_for_item(5), Some(AppAction::Quit));
        assert_eq!(action_for_item(4), None, "separator");
        assert_eq!(action_for_item(ROOT_ID), None);
        assert_eq!(action_for_item(42), None);
    }

    #[test]
    fn test_root_layout() {
        let (revision, root) = layout(ROOT_ID);
        assert_eq!(revision, MENU_REVISION);
        assert_eq!(root.id, 0);
        assert_eq!(
            root.property("children-display"),
            Some(&PropValue::from("submenu"))
        );

        let ids: Vec<i32> = root.children.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);

        let separator = &root.children[3];
        assert_eq!(separator.property("type"), Some(&PropValue::from("separator")));
        assert!(separator.property("label").is_none());
        assert!(separator.property("action").is_none());

        let quit = &root.children[4];
        assert_eq!(quit.property("type"), Some(&PropValue::from("standard")));
        assert_eq!(quit.property("action"), Some(&PropValue::from("app.quit")));
        assert_eq!(
            quit.property("icon-name"),
            Some(&PropValue::from("application-exit-symbolic"))
        );
        assert!(root.children.iter().all(|c| {
            c.property("visible") == Some(&PropValue::Bool(true))
                && c.property("enabled") == Some(&PropValue::Bool(true))
        }));
    }

    #[test]
    fn test_non_root_parent_is_empty() {
        let (revision, node) = layout(3);
        assert_eq!(revision, MENU_REVISION);
        assert!(node.children.is_empty());
    }
}
