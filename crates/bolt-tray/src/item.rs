use std::fmt;

use crate::MENU_PATH;

pub const DEFAULT_ICON: &str = "system-run-symbolic";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemStatus {
    Passive,
    #[default]
    Active,
    NeedsAttention,
}

impl ItemStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ItemStatus::Passive => "Passive",
            ItemStatus::Active => "Active",
            ItemStatus::NeedsAttention => "NeedsAttention",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Published state of the tray icon and its menu object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrayModel {
    pub id: String,
    pub category: String,
    pub title: String,
    pub status: ItemStatus,
    pub icon_name: String,
    pub tooltip_text: String,
    pub menu_path: String,
    /// Menu object `Status`, separate from the item's.
    pub menu_status: String,
    pub menu_version: u32,
    pub text_direction: String,
    pub icon_theme_path: Vec<String>,
}

impl Default for TrayModel {
    fn default() -> Self {
        Self {
            id: "Bolt".to_string(),
            category: "ApplicationStatus".to_string(),
            title: "Bolt".to_string(),
            status: ItemStatus::Active,
            icon_name: DEFAULT_ICON.to_string(),
            tooltip_text: "Bolt Launcher".to_string(),
            menu_path: MENU_PATH.to_string(),
            menu_status: "normal".to_string(),
            menu_version: 3,
            text_direction: "ltr".to_string(),
            icon_theme_path: Vec::new(),
        }
    }
}

impl TrayModel {
    /// Tooltip as `a(ss)`: the icon entry, then title and text.
    #[must_use]
    pub fn tooltip(&self) -> Vec<(String, String)> {
        vec![
            (self.icon_name.clone(), String::new()),
            (self.title.clone(), self.tooltip_text.clone()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let model = TrayModel::default();
        assert_eq!(model.status.to_string(), "Active");
        assert_eq!(model.menu_path, MENU_PATH);
        assert_eq!(
            model.tooltip(),
            vec![
                (DEFAULT_ICON.to_string(), String::new()),
                ("Bolt".to_string(), "Bolt Launcher".to_string()),
            ]
        );
    }
}
