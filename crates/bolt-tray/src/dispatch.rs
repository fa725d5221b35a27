//! Property dispatcher and method handlers for the item and menu objects.

use std::sync::{Arc, RwLock};

use bolt_core::{ActionSender, AppAction};
use tracing::{debug, error};

use crate::bus::ObjectHandler;
use crate::item::TrayModel;
use crate::menu::{LayoutNode, action_for_item, layout};
use crate::value::PropValue;
use crate::{ITEM_INTERFACE, MENU_INTERFACE};

/// A decoded method call on one of the tray objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodCall {
    Activate { x: i32, y: i32 },
    ContextMenu { x: i32, y: i32 },
    GetLayout { parent_id: i32, depth: i32, property_names: Vec<String> },
    GetGroupProperties { ids: Vec<i32>, property_names: Vec<String> },
    GetProperty { id: i32, name: String },
    Event { id: i32, event_id: String, timestamp: u32 },
    EventGroup { events: Vec<(i32, String, u32)> },
    AboutToShow { id: i32 },
    AboutToShowGroup { ids: Vec<i32> },
    Unknown { member: String },
}

impl MethodCall {
    #[must_use]
    pub fn member(&self) -> &str {
        match self {
            MethodCall::Activate { .. } => "Activate",
            MethodCall::ContextMenu { .. } => "ContextMenu",
            MethodCall::GetLayout { .. } => "GetLayout",
            MethodCall::GetGroupProperties { .. } => "GetGroupProperties",
            MethodCall::GetProperty { .. } => "GetProperty",
            MethodCall::Event { .. } => "Event",
            MethodCall::EventGroup { .. } => "EventGroup",
            MethodCall::AboutToShow { .. } => "AboutToShow",
            MethodCall::AboutToShowGroup { .. } => "AboutToShowGroup",
            MethodCall::Unknown { member } => member,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyError {
    UnknownMethod(String),
    UnknownProperty(String),
    InvalidArgs(String),
}

impl ReplyError {
    /// D-Bus error name for this error.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ReplyError::UnknownMethod(_) => "org.freedesktop.DBus.Error.UnknownMethod",
            ReplyError::UnknownProperty(_) => "org.freedesktop.DBus.Error.UnknownProperty",
            ReplyError::InvalidArgs(_) => "org.freedesktop.DBus.Error.InvalidArgs",
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            ReplyError::UnknownMethod(m)
            | ReplyError::UnknownProperty(m)
            | ReplyError::InvalidArgs(m) => m,
        }
    }
}

/// Handler output, encoded onto the wire by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Empty,
    Layout { revision: u32, root: LayoutNode },
    GroupProperties(Vec<(i32, Vec<(String, PropValue)>)>),
    Value(PropValue),
    Bool(bool),
    IdErrors(Vec<i32>),
    AboutToShowGroup { updates_needed: Vec<i32>, id_errors: Vec<i32> },
    Error(ReplyError),
}

impl Reply {
    fn unknown_method(member: &str) -> Self {
        Reply::Error(ReplyError::UnknownMethod(format!("Unknown method {member}")))
    }
}

/// Resolve a readable property of either tray interface.
#[must_use]
pub fn get_property(model: &TrayModel, interface: &str, property: &str) -> Option<PropValue> {
    let value = match (interface, property) {
        (ITEM_INTERFACE, "Id") => PropValue::Str(model.id.clone()),
        (ITEM_INTERFACE, "Category") => PropValue::Str(model.category.clone()),
        (ITEM_INTERFACE, "Title") => PropValue::Str(model.title.clone()),
        (ITEM_INTERFACE, "Status") => PropValue::from(model.status.as_str()),
        (ITEM_INTERFACE, "IconName") => PropValue::Str(model.icon_name.clone()),
        (ITEM_INTERFACE, "ToolTip") => PropValue::Pairs(model.tooltip()),
        (ITEM_INTERFACE, "ItemIsMenu") => PropValue::Bool(true),
        (ITEM_INTERFACE, "Menu") => PropValue::ObjectPath(model.menu_path.clone()),
        (MENU_INTERFACE, "Version") => PropValue::U32(model.menu_version),
        (MENU_INTERFACE, "TextDirection") => PropValue::Str(model.text_direction.clone()),
        (MENU_INTERFACE, "Status") => PropValue::Str(model.menu_status.clone()),
        (MENU_INTERFACE, "IconThemePath") => PropValue::StrList(model.icon_theme_path.clone()),
        _ => return None,
    };
    Some(value)
}

/// Map a loosely spelled menu property name (`text-direction`,
/// `icon_theme_path`, `STATUS`) to its canonical form.
fn canonical_menu_property(name: &str) -> Option<&'static str> {
    let normalized: String = name
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect();
    match normalized.as_str() {
        "version" => Some("Version"),
        "textdirection" => Some("TextDirection"),
        "status" => Some("Status"),
        "iconthemepath" => Some("IconThemePath"),
        _ => None,
    }
}

fn read_property(model: &RwLock<TrayModel>, interface: &str, name: &str) -> Option<PropValue> {
    match model.read() {
        Ok(model) => get_property(&model, interface, name),
        Err(_) => {
            error!("Tray model lock poisoned, property '{name}' unavailable");
            None
        }
    }
}

/// Handler for the `StatusNotifierItem` object.
pub struct ItemHandler {
    model: Arc<RwLock<TrayModel>>,
    actions: ActionSender,
}

impl ItemHandler {
    pub fn new(model: Arc<RwLock<TrayModel>>, actions: ActionSender) -> Self {
        Self { model, actions }
    }
}

impl ObjectHandler for ItemHandler {
    fn call(&self, call: MethodCall) -> Reply {
        match call {
            MethodCall::Activate { x, y } | MethodCall::ContextMenu { x, y } => {
                debug!("Tray item clicked at ({x}, {y})");
                self.actions.post(AppAction::ToggleWindow);
                Reply::Empty
            }
            other => Reply::unknown_method(other.member()),
        }
    }

    fn property(&self, interface: &str, name: &str) -> Option<PropValue> {
        read_property(&self.model, interface, name)
    }
}

/// Handler for the `dbusmenu` object.
pub struct MenuHandler {
    model: Arc<RwLock<TrayModel>>,
    actions: ActionSender,
}

impl MenuHandler {
    pub fn new(model: Arc<RwLock<TrayModel>>, actions: ActionSender) -> Self {
        Self { model, actions }
    }
}

impl ObjectHandler for MenuHandler {
    fn call(&self, call: MethodCall) -> Reply {
        match call {
            MethodCall::GetLayout { parent_id, .. } => {
                let (revision, root) = layout(parent_id);
                Reply::Layout { revision, root }
            }
            MethodCall::GetGroupProperties { .. } => Reply::GroupProperties(Vec::new()),
            MethodCall::GetProperty { name, .. } => {
                let value = canonical_menu_property(&name)
                    .and_then(|canonical| read_property(&self.model, MENU_INTERFACE, canonical));
                match value {
                    Some(value) => Reply::Value(value),
                    None => Reply::Error(ReplyError::InvalidArgs(format!(
                        "Unknown property {name}"
                    ))),
                }
            }
            MethodCall::Event { id, event_id, .. } => {
                if event_id == "clicked" {
                    match action_for_item(id) {
                        Some(action) => self.actions.post(action),
                        None => debug!("Menu item {id} has no action"),
                    }
                }
                Reply::Empty
            }
            MethodCall::EventGroup { .. } => Reply::IdErrors(Vec::new()),
            MethodCall::AboutToShow { .. } => Reply::Bool(false),
            MethodCall::AboutToShowGroup { .. } => Reply::AboutToShowGroup {
                updates_needed: Vec::new(),
                id_errors: Vec::new(),
            },
            other => Reply::unknown_method(other.member()),
        }
    }

    fn property(&self, interface: &str, name: &str) -> Option<PropValue> {
        read_property(&self.model, interface, name)
    }
}
