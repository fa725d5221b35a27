//! Tray icon for Bolt, published over D-Bus.
//!
//! Two objects are exported on the session bus: a `org.kde.StatusNotifierItem`
//! at [`ITEM_PATH`] and its `com.canonical.dbusmenu` context menu at
//! [`MENU_PATH`]. Both are answered by hand from a message router instead of
//! a generated object server.
//!
//! # Architecture
//!
//! - [`schema`]: embedded interface XML and contract validation
//! - [`item`]: tray item state (status, icon, tooltip)
//! - [`menu`]: the static context menu and its id-to-action table
//! - [`dispatch`]: property dispatcher plus item and menu method handlers
//! - [`bus`]: the transport seam the service is written against
//! - [`service`]: startup, name lifecycle, change signals and teardown
//! - [`zbus_bus`]: the zbus implementation of [`Bus`]
//! - [`handle`]: the tray thread and its command channel
//!
//! Every method call that affects the UI is turned into an
//! [`AppAction`](bolt_core::AppAction) and posted to the UI thread; handlers
//! never touch UI state themselves.

pub mod bus;
pub mod dispatch;
pub mod error;
pub mod handle;
pub mod item;
pub mod menu;
pub mod schema;
pub mod service;
pub mod value;
pub mod zbus_bus;

pub use bus::{Bus, NameEvent, ObjectHandler, OwnerId, RegistrationId, Signal};
pub use dispatch::{ItemHandler, MenuHandler, MethodCall, Reply, ReplyError, get_property};
pub use error::{Result, TrayError};
pub use handle::{TrayEvent, TrayHandle};
pub use item::{ItemStatus, TrayModel};
pub use menu::{LayoutNode, MENU_REVISION, MenuEntry, action_for_item, layout};
pub use schema::{InterfaceContract, load_contracts};
pub use service::{StatusNotifierService, service_name};
pub use value::PropValue;
pub use zbus_bus::ZbusBus;

/// Object path of the tray item.
pub const ITEM_PATH: &str = "/StatusNotifierItem";
/// Object path of the tray menu.
pub const MENU_PATH: &str = "/org/ayatana/NotificationItem/Bolt/Menu";

pub const ITEM_INTERFACE: &str = "org.kde.StatusNotifierItem";
pub const MENU_INTERFACE: &str = "com.canonical.dbusmenu";

pub const WATCHER_BUS_NAME: &str = "org.kde.StatusNotifierWatcher";
pub const WATCHER_PATH: &str = "/StatusNotifierWatcher";
pub const WATCHER_INTERFACE: &str = "org.kde.StatusNotifierWatcher";
