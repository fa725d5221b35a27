//! Embedded interface descriptions for the two tray objects.
//!
//! The XML is the single source of truth for what each object exposes: it is
//! validated once at startup, answers `Introspect`, and drives `GetAll`.

use zbus_xml::Node;

use crate::error::{Result, TrayError};
use crate::{ITEM_INTERFACE, MENU_INTERFACE};

pub const ITEM_XML: &str = r#"<node>
  <interface name="org.kde.StatusNotifierItem">
    <property name="Category" type="s" access="read"/>
    <property name="Id" type="s" access="read"/>
    <property name="Title" type="s" access="read"/>
    <property name="Status" type="s" access="read"/>
    <property name="IconName" type="s" access="read"/>
    <property name="ToolTip" type="a(ss)" access="read"/>
    <property name="ItemIsMenu" type="b" access="read"/>
    <property name="Menu" type="o" access="read"/>
    <method name="Activate">
      <arg name="x" type="i" direction="in"/>
      <arg name="y" type="i" direction="in"/>
    </method>
    <method name="ContextMenu">
      <arg name="x" type="i" direction="in"/>
      <arg name="y" type="i" direction="in"/>
    </method>
    <signal name="NewIcon"/>
    <signal name="NewToolTip"/>
    <signal name="NewStatus">
      <arg name="status" type="s"/>
    </signal>
  </interface>
</node>"#;

pub const MENU_XML: &str = r#"<node>
  <interface name="com.canonical.dbusmenu">
    <property name="Version" type="u" access="read"/>
    <property name="TextDirection" type="s" access="read"/>
    <property name="Status" type="s" access="read"/>
    <property name="IconThemePath" type="as" access="read"/>
    <method name="GetLayout">
      <arg name="parentId" type="i" direction="in"/>
      <arg name="recursionDepth" type="i" direction="in"/>
      <arg name="propertyNames" type="as" direction="in"/>
      <arg name="revision" type="u" direction="out"/>
      <arg name="layout" type="(ia{sv}av)" direction="out"/>
    </method>
    <method name="GetGroupProperties">
      <arg name="ids" type="ai" direction="in"/>
      <arg name="propertyNames" type="as" direction="in"/>
      <arg name="properties" type="a(ia{sv})" direction="out"/>
    </method>
    <method name="GetProperty">
      <arg name="id" type="i" direction="in"/>
      <arg name="name" type="s" direction="in"/>
      <arg name="value" type="v" direction="out"/>
    </method>
    <method name="Event">
      <arg name="id" type="i" direction="in"/>
      <arg name="eventId" type="s" direction="in"/>
      <arg name="data" type="v" direction="in"/>
      <arg name="timestamp" type="u" direction="in"/>
    </method>
    <method name="EventGroup">
      <arg name="events" type="a(isvu)" direction="in"/>
      <arg name="idErrors" type="ai" direction="out"/>
    </method>
    <method name="AboutToShow">
      <arg name="id" type="i" direction="in"/>
      <arg name="needUpdate" type="b" direction="out"/>
    </method>
    <method name="AboutToShowGroup">
      <arg name="ids" type="ai" direction="in"/>
      <arg name="updatesNeeded" type="ai" direction="out"/>
      <arg name="idErrors" type="ai" direction="out"/>
    </method>
    <signal name="ItemsPropertiesUpdated">
      <arg name="updatedProps" type="a(ia{sv})"/>
      <arg name="removedProps" type="a(ias)"/>
    </signal>
    <signal name="LayoutUpdated">
      <arg name="revision" type="u"/>
      <arg name="parent" type="i"/>
    </signal>
    <signal name="ItemActivationRequested">
      <arg name="id" type="i"/>
      <arg name="timestamp" type="u"/>
    </signal>
  </interface>
</node>"#;

/// Members an interface description must declare.
struct Required {
    methods: &'static [&'static str],
    properties: &'static [&'static str],
    signals: &'static [&'static str],
}

const ITEM_REQUIRED: Required = Required {
    methods: &["Activate", "ContextMenu"],
    properties: &[
        "Id",
        "Category",
        "Status",
        "IconName",
        "ToolTip",
        "ItemIsMenu",
        "Menu",
    ],
    signals: &["NewIcon", "NewToolTip", "NewStatus"],
};

const MENU_REQUIRED: Required = Required {
    methods: &[
        "GetLayout",
        "GetGroupProperties",
        "GetProperty",
        "Event",
        "EventGroup",
        "AboutToShow",
        "AboutToShowGroup",
    ],
    properties: &["Version", "TextDirection", "Status", "IconThemePath"],
    signals: &[
        "ItemsPropertiesUpdated",
        "LayoutUpdated",
        "ItemActivationRequested",
    ],
};

/// A validated interface: its name, members and the XML it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceContract {
    name: String,
    xml: &'static str,
    methods: Vec<String>,
    properties: Vec<String>,
    signals: Vec<String>,
}

impl InterfaceContract {
    /// Parse `xml` and check that `interface` declares every required member.
    fn parse(xml: &'static str, interface: &str, required: &Required) -> Result<Self> {
        let node = Node::try_from(xml).map_err(|e| TrayError::Schema(e.to_string()))?;
        let found = node
            .interfaces()
            .iter()
            .find(|iface| iface.name().as_str() == interface)
            .ok_or_else(|| TrayError::Schema(format!("interface '{interface}' not declared")))?;

        let contract = Self {
            name: interface.to_string(),
            xml,
            methods: found.methods().iter().map(|m| m.name().to_string()).collect(),
            properties: found
                .properties()
                .iter()
                .map(|p| p.name().to_string())
                .collect(),
            signals: found.signals().iter().map(|s| s.name().to_string()).collect(),
        };

        check_members(interface, "method", &contract.methods, required.methods)?;
        check_members(interface, "property", &contract.properties, required.properties)?;
        check_members(interface, "signal", &contract.signals, required.signals)?;
        Ok(contract)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Introspection document for the object implementing this interface.
    #[must_use]
    pub fn xml(&self) -> &'static str {
        self.xml
    }

    #[must_use]
    pub fn properties(&self) -> &[String] {
        &self.properties
    }

    #[must_use]
    pub fn has_method(&self, name: &str) -> bool {
        self.methods.iter().any(|m| m == name)
    }

    #[must_use]
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.iter().any(|p| p == name)
    }

    #[must_use]
    pub fn has_signal(&self, name: &str) -> bool {
        self.signals.iter().any(|s| s == name)
    }
}

fn check_members(interface: &str, kind: &str, declared: &[String], required: &[&str]) -> Result<()> {
    match required.iter().find(|name| !declared.iter().any(|d| d == *name)) {
        Some(missing) => Err(TrayError::Schema(format!(
            "{interface} is missing {kind} '{missing}'"
        ))),
        None => Ok(()),
    }
}

/// Validate both embedded interfaces, item first.
///
/// # Errors
///
/// Returns [`TrayError::Schema`] if either description is malformed or lacks
/// a required member.
pub fn load_contracts() -> Result<(InterfaceContract, InterfaceContract)> {
    let item = InterfaceContract::parse(ITEM_XML, ITEM_INTERFACE, &ITEM_REQUIRED)?;
    let menu = InterfaceContract::parse(MENU_XML, MENU_INTERFACE, &MENU_REQUIRED)?;
    Ok((item, menu))
}
