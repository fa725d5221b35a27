//! [`Bus`] over a zbus session connection.
//!
//! No zbus object server is used. A router thread reads every incoming
//! message, routes method calls by object path to the registered
//! [`ObjectHandler`], and encodes the handler's [`Reply`]. The standard
//! `Properties`, `Introspectable` and `Peer` interfaces are answered here from
//! the object's [`InterfaceContract`].

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::{debug, error, info, trace, warn};
use zbus::Message;
use zbus::blocking::{Connection, MessageIterator};
use zbus::fdo::{RequestNameFlags, RequestNameReply};
use zbus::message::{Header, Type as MessageType};
use zbus::names::BusName;
use zbus::zvariant::{OwnedValue, Value};

use crate::bus::{Bus, NameEvent, ObjectHandler, OwnerId, RegistrationId, Signal};
use crate::dispatch::{MethodCall, Reply};
use crate::error::{Result, TrayError};
use crate::menu::LayoutNode;
use crate::schema::InterfaceContract;
use crate::value::{PropValue, to_wire};

const DBUS_INTERFACE: &str = "org.freedesktop.DBus";
const PROPERTIES_INTERFACE: &str = "org.freedesktop.DBus.Properties";
const INTROSPECTABLE_INTERFACE: &str = "org.freedesktop.DBus.Introspectable";
const PEER_INTERFACE: &str = "org.freedesktop.DBus.Peer";

const UNKNOWN_OBJECT: &str = "org.freedesktop.DBus.Error.UnknownObject";
const UNKNOWN_INTERFACE: &str = "org.freedesktop.DBus.Error.UnknownInterface";
const UNKNOWN_METHOD: &str = "org.freedesktop.DBus.Error.UnknownMethod";
const UNKNOWN_PROPERTY: &str = "org.freedesktop.DBus.Error.UnknownProperty";
const INVALID_ARGS: &str = "org.freedesktop.DBus.Error.InvalidArgs";
const PROPERTY_READ_ONLY: &str = "org.freedesktop.DBus.Error.PropertyReadOnly";

type NameEventSink = Arc<dyn Fn(NameEvent) + Send + Sync>;
type WireProperties = HashMap<String, Value<'static>>;
type WireNode = (i32, WireProperties, Vec<Value<'static>>);

struct Exported {
    id: RegistrationId,
    contract: InterfaceContract,
    handler: Arc<dyn ObjectHandler>,
}

type ObjectTable = Arc<RwLock<HashMap<String, Exported>>>;

pub struct ZbusBus {
    connection: Connection,
    objects: ObjectTable,
    names: HashMap<OwnerId, String>,
    owned: Arc<Mutex<HashSet<String>>>,
    on_name_event: NameEventSink,
    running: Arc<AtomicBool>,
    next_id: u64,
}

impl ZbusBus {
    /// Connect to the session bus and start the router thread.
    ///
    /// Name events for [`Bus::own_name`] requests, and for a later loss of an
    /// owned name, are passed to `on_name_event`.
    ///
    /// # Errors
    ///
    /// Fails if the session bus is unreachable or the thread cannot start.
    pub fn connect<F>(on_name_event: F) -> Result<Self>
    where
        F: Fn(NameEvent) + Send + Sync + 'static,
    {
        let connection = Connection::session()?;
        let on_name_event: NameEventSink = Arc::new(on_name_event);
        let objects = ObjectTable::default();
        let owned = Arc::new(Mutex::new(HashSet::new()));
        let running = Arc::new(AtomicBool::new(true));

        let router = Router {
            connection: connection.clone(),
            objects: Arc::clone(&objects),
            owned: Arc::clone(&owned),
            on_name_event: Arc::clone(&on_name_event),
            running: Arc::clone(&running),
        };
        // Subscribe before any name is requested so no early call is missed
        let messages = MessageIterator::from(&connection);
        std::thread::Builder::new()
            .name("tray-bus".to_string())
            .spawn(move || router.run(messages))?;

        if let Some(unique) = connection.unique_name() {
            debug!("Connected to session bus as {unique}");
        }
        on_name_event(NameEvent::BusReady);

        Ok(Self {
            connection,
            objects,
            names: HashMap::new(),
            owned,
            on_name_event,
            running,
            next_id: 1,
        })
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn set_owned(&self, name: &str, owned: bool) {
        match self.owned.lock() {
            Ok(mut names) if owned => {
                names.insert(name.to_string());
            }
            Ok(mut names) => {
                names.remove(name);
            }
            Err(_) => error!("Owned-name table poisoned"),
        }
    }
}

impl Bus for ZbusBus {
    fn register_object(
        &mut self,
        path: &str,
        contract: &InterfaceContract,
        handler: Arc<dyn ObjectHandler>,
    ) -> Result<RegistrationId> {
        let id = RegistrationId(self.next_id());
        let mut objects = self.objects.write().unwrap_or_else(PoisonError::into_inner);
        if objects.contains_key(path) {
            return Err(TrayError::PathInUse(path.to_string()));
        }

        objects.insert(
            path.to_string(),
            Exported {
                id,
                contract: contract.clone(),
                handler,
            },
        );
        debug!("Exported {} at {path}", contract.name());
        Ok(id)
    }

    fn unregister_object(&mut self, id: RegistrationId) -> bool {
        let Ok(mut objects) = self.objects.write() else {
            error!("Object table poisoned, cannot unregister {id:?}");
            return false;
        };
        let path = objects
            .iter()
            .find(|(_, exported)| exported.id == id)
            .map(|(path, _)| path.clone());
        match path {
            Some(path) => {
                objects.remove(&path);
                debug!("Unexported {path}");
                true
            }
            None => false,
        }
    }

    fn own_name(&mut self, name: &str) -> Result<OwnerId> {
        let reply = self
            .connection
            .request_name_with_flags(name, RequestNameFlags::DoNotQueue.into())?;
        let id = OwnerId(self.next_id());

        match reply {
            RequestNameReply::PrimaryOwner | RequestNameReply::AlreadyOwner => {
                self.set_owned(name, true);
                (self.on_name_event)(NameEvent::Acquired(name.to_string()));
            }
            RequestNameReply::Exists => {
                (self.on_name_event)(NameEvent::Lost(name.to_string()));
            }
            RequestNameReply::InQueue => return Err(TrayError::NameRequest(name.to_string())),
        }

        self.names.insert(id, name.to_string());
        Ok(id)
    }

    fn unown_name(&mut self, id: OwnerId) {
        let Some(name) = self.names.remove(&id) else {
            return;
        };
        self.set_owned(&name, false);
        match self.connection.release_name(name.as_str()) {
            Ok(true) => debug!("Released bus name '{name}'"),
            Ok(false) => debug!("Bus name '{name}' was not owned"),
            Err(e) => warn!("Failed to release bus name '{name}': {e}"),
        }
    }

    fn call_method(
        &self,
        destination: &str,
        path: &str,
        interface: &str,
        method: &str,
        argument: &str,
    ) -> Result<()> {
        self.connection
            .call_method(Some(destination), path, Some(interface), method, &argument)?;
        Ok(())
    }

    fn emit_signal(&self, path: &str, signal: &Signal) -> Result<()> {
        let interface = signal.interface();
        let member = signal.member();
        trace!("Emitting {interface}.{member} on {path}");
        match signal {
            Signal::NewStatus(status) => {
                self.connection
                    .emit_signal(None::<BusName<'_>>, path, interface, member, status)?;
            }
            Signal::NewIcon => {
                self.connection
                    .emit_signal(None::<BusName<'_>>, path, interface, member, &())?;
            }
            Signal::LayoutUpdated { revision, parent } => {
                self.connection.emit_signal(
                    None::<BusName<'_>>,
                    path,
                    interface,
                    member,
                    &(*revision, *parent),
                )?;
            }
        }
        Ok(())
    }
}

impl Drop for ZbusBus {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Err(e) = self.connection.clone().close() {
            debug!("Closing session bus connection: {e}");
        }
    }
}

struct Router {
    connection: Connection,
    objects: ObjectTable,
    owned: Arc<Mutex<HashSet<String>>>,
    on_name_event: NameEventSink,
    running: Arc<AtomicBool>,
}

impl Router {
    fn run(self, messages: MessageIterator) {
        info!("Tray bus router started");
        for message in messages {
            if !self.running.load(Ordering::SeqCst) {
                break;
            }
            match message {
                Ok(message) => match message.message_type() {
                    MessageType::MethodCall => self.route(&message),
                    MessageType::Signal => self.check_name_lost(&message),
                    _ => {}
                },
                Err(e) => warn!("Failed to read bus message: {e}"),
            }
        }
        debug!("Tray bus router stopped");
    }

    fn route(&self, message: &Message) {
        let header = message.header();
        let (Some(path), Some(member)) = (header.path(), header.member()) else {
            return;
        };
        let path = path.as_str();
        let member = member.as_str();
        let interface = header.interface().map(|iface| iface.as_str().to_string());
        trace!("Call {member} on {path} ({interface:?})");

        let target = match self.objects.read() {
            Ok(objects) => objects
                .get(path)
                .map(|exported| (exported.contract.clone(), Arc::clone(&exported.handler))),
            Err(_) => {
                error!("Object table poisoned, dropping call to {path}");
                return;
            }
        };
        let Some((contract, handler)) = target else {
            self.reply_error(&header, UNKNOWN_OBJECT, &format!("No object at {path}"));
            return;
        };

        match interface.as_deref() {
            Some(PROPERTIES_INTERFACE) => {
                self.handle_properties(&header, message, member, &contract, handler.as_ref());
            }
            Some(INTROSPECTABLE_INTERFACE) if member == "Introspect" => {
                self.reply(&header, &contract.xml());
            }
            Some(PEER_INTERFACE) if member == "Ping" => self.reply(&header, &()),
            Some(INTROSPECTABLE_INTERFACE | PEER_INTERFACE) => {
                self.reply_error(&header, UNKNOWN_METHOD, &format!("Unknown method {member}"));
            }
            Some(other) if other != contract.name() => {
                self.reply_error(&header, UNKNOWN_INTERFACE, &format!("Unknown interface {other}"));
            }
            _ => match decode_call(member, message) {
                Ok(call) => {
                    let reply = handler.call(call);
                    self.send_reply(&header, reply);
                }
                Err(e) => {
                    self.reply_error(&header, INVALID_ARGS, &format!("Invalid arguments for {member}: {e}"));
                }
            },
        }
    }

    fn handle_properties(
        &self,
        header: &Header<'_>,
        message: &Message,
        member: &str,
        contract: &InterfaceContract,
        handler: &dyn ObjectHandler,
    ) {
        let body = message.body();
        match member {
            "Get" => {
                let Ok((interface, name)) = body.deserialize::<(String, String)>() else {
                    self.reply_error(header, INVALID_ARGS, "Expected (interface, property)");
                    return;
                };
                if interface != contract.name() {
                    self.reply_error(header, UNKNOWN_INTERFACE, &format!("Unknown interface {interface}"));
                    return;
                }
                match handler
                    .property(&interface, &name)
                    .and_then(|value| to_wire(&name, &value))
                {
                    Some(value) => self.reply(header, &value),
                    None => {
                        self.reply_error(header, UNKNOWN_PROPERTY, &format!("Unknown property {name}"));
                    }
                }
            }
            "GetAll" => {
                let Ok(interface) = body.deserialize::<String>() else {
                    self.reply_error(header, INVALID_ARGS, "Expected interface name");
                    return;
                };
                if interface != contract.name() {
                    self.reply_error(header, UNKNOWN_INTERFACE, &format!("Unknown interface {interface}"));
                    return;
                }
                let all: WireProperties = contract
                    .properties()
                    .iter()
                    .filter_map(|name| {
                        let value = handler.property(&interface, name)?;
                        to_wire(name, &value).map(|value| (name.clone(), value))
                    })
                    .collect();
                self.reply(header, &all);
            }
            "Set" => self.reply_error(header, PROPERTY_READ_ONLY, "All tray properties are read-only"),
            other => self.reply_error(header, UNKNOWN_METHOD, &format!("Unknown method {other}")),
        }
    }

    fn send_reply(&self, header: &Header<'_>, reply: Reply) {
        match reply {
            Reply::Empty => self.reply(header, &()),
            Reply::Layout { revision, root } => self.reply(header, &(revision, wire_node(&root))),
            Reply::GroupProperties(groups) => {
                let groups: Vec<(i32, WireProperties)> = groups
                    .iter()
                    .map(|(id, properties)| {
                        let properties =
                            wire_properties(properties.iter().map(|(name, value)| (name.as_str(), value)));
                        (*id, properties)
                    })
                    .collect();
                self.reply(header, &groups);
            }
            Reply::Value(value) => match to_wire("value", &value) {
                Some(value) => self.reply(header, &value),
                None => self.reply_error(header, UNKNOWN_PROPERTY, "Property has no wire form"),
            },
            Reply::Bool(flag) => self.reply(header, &flag),
            Reply::IdErrors(ids) => self.reply(header, &ids),
            Reply::AboutToShowGroup {
                updates_needed,
                id_errors,
            } => self.reply(header, &(updates_needed, id_errors)),
            Reply::Error(e) => self.reply_error(header, e.name(), e.message()),
        }
    }

    fn reply<B>(&self, header: &Header<'_>, body: &B)
    where
        B: serde::Serialize + zbus::zvariant::DynamicType,
    {
        if let Err(e) = self.connection.reply(header, body) {
            warn!("Failed to send reply: {e}");
        }
    }

    fn reply_error(&self, header: &Header<'_>, name: &str, text: &str) {
        debug!("Replying {name}: {text}");
        if let Err(e) = self.connection.reply_error(header, name, &text) {
            warn!("Failed to send error reply: {e}");
        }
    }

    fn check_name_lost(&self, message: &Message) {
        let header = message.header();
        let is_name_lost = header
            .interface()
            .is_some_and(|iface| iface.as_str() == DBUS_INTERFACE)
            && header.member().is_some_and(|m| m.as_str() == "NameLost");
        if !is_name_lost {
            return;
        }
        let Ok(name) = message.body().deserialize::<String>() else {
            return;
        };

        let was_owned = match self.owned.lock() {
            Ok(mut owned) => owned.remove(&name),
            Err(_) => false,
        };
        if was_owned {
            (self.on_name_event)(NameEvent::Lost(name));
        }
    }
}

fn decode_call(member: &str, message: &Message) -> zbus::Result<MethodCall> {
    let body = message.body();
    Ok(match member {
        "Activate" => {
            let (x, y) = body.deserialize::<(i32, i32)>()?;
            MethodCall::Activate { x, y }
        }
        "ContextMenu" => {
            let (x, y) = body.deserialize::<(i32, i32)>()?;
            MethodCall::ContextMenu { x, y }
        }
        "GetLayout" => {
            let (parent_id, depth, property_names) = body.deserialize::<(i32, i32, Vec<String>)>()?;
            MethodCall::GetLayout {
                parent_id,
                depth,
                property_names,
            }
        }
        "GetGroupProperties" => {
            let (ids, property_names) = body.deserialize::<(Vec<i32>, Vec<String>)>()?;
            MethodCall::GetGroupProperties { ids, property_names }
        }
        "GetProperty" => {
            let (id, name) = body.deserialize::<(i32, String)>()?;
            MethodCall::GetProperty { id, name }
        }
        "Event" => {
            let (id, event_id, _data, timestamp) =
                body.deserialize::<(i32, String, OwnedValue, u32)>()?;
            MethodCall::Event {
                id,
                event_id,
                timestamp,
            }
        }
        "EventGroup" => {
            let events = body.deserialize::<Vec<(i32, String, OwnedValue, u32)>>()?;
            MethodCall::EventGroup {
                events: events
                    .into_iter()
                    .map(|(id, event_id, _data, timestamp)| (id, event_id, timestamp))
                    .collect(),
            }
        }
        "AboutToShow" => MethodCall::AboutToShow {
            id: body.deserialize::<i32>()?,
        },
        "AboutToShowGroup" => MethodCall::AboutToShowGroup {
            ids: body.deserialize::<Vec<i32>>()?,
        },
        other => MethodCall::Unknown {
            member: other.to_string(),
        },
    })
}

fn wire_properties<'a>(properties: impl Iterator<Item = (&'a str, &'a PropValue)>) -> WireProperties {
    properties
        .filter_map(|(name, value)| to_wire(name, value).map(|value| (name.to_string(), value)))
        .collect()
}

/// `(ia{sv}av)` for one layout node; children are nested as variants.
fn wire_node(node: &LayoutNode) -> WireNode {
    let properties = wire_properties(node.properties.iter().map(|(name, value)| (*name, value)));
    let children = node
        .children
        .iter()
        .map(|child| Value::from(wire_node(child)))
        .collect();
    (node.id, properties, children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::layout;

    #[test]
    fn test_wire_node_shape() {
        let (_, root) = layout(0);
        let (id, properties, children) = wire_node(&root);
        assert_eq!(id, 0);
        assert!(properties.contains_key("children-display"));
        assert_eq!(children.len(), 5);
        for child in &children {
            assert_eq!(child.value_signature().to_string(), "(ia{sv}av)");
        }
    }
}
