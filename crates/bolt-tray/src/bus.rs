//! The transport seam between the tray service and a message bus.

use crate::dispatch::{MethodCall, Reply};
use crate::error::Result;
use crate::schema::InterfaceContract;
use crate::value::PropValue;
use crate::{ITEM_INTERFACE, MENU_INTERFACE};

/// Handle for an exported object, valid until unregistered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistrationId(pub u64);

/// Handle for a bus-name ownership request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(pub u64);

/// Outcome notifications for a name request, delivered asynchronously.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameEvent {
    BusReady,
    Acquired(String),
    Lost(String),
}

/// Outbound signals the service emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    NewStatus(String),
    NewIcon,
    LayoutUpdated { revision: u32, parent: i32 },
}

impl Signal {
    #[must_use]
    pub fn interface(&self) -> &'static str {
        match self {
            Signal::NewStatus(_) | Signal::NewIcon => ITEM_INTERFACE,
            Signal::LayoutUpdated { .. } => MENU_INTERFACE,
        }
    }

    #[must_use]
    pub fn member(&self) -> &'static str {
        match self {
            Signal::NewStatus(_) => "NewStatus",
            Signal::NewIcon => "NewIcon",
            Signal::LayoutUpdated { .. } => "LayoutUpdated",
        }
    }
}

/// Answers method calls and property reads for one exported object.
///
/// Called on the bus dispatch thread: implementations must not block on the
/// UI.
pub trait ObjectHandler: Send + Sync {
    fn call(&self, call: MethodCall) -> Reply;

    /// Read a property declared by `interface`. `None` means not found.
    fn property(&self, interface: &str, name: &str) -> Option<PropValue>;
}

/// A connected message bus.
///
/// Name acquisition is asynchronous: implementations report the result of
/// [`Bus::own_name`] as [`NameEvent`]s through whatever channel they were
/// connected with.
pub trait Bus: Send + 'static {
    /// Export an object at `path` implementing `contract`.
    ///
    /// # Errors
    ///
    /// Fails if the path is taken or the bus rejects the export.
    fn register_object(
        &mut self,
        path: &str,
        contract: &InterfaceContract,
        handler: std::sync::Arc<dyn ObjectHandler>,
    ) -> Result<RegistrationId>;

    /// Remove an exported object. Returns `false` if `id` was not registered.
    fn unregister_object(&mut self, id: RegistrationId) -> bool;

    /// Request ownership of `name`.
    ///
    /// # Errors
    ///
    /// Fails if the request cannot be sent.
    fn own_name(&mut self, name: &str) -> Result<OwnerId>;

    /// Release a name obtained through [`Bus::own_name`].
    fn unown_name(&mut self, id: OwnerId);

    /// Call a method taking a single string argument and discard the reply.
    ///
    /// # Errors
    ///
    /// Fails if the destination is absent or returns an error.
    fn call_method(
        &self,
        destination: &str,
        path: &str,
        interface: &str,
        method: &str,
        argument: &str,
    ) -> Result<()>;

    /// Broadcast `signal` from the object at `path`.
    ///
    /// # Errors
    ///
    /// Fails if the signal cannot be sent.
    fn emit_signal(&self, path: &str, signal: &Signal) -> Result<()>;
}
