//! The tray service: brings both objects up, owns the bus name, publishes
//! state changes and tears everything down again.

use std::sync::{Arc, RwLock};

use bolt_core::ActionSender;
use tracing::{debug, error, info, warn};

use crate::bus::{Bus, NameEvent, OwnerId, RegistrationId, Signal};
use crate::dispatch::{ItemHandler, MenuHandler};
use crate::error::{Result, TrayError};
use crate::item::{ItemStatus, TrayModel};
use crate::menu::{MENU_REVISION, ROOT_ID};
use crate::schema::load_contracts;
use crate::{ITEM_PATH, MENU_PATH, WATCHER_BUS_NAME, WATCHER_INTERFACE, WATCHER_PATH};

const SERVICE_NAME_PREFIX: &str = "org.kde.StatusNotifierItem";

type PropertyChangedCallback = Box<dyn Fn(&str) + Send>;

/// Bus name for this process: `org.kde.StatusNotifierItem-<pid>-<instance>`.
#[must_use]
pub fn service_name(pid: u32, instance: u32) -> String {
    format!("{SERVICE_NAME_PREFIX}-{pid}-{instance}")
}

pub struct StatusNotifierService<B: Bus> {
    bus: Option<B>,
    item_registration: Option<RegistrationId>,
    menu_registration: Option<RegistrationId>,
    name_owner: Option<OwnerId>,
    bus_name: String,
    model: Arc<RwLock<TrayModel>>,
    on_property_changed: Option<PropertyChangedCallback>,
}

impl<B: Bus> StatusNotifierService<B> {
    /// Validate the interfaces, connect, export both objects and request the
    /// bus name. Name acquisition completes later through
    /// [`on_name_event`](Self::on_name_event).
    ///
    /// # Errors
    ///
    /// Any failing step aborts startup; objects exported by earlier steps are
    /// unregistered first.
    pub fn start<C>(connect: C, actions: ActionSender) -> Result<Self>
    where
        C: FnOnce() -> Result<B>,
    {
        let (item_contract, menu_contract) = load_contracts()?;
        let mut bus = connect()?;
        let model = Arc::new(RwLock::new(TrayModel::default()));

        let item_handler = Arc::new(ItemHandler::new(Arc::clone(&model), actions.clone()));
        let item_registration = bus.register_object(ITEM_PATH, &item_contract, item_handler)?;

        let menu_handler = Arc::new(MenuHandler::new(Arc::clone(&model), actions));
        let menu_registration =
            match bus.register_object(MENU_PATH, &menu_contract, menu_handler) {
                Ok(id) => id,
                Err(e) => {
                    bus.unregister_object(item_registration);
                    return Err(e);
                }
            };

        let bus_name = service_name(std::process::id(), 1);
        let name_owner = match bus.own_name(&bus_name) {
            Ok(id) => id,
            Err(e) => {
                bus.unregister_object(menu_registration);
                bus.unregister_object(item_registration);
                return Err(e);
            }
        };

        info!("Tray service exported, requesting '{bus_name}'");
        Ok(Self {
            bus: Some(bus),
            item_registration: Some(item_registration),
            menu_registration: Some(menu_registration),
            name_owner: Some(name_owner),
            bus_name,
            model,
            on_property_changed: None,
        })
    }

    #[must_use]
    pub fn bus_name(&self) -> &str {
        &self.bus_name
    }

    /// Whether any object, name or connection is still held.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.item_registration.is_some()
            || self.menu_registration.is_some()
            || self.name_owner.is_some()
            || self.bus.is_some()
    }

    /// Snapshot of the published state.
    #[must_use]
    pub fn model(&self) -> Option<TrayModel> {
        self.model.read().ok().map(|model| model.clone())
    }

    /// Register the local observer for `Status`/`IconName` changes.
    pub fn connect_property_changed<F: Fn(&str) + Send + 'static>(&mut self, callback: F) {
        self.on_property_changed = Some(Box::new(callback));
    }

    pub fn on_name_event(&mut self, event: NameEvent) {
        match event {
            NameEvent::BusReady => debug!("Session bus ready"),
            NameEvent::Acquired(name) => self.on_name_acquired(&name),
            NameEvent::Lost(name) => {
                warn!("Lost bus name '{name}', removing tray icon");
                self.teardown();
            }
        }
    }

    fn on_name_acquired(&mut self, name: &str) {
        let Some(bus) = &self.bus else {
            return;
        };
        info!("Acquired bus name '{name}'");

        match bus.call_method(
            WATCHER_BUS_NAME,
            WATCHER_PATH,
            WATCHER_INTERFACE,
            "RegisterStatusNotifierItem",
            &self.bus_name,
        ) {
            Ok(()) => info!("Registered with {WATCHER_BUS_NAME}"),
            Err(e) => warn!("No tray host available ({WATCHER_BUS_NAME}): {e}"),
        }

        self.emit(
            MENU_PATH,
            &Signal::LayoutUpdated {
                revision: MENU_REVISION,
                parent: ROOT_ID,
            },
        );
    }

    /// Change the item status. Unchanged values are ignored.
    pub fn set_status(&mut self, status: ItemStatus) {
        if !self.update_model(|model| std::mem::replace(&mut model.status, status) != status) {
            return;
        }
        self.notify_property_changed("Status");
        self.emit(ITEM_PATH, &Signal::NewStatus(status.to_string()));
    }

    /// Change the item icon. Unchanged values are ignored.
    pub fn set_icon_name(&mut self, icon_name: &str) {
        let changed = self.update_model(|model| {
            if model.icon_name == icon_name {
                return false;
            }
            icon_name.clone_into(&mut model.icon_name);
            true
        });
        if !changed {
            return;
        }
        self.notify_property_changed("IconName");
        self.emit(ITEM_PATH, &Signal::NewIcon);
    }

    fn update_model(&self, update: impl FnOnce(&mut TrayModel) -> bool) -> bool {
        match self.model.write() {
            Ok(mut model) => update(&mut model),
            Err(_) => {
                error!("Tray model lock poisoned, update dropped");
                false
            }
        }
    }

    fn notify_property_changed(&self, property: &str) {
        if let Some(callback) = &self.on_property_changed {
            callback(property);
        }
    }

    fn emit(&self, path: &str, signal: &Signal) {
        let result = self
            .bus
            .as_ref()
            .ok_or(TrayError::NotConnected)
            .and_then(|bus| bus.emit_signal(path, signal));
        if let Err(e) = result {
            warn!("Failed to emit {}: {e}", signal.member());
        }
    }

    /// Unregister both objects, release the name and drop the connection, in
    /// that order. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        let Some(bus) = self.bus.as_mut() else {
            return;
        };

        for registration in [self.item_registration.take(), self.menu_registration.take()]
            .into_iter()
            .flatten()
        {
            if !bus.unregister_object(registration) {
                debug!("Object {registration:?} was already gone");
            }
        }
        if let Some(owner) = self.name_owner.take() {
            bus.unown_name(owner);
        }
        self.bus = None;
        info!("Tray service stopped");
    }
}

impl<B: Bus> Drop for StatusNotifierService<B> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_name() {
        assert_eq!(service_name(4242, 1), "org.kde.StatusNotifierItem-4242-1");
    }
}
