//! The tray thread.
//!
//! The service lives on its own thread and is driven by a command channel:
//! name events from the bus, icon/status updates from the shell, and
//! shutdown.

use std::thread::JoinHandle;

use bolt_core::ActionSender;
use tracing::{debug, error, info, warn};

use crate::bus::NameEvent;
use crate::error::{Result, TrayError};
use crate::item::ItemStatus;
use crate::service::StatusNotifierService;
use crate::zbus_bus::ZbusBus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrayEvent {
    Name(NameEvent),
    SetStatus(ItemStatus),
    SetIcon(String),
    Shutdown,
}

/// Owner of the running tray thread.
pub struct TrayHandle {
    tx: async_channel::Sender<TrayEvent>,
    thread: Option<JoinHandle<()>>,
}

impl TrayHandle {
    /// Start the tray service on a new thread and wait until it has exported
    /// its objects.
    ///
    /// # Errors
    ///
    /// Returns the startup error if the service could not come up; the
    /// thread has exited by then.
    pub fn spawn(actions: ActionSender) -> Result<Self> {
        let (tx, rx) = async_channel::unbounded::<TrayEvent>();
        let (ready_tx, ready_rx) = async_channel::bounded::<Result<()>>(1);

        let events = tx.clone();
        let thread = std::thread::Builder::new()
            .name("tray".to_string())
            .spawn(move || {
                let connect = move || {
                    ZbusBus::connect(move |event| {
                        if events.try_send(TrayEvent::Name(event)).is_err() {
                            debug!("Tray thread gone, name event dropped");
                        }
                    })
                };
                let mut service = match StatusNotifierService::start(connect, actions) {
                    Ok(service) => {
                        let _ = ready_tx.send_blocking(Ok(()));
                        service
                    }
                    Err(e) => {
                        let _ = ready_tx.send_blocking(Err(e));
                        return;
                    }
                };
                service.connect_property_changed(|property| {
                    debug!("Tray property {property} changed");
                });
                run_tray(service, &rx);
            })?;

        match ready_rx.recv_blocking() {
            Ok(Ok(())) => Ok(Self {
                tx,
                thread: Some(thread),
            }),
            Ok(Err(e)) => {
                let _ = thread.join();
                Err(e)
            }
            Err(_) => {
                let _ = thread.join();
                Err(TrayError::NotConnected)
            }
        }
    }

    pub fn set_status(&self, status: ItemStatus) {
        self.send(TrayEvent::SetStatus(status));
    }

    pub fn set_icon_name(&self, icon_name: &str) {
        self.send(TrayEvent::SetIcon(icon_name.to_string()));
    }

    fn send(&self, event: TrayEvent) {
        if let Err(e) = self.tx.try_send(event) {
            warn!("Tray thread not running: {e}");
        }
    }

    /// Tear the service down and join the thread.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        let _ = self.tx.try_send(TrayEvent::Shutdown);
        if thread.join().is_err() {
            error!("Tray thread panicked");
        }
    }
}

impl Drop for TrayHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_tray(mut service: StatusNotifierService<ZbusBus>, rx: &async_channel::Receiver<TrayEvent>) {
    info!("Tray service running as {}", service.bus_name());
    while let Ok(event) = rx.recv_blocking() {
        match event {
            TrayEvent::Name(event) => service.on_name_event(event),
            TrayEvent::SetStatus(status) => service.set_status(status),
            TrayEvent::SetIcon(icon_name) => service.set_icon_name(&icon_name),
            TrayEvent::Shutdown => break,
        }
    }
    service.teardown();
}
