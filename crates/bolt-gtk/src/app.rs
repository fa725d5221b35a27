//! Application shell: named actions, the action pump, and the lifetimes of
//! the tray, the shortcut listener and the config watcher.

use std::cell::{Cell, OnceCell, RefCell};
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::Context;
use bolt_core::config::{Config, ConfigWatcher, Directories, spawn_config_watcher};
use bolt_core::mode::ModeManager;
use bolt_core::shortcut::{EvdevKeySource, ShortcutListener};
use bolt_core::{ActionSender, AppAction, action_channel};
use bolt_tray::{ItemStatus, TrayHandle};
use gtk4::glib;
use gtk4::prelude::*;
use tracing::{debug, error, info, warn};

use crate::dialogs;
use crate::views::{self, LauncherHandle, ViewContext};
use crate::window::{LauncherWindow, SharedModes};

/// Connect the shell to the application's lifecycle signals.
pub fn install(app: &gtk4::Application) {
    let shell: Rc<OnceCell<Rc<Shell>>> = Rc::default();

    let startup_shell = shell.clone();
    app.connect_startup(move |app| {
        let _ = startup_shell.set(Shell::start(app));
    });

    let activate_shell = shell.clone();
    app.connect_activate(move |_| {
        if let Some(shell) = activate_shell.get() {
            shell.window.present();
        }
    });

    app.connect_shutdown(move |_| {
        if let Some(shell) = shell.get() {
            shell.shutdown();
        }
    });
}

struct Shell {
    app: gtk4::Application,
    window: Rc<LauncherWindow>,
    modes: SharedModes,
    launcher: LauncherHandle,
    ctx: ViewContext,
    directories: Option<Directories>,
    config: RefCell<Config>,
    listener: RefCell<Option<ShortcutListener>>,
    shortcut_status: Cell<ItemStatus>,
    tray: Rc<RefCell<Option<TrayHandle>>>,
    watcher: RefCell<Option<ConfigWatcher>>,
}

impl Shell {
    fn start(app: &gtk4::Application) -> Rc<Self> {
        let directories = Directories::new();
        let config = match &directories {
            Some(dirs) => Config::load_or_default(&dirs.config_file),
            None => {
                warn!("No home directory, running with default config");
                Config::default()
            }
        };

        let window = LauncherWindow::new(app);
        let ctx = ViewContext {
            window: window.weak_window(),
            ai: Rc::new(RefCell::new(config.ai.clone())),
        };

        let (loaders, launcher) = views::builtin_loaders(&ctx, &config);
        let modes: SharedModes = Rc::new(RefCell::new(ModeManager::new(
            loaders,
            &config.default_mode,
            dialogs::placeholder,
        )));
        let tray: Rc<RefCell<Option<TrayHandle>>> = Rc::default();
        let icon_tray = Rc::clone(&tray);
        window.attach(&modes, move |icon_name| {
            if let Some(tray) = icon_tray.borrow().as_ref() {
                tray.set_icon_name(icon_name);
            }
        });

        let shell = Rc::new(Self {
            app: app.clone(),
            window,
            modes,
            launcher,
            ctx,
            directories,
            config: RefCell::new(config),
            listener: RefCell::new(None),
            shortcut_status: Cell::new(ItemStatus::Active),
            tray,
            watcher: RefCell::new(None),
        });

        shell.register_actions();
        let (actions, receiver) = action_channel();
        shell.start_action_pump(receiver);
        shell.start_shortcut_listener(actions.clone());
        shell.start_tray(actions);
        shell.start_config_watcher();

        info!("Bolt started with {} mode(s)", shell.modes.borrow().len());
        shell
    }

    fn register_actions(self: &Rc<Self>) {
        for action in AppAction::ALL {
            let gio_action = gio::SimpleAction::new(action.name(), None);
            let shell = Rc::downgrade(self);
            gio_action.connect_activate(move |_, _| {
                if let Some(shell) = shell.upgrade() {
                    shell.perform(action);
                }
            });
            self.app.add_action(&gio_action);
        }

        self.app
            .set_accels_for_action(&AppAction::Quit.detailed_name(), &["<Control>q"]);
    }

    fn perform(&self, action: AppAction) {
        debug!("Performing {}", action.detailed_name());
        match action {
            AppAction::ToggleWindow => self.window.toggle(),
            AppAction::Preferences => {
                if let Err(e) = self.open_preferences() {
                    self.ctx
                        .show_error("Could not open preferences", &format!("{e:#}"));
                }
            }
            AppAction::About => dialogs::show_about(Some(self.window.window())),
            AppAction::Quit => {
                info!("Quit requested");
                self.app.quit();
            }
        }
    }

    /// Drain actions posted by the tray and the shortcut thread.
    fn start_action_pump(&self, receiver: async_channel::Receiver<AppAction>) {
        let app = self.app.clone();
        glib::spawn_future_local(async move {
            while let Ok(action) = receiver.recv().await {
                debug!("Received {} from a worker thread", action.name());
                app.activate_action(action.name(), None);
            }
            debug!("Action channel closed");
        });
    }

    fn start_shortcut_listener(&self, actions: ActionSender) {
        let accelerator = self.config.borrow().global_shortcut.clone();
        let mut listener = ShortcutListener::new(&accelerator, Arc::new(EvdevKeySource), actions);
        let started = listener.start();
        self.shortcut_status
            .set(shortcut_status(&accelerator, started, listener.is_running()));
        *self.listener.borrow_mut() = Some(listener);
    }

    fn start_tray(&self, actions: ActionSender) {
        let tray = match TrayHandle::spawn(actions) {
            Ok(tray) => tray,
            Err(e) => {
                warn!("Tray icon disabled: {e}");
                return;
            }
        };

        let modes = self.modes.borrow();
        if let Some(mode) = modes.active_mode_name().and_then(|name| modes.mode_by_name(name)) {
            tray.set_icon_name(mode.icon_name());
        }
        tray.set_status(self.shortcut_status.get());
        *self.tray.borrow_mut() = Some(tray);
    }

    fn sync_tray_status(&self) {
        if let Some(tray) = self.tray.borrow().as_ref() {
            tray.set_status(self.shortcut_status.get());
        }
    }

    fn start_config_watcher(self: &Rc<Self>) {
        let Some(config_file) = self.directories.as_ref().map(|d| d.config_file.clone()) else {
            return;
        };

        let (tx, rx) = async_channel::unbounded();
        match spawn_config_watcher(config_file, tx) {
            Ok(watcher) => *self.watcher.borrow_mut() = Some(watcher),
            Err(e) => {
                error!("Failed to start config watcher: {e}");
                return;
            }
        }

        let shell = Rc::downgrade(self);
        glib::spawn_future_local(async move {
            while rx.recv().await.is_ok() {
                let Some(shell) = shell.upgrade() else {
                    break;
                };
                shell.reload_config();
            }
        });
    }

    fn reload_config(&self) {
        let Some(dirs) = &self.directories else {
            return;
        };

        let new = Config::load_or_default(&dirs.config_file);
        let old = self.config.replace(new.clone());
        if old == new {
            debug!("Config unchanged after reload");
            return;
        }
        info!("Config reloaded");

        if old.global_shortcut != new.global_shortcut
            && let Some(listener) = self.listener.borrow_mut().as_mut()
        {
            let started = listener.reconfigure(&new.global_shortcut);
            self.shortcut_status.set(shortcut_status(
                &new.global_shortcut,
                started,
                listener.is_running(),
            ));
            self.sync_tray_status();
        }

        if old.launcher.max_results != new.launcher.max_results {
            self.launcher.set_max_results(new.launcher.max_results);
        }

        if old.ai != new.ai {
            *self.ctx.ai.borrow_mut() = new.ai;
        }
    }

    fn open_preferences(&self) -> anyhow::Result<()> {
        let dirs = self
            .directories
            .as_ref()
            .context("No config directory for this user")?;

        if !dirs.config_file.exists() {
            write_default_config(dirs)?;
        }

        let uri = gio::File::for_path(&dirs.config_file).uri();
        info!("Opening preferences at {uri}");
        gio::AppInfo::launch_default_for_uri(&uri, None::<&gio::AppLaunchContext>)
            .with_context(|| format!("No application can open {}", dirs.config_file.display()))
    }

    fn shutdown(&self) {
        info!("Shutting down");
        if let Some(mut listener) = self.listener.borrow_mut().take() {
            listener.stop();
        }
        if let Some(tray) = self.tray.borrow_mut().take() {
            tray.shutdown();
        }
        self.watcher.borrow_mut().take();
    }
}

/// Log how a listener start went and pick the tray status that reflects it.
/// A listener that started without error but is not running was disarmed by
/// an invalid accelerator.
fn shortcut_status(
    accelerator: &str,
    started: bolt_core::Result<()>,
    running: bool,
) -> ItemStatus {
    match started {
        Ok(()) if running => {
            info!("Global shortcut {accelerator} armed");
            ItemStatus::Active
        }
        Ok(()) => {
            warn!("Global shortcut '{accelerator}' is invalid, listener disarmed");
            ItemStatus::NeedsAttention
        }
        Err(e) => {
            warn!("Global shortcut disabled: {e}");
            ItemStatus::NeedsAttention
        }
    }
}

fn write_default_config(dirs: &Directories) -> anyhow::Result<()> {
    dirs.ensure_exists()
        .with_context(|| format!("Failed to create {}", dirs.config.display()))?;
    let json = serde_json::to_string_pretty(&Config::default())?;
    write_file(&dirs.config_file, &json)
}

fn write_file(path: &Path, content: &str) -> anyhow::Result<()> {
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote default config to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disarmed_listener_is_not_reported_armed() {
        assert_eq!(
            shortcut_status("<Control>", Ok(()), false),
            ItemStatus::NeedsAttention
        );
    }

    #[test]
    fn test_running_listener_is_active() {
        assert_eq!(shortcut_status("<Super>space", Ok(()), true), ItemStatus::Active);
    }

    #[test]
    fn test_start_failure_needs_attention() {
        let failed = Err(bolt_core::Error::Process("no input devices".into()));
        assert_eq!(
            shortcut_status("<Super>space", failed, false),
            ItemStatus::NeedsAttention
        );
    }
}
