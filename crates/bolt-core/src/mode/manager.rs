use tracing::{debug, error, info, warn};

use super::Mode;
use crate::Result;

type ModeChangedCallback<V> = Box<dyn Fn(&ModeChange<V>)>;
type ModesUpdatedCallback = Box<dyn Fn(&[ModeInfo])>;

/// Named, fallible constructor for one mode.
pub struct ModeLoader<V> {
    name: String,
    load: Box<dyn FnOnce() -> Result<Box<dyn Mode<V>>>>,
}

impl<V> ModeLoader<V> {
    pub fn new<F>(name: impl Into<String>, load: F) -> Self
    where
        F: FnOnce() -> Result<Box<dyn Mode<V>>> + 'static,
    {
        Self {
            name: name.into(),
            load: Box::new(load),
        }
    }
}

/// Broadcast after every successful transition.
#[derive(Debug, Clone)]
pub struct ModeChange<V> {
    pub mode_name: String,
    pub icon_name: String,
    pub view: V,
    /// The mode produced no view and `view` is a diagnostic stand-in.
    pub is_placeholder: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeInfo {
    pub name: String,
    pub icon_name: String,
}

/// Registry of loaded modes plus the active-mode state machine.
///
/// Lives on the UI thread; the active index is only ever written there.
pub struct ModeManager<V> {
    modes: Vec<Box<dyn Mode<V>>>,
    active: Option<usize>,
    placeholder: Box<dyn Fn(&str) -> V>,
    on_mode_changed: Option<ModeChangedCallback<V>>,
    on_modes_updated: Option<ModesUpdatedCallback>,
}

impl<V: Clone> ModeManager<V> {
    /// Load every mode, then activate `preferred_default` (or the first loaded
    /// mode when it is missing).
    ///
    /// A loader that fails is logged and skipped. `placeholder` builds the
    /// stand-in view broadcast for a mode that has no view of its own.
    pub fn new<P>(loaders: Vec<ModeLoader<V>>, preferred_default: &str, placeholder: P) -> Self
    where
        P: Fn(&str) -> V + 'static,
    {
        let mut manager = Self {
            modes: Vec::with_capacity(loaders.len()),
            active: None,
            placeholder: Box::new(placeholder),
            on_mode_changed: None,
            on_modes_updated: None,
        };

        for loader in loaders {
            manager.load(loader);
        }
        info!("Loaded {} mode(s)", manager.modes.len());

        manager.select_initial(preferred_default);
        manager
    }

    fn load(&mut self, loader: ModeLoader<V>) {
        let mode = match (loader.load)() {
            Ok(mode) => mode,
            Err(e) => {
                error!("Failed to load mode '{}': {e}", loader.name);
                return;
            }
        };

        if self.position(mode.name()).is_some() {
            warn!("Duplicate mode '{}' ignored", mode.name());
            return;
        }
        debug!("Loaded mode '{}'", mode.name());
        self.modes.push(mode);
    }

    fn select_initial(&mut self, preferred_default: &str) {
        let initial = if self.position(preferred_default).is_some() {
            preferred_default.to_string()
        } else if let Some(first) = self.modes.first() {
            warn!(
                "Default mode '{preferred_default}' not available, falling back to '{}'",
                first.name()
            );
            first.name().to_string()
        } else {
            error!("No modes loaded, launcher has nothing to show");
            return;
        };

        self.set_active_mode(&initial, true);
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.modes.iter().position(|mode| mode.name() == name)
    }

    /// Switch to `name`.
    ///
    /// Returns `false` for an unknown mode (active mode unchanged). Switching
    /// to the active mode is a silent no-op unless `force_emit` is set, in
    /// which case it is deactivated, re-activated and re-broadcast.
    pub fn set_active_mode(&mut self, name: &str, force_emit: bool) -> bool {
        let Some(index) = self.position(name) else {
            warn!("Cannot activate unknown mode '{name}'");
            return false;
        };

        if self.active == Some(index) && !force_emit {
            debug!("Mode '{name}' already active");
            return true;
        }

        if let Some(previous) = self.active.and_then(|i| self.modes.get_mut(i)) {
            debug!("Deactivating mode '{}'", previous.name());
            previous.deactivate();
        }

        self.active = Some(index);
        let Some(mode) = self.modes.get_mut(index) else {
            return false;
        };
        mode.activate();
        info!("Active mode: '{name}'");

        let icon_name = mode.icon_name().to_string();
        let change = match mode.view() {
            Some(view) => ModeChange {
                mode_name: name.to_string(),
                icon_name,
                view,
                is_placeholder: false,
            },
            None => {
                let message = format!("Error: Mode '{name}' has no view.");
                warn!("{message}");
                ModeChange {
                    mode_name: name.to_string(),
                    icon_name,
                    view: (self.placeholder)(&message),
                    is_placeholder: true,
                }
            }
        };

        if let Some(callback) = &self.on_mode_changed {
            callback(&change);
        }
        true
    }

    /// Register the single mode-changed observer (the host window).
    pub fn connect_mode_changed<F: Fn(&ModeChange<V>) + 'static>(&mut self, callback: F) {
        self.on_mode_changed = Some(Box::new(callback));
    }

    /// Register the mode-list observer. It is called immediately with the
    /// modes loaded so far.
    pub fn connect_modes_updated<F: Fn(&[ModeInfo]) + 'static>(&mut self, callback: F) {
        callback(&self.available_modes());
        self.on_modes_updated = Some(Box::new(callback));
    }

    /// Add a mode after construction and notify the mode-list observer.
    pub fn register(&mut self, loader: ModeLoader<V>) {
        self.load(loader);
        if let Some(callback) = &self.on_modes_updated {
            callback(&self.available_modes());
        }
    }

    #[must_use]
    pub fn active_mode_name(&self) -> Option<&str> {
        self.active
            .and_then(|i| self.modes.get(i))
            .map(|mode| mode.name())
    }

    /// View of the active mode, for the initial paint of the host window.
    pub fn active_view(&mut self) -> Option<V> {
        let index = self.active?;
        self.modes.get_mut(index)?.view()
    }

    /// Forward the cancel gesture to the active mode.
    pub fn handle_cancel_key(&mut self) -> bool {
        self.active
            .and_then(|i| self.modes.get_mut(i))
            .is_some_and(|mode| mode.handle_cancel_key())
    }

    /// Name and icon of every loaded mode, in registration order.
    #[must_use]
    pub fn available_modes(&self) -> Vec<ModeInfo> {
        self.modes
            .iter()
            .map(|mode| ModeInfo {
                name: mode.name().to_string(),
                icon_name: mode.icon_name().to_string(),
            })
            .collect()
    }

    #[must_use]
    pub fn mode_by_name(&self, name: &str) -> Option<&dyn Mode<V>> {
        self.position(name)
            .and_then(|i| self.modes.get(i))
            .map(|mode| &**mode)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.modes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }
}
