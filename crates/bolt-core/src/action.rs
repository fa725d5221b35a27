//! Named application actions and the queue that carries them to the UI thread.
//!
//! The tray service and the shortcut listener run off the UI thread. They never
//! touch UI state directly; they post an [`AppAction`] and the shell activates
//! the matching GTK action when it drains the queue.

use tracing::{debug, warn};

/// Actions exposed by the application shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppAction {
    ToggleWindow,
    Preferences,
    About,
    Quit,
}

impl AppAction {
    pub const ALL: [AppAction; 4] = [
        AppAction::ToggleWindow,
        AppAction::Preferences,
        AppAction::About,
        AppAction::Quit,
    ];

    /// Action name as registered on the application (`toggle_window`, ...).
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            AppAction::ToggleWindow => "toggle_window",
            AppAction::Preferences => "preferences",
            AppAction::About => "about",
            AppAction::Quit => "quit",
        }
    }

    /// Detailed name with the `app.` scope, as menus reference it.
    #[must_use]
    pub fn detailed_name(self) -> String {
        format!("app.{}", self.name())
    }
}

/// Cloneable, non-blocking handle for posting actions onto the UI queue.
#[derive(Debug, Clone)]
pub struct ActionSender {
    tx: async_channel::Sender<AppAction>,
}

impl ActionSender {
    /// Queue `action` for the UI thread. Never blocks.
    pub fn post(&self, action: AppAction) {
        debug!("Posting action {}", action.name());
        if let Err(e) = self.tx.try_send(action) {
            warn!("Dropped action {}: {e}", action.name());
        }
    }
}

/// Create the UI action queue. The receiver belongs to the UI thread.
#[must_use]
pub fn action_channel() -> (ActionSender, async_channel::Receiver<AppAction>) {
    let (tx, rx) = async_channel::unbounded();
    (ActionSender { tx }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_names() {
        assert_eq!(AppAction::ToggleWindow.name(), "toggle_window");
        assert_eq!(AppAction::Preferences.name(), "preferences");
        assert_eq!(AppAction::About.name(), "about");
        assert_eq!(AppAction::Quit.name(), "quit");
    }

    #[test]
    fn test_detailed_name_has_app_scope() {
        assert_eq!(AppAction::Quit.detailed_name(), "app.quit");
    }

    #[test]
    fn test_post_is_received_in_order() {
        let (sender, rx) = action_channel();
        sender.post(AppAction::About);
        sender.clone().post(AppAction::Quit);

        assert_eq!(rx.try_recv().unwrap(), AppAction::About);
        assert_eq!(rx.try_recv().unwrap(), AppAction::Quit);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_post_after_receiver_dropped_does_not_panic() {
        let (sender, rx) = action_channel();
        drop(rx);
        sender.post(AppAction::ToggleWindow);
    }
}
