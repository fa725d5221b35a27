//! Modes are the switchable features of the launcher window.
//!
//! The contract is generic over the view handle type `V` so the state machine
//! can be driven without a toolkit. The GTK shell uses `gtk4::Widget`.

mod chat;
mod clipboard;
mod launcher;
mod manager;
mod window_ops;

pub use chat::{ChatMessage, ChatProvider, ChatRequest, ChatRole, ChatSession, resolve_provider};
pub use clipboard::{ClipboardHistory, HISTORY_LIMIT};
pub use launcher::{AppEntry, LauncherState, clean_exec};
pub use manager::{ModeChange, ModeInfo, ModeLoader, ModeManager};
pub use window_ops::WindowAction;

use tracing::debug;

pub const LAUNCHER_MODE: &str = "Launcher";
pub const AI_CHAT_MODE: &str = "AI Chat";
pub const CLIPBOARD_MODE: &str = "Clipboard History";
pub const WINDOW_MODE: &str = "Window Management";

/// Capability set every mode provides to the host window.
pub trait Mode<V> {
    /// Unique display name, also the registry key.
    fn name(&self) -> &str;

    fn icon_name(&self) -> &str;

    /// The mode's view, built on first request and reused afterwards.
    fn view(&mut self) -> Option<V>;

    fn activate(&mut self) {}

    fn deactivate(&mut self) {}

    /// Intercept the cancel (Escape) gesture. Returning `false` lets the host
    /// apply its default behavior, which is hiding the window.
    fn handle_cancel_key(&mut self) -> bool {
        false
    }
}

/// Named view container the host window shows one child of at a time.
pub trait ViewStack<V> {
    fn child_by_name(&self, name: &str) -> Option<V>;
    fn add_named(&self, view: &V, name: &str);
    fn remove(&self, view: &V);
    fn set_visible_child_name(&self, name: &str);
}

/// What [`present_mode_view`] had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    Attached,
    Replaced,
    Reshown,
}

/// React to a mode change: attach the view if the stack lacks one for `name`,
/// replace a different view registered under `name`, or just show it again.
pub fn present_mode_view<V, S>(stack: &S, name: &str, view: &V) -> Presentation
where
    V: PartialEq,
    S: ViewStack<V> + ?Sized,
{
    let presentation = match stack.child_by_name(name) {
        None => {
            stack.add_named(view, name);
            Presentation::Attached
        }
        Some(existing) if existing != *view => {
            stack.remove(&existing);
            stack.add_named(view, name);
            Presentation::Replaced
        }
        Some(_) => Presentation::Reshown,
    };

    stack.set_visible_child_name(name);
    debug!("Showing view for mode '{name}' ({presentation:?})");
    presentation
}
