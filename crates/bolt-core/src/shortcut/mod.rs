//! Global shortcut handling: accelerator parsing, exact-set matching and the
//! background listener thread.

mod accel;
mod evdev_source;
mod listener;
mod matcher;

pub use accel::{KeyToken, ShortcutSpec};
pub use evdev_source::EvdevKeySource;
pub use listener::{KeySource, ShortcutListener};
pub use matcher::{KeyEvent, ShortcutMatcher};
