mod dirs;
mod settings;
mod validation;
mod watcher;

pub use dirs::Directories;
pub use settings::{AiConfig, Config, LauncherConfig};
pub use validation::{unknown_fields, warn_unknown_fields};
pub use watcher::{ConfigWatcher, spawn_config_watcher};
