use std::io::ErrorKind;
use std::process::Command;

use tracing::{debug, info, warn};

use crate::{Error, Result};

const WMCTRL: &str = "wmctrl";

/// Window-manager operations applied to the active window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowAction {
    Maximize,
    Unmaximize,
}

impl WindowAction {
    pub const ALL: [WindowAction; 2] = [WindowAction::Maximize, WindowAction::Unmaximize];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            WindowAction::Maximize => "Maximize",
            WindowAction::Unmaximize => "Unmaximize",
        }
    }

    /// `wmctrl` arguments for this action.
    #[must_use]
    pub fn wmctrl_args(self) -> [&'static str; 4] {
        let property = match self {
            WindowAction::Maximize => "add,maximized_vert,maximized_horz",
            WindowAction::Unmaximize => "remove,maximized_vert,maximized_horz",
        };
        ["-r", ":ACTIVE:", "-b", property]
    }

    /// Actions whose label contains `query`, case-insensitively.
    #[must_use]
    pub fn filter(query: &str) -> Vec<WindowAction> {
        let needle = query.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .filter(|action| action.label().to_lowercase().contains(&needle))
            .collect()
    }

    /// Run the action without waiting for it; the child is reaped on a
    /// background thread.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Process`] if `wmctrl` is missing or cannot be spawned.
    pub fn execute(self) -> Result<()> {
        let args = self.wmctrl_args();
        info!("Executing command: {WMCTRL} {}", args.join(" "));

        let mut child = Command::new(WMCTRL).args(args).spawn().map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                Error::Process(format!(
                    "'{WMCTRL}' command not found. It is required for window management; \
                     install it (e.g. 'sudo apt install wmctrl')."
                ))
            } else {
                Error::Process(format!("Failed to run {WMCTRL}: {e}"))
            }
        })?;

        std::thread::spawn(move || match child.wait() {
            Ok(status) if status.success() => debug!("{WMCTRL} finished"),
            Ok(status) => warn!("{WMCTRL} exited with {status}"),
            Err(e) => warn!("Failed to wait for {WMCTRL}: {e}"),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wmctrl_args() {
        assert_eq!(
            WindowAction::Maximize.wmctrl_args(),
            ["-r", ":ACTIVE:", "-b", "add,maximized_vert,maximized_horz"]
        );
        assert_eq!(
            WindowAction::Unmaximize.wmctrl_args(),
            ["-r", ":ACTIVE:", "-b", "remove,maximized_vert,maximized_horz"]
        );
    }

    #[test]
    fn test_filter() {
        assert_eq!(WindowAction::filter(""), WindowAction::ALL.to_vec());
        assert_eq!(WindowAction::filter("UNMAX"), vec![WindowAction::Unmaximize]);
        assert_eq!(WindowAction::filter("max").len(), 2);
        assert!(WindowAction::filter("tile").is_empty());
    }
}
