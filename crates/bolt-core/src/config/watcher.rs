//! Configuration file watcher for live reload.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use notify::Watcher;
use tracing::{debug, error, info};

use crate::{Error, Result};

const RELOAD_SETTLE_DELAY: Duration = Duration::from_millis(100);
const CONFIG_DEBOUNCE_DURATION: Duration = Duration::from_millis(500);

pub struct ConfigWatcher {
    _watcher_thread: std::thread::JoinHandle<()>,
}

/// Watch `config_path` and send `()` on `tx` after each settled change.
///
/// The watcher thread exits once the receiving side of `tx` is dropped.
///
/// # Errors
///
/// Returns an error if the watcher thread cannot be spawned.
pub fn spawn_config_watcher(
    config_path: PathBuf,
    tx: async_channel::Sender<()>,
) -> Result<ConfigWatcher> {
    let watcher_thread = std::thread::Builder::new()
        .name("config-watcher".to_string())
        .spawn(move || {
            if let Err(e) = watch_config_file(&config_path, &tx) {
                error!("Config watcher error: {e}");
            }
        })?;

    Ok(ConfigWatcher {
        _watcher_thread: watcher_thread,
    })
}

fn watch_config_file(config_path: &Path, tx: &async_channel::Sender<()>) -> Result<()> {
    let debounce = Arc::new(Mutex::new(
        Instant::now().checked_sub(CONFIG_DEBOUNCE_DURATION).unwrap_or_else(Instant::now),
    ));
    let file_name = config_path.file_name().map(ToOwned::to_owned);
    let (watcher_tx, watcher_rx) = mpsc::channel();

    let mut watcher =
        notify::recommended_watcher(move |result: notify::Result<notify::Event>| match result {
            Ok(event) => {
                if !matches!(
                    event.kind,
                    notify::EventKind::Modify(_) | notify::EventKind::Create(_)
                ) {
                    return;
                }
                if !event.paths.iter().any(|p| p.file_name() == file_name.as_deref()) {
                    return;
                }
                let Ok(mut last_event) = debounce.lock() else {
                    error!("Config watcher debounce mutex poisoned, skipping event");
                    return;
                };
                let now = Instant::now();
                if now.duration_since(*last_event) > CONFIG_DEBOUNCE_DURATION {
                    *last_event = now;
                    let _ = watcher_tx.send(());
                }
            }
            Err(e) => error!("Watcher error: {e}"),
        })?;

    let parent = config_path
        .parent()
        .ok_or_else(|| Error::Config(format!("Invalid config path {}", config_path.display())))?;
    std::fs::create_dir_all(parent)?;
    watcher.watch(parent, notify::RecursiveMode::NonRecursive)?;
    info!("Watching config directory: {}", parent.display());

    while watcher_rx.recv().is_ok() {
        std::thread::sleep(RELOAD_SETTLE_DELAY);
        debug!("Config file changed, sending reload notification");
        if tx.send_blocking(()).is_err() {
            debug!("Config reload receiver dropped, stopping watcher");
            break;
        }
    }

    Ok(())
}
