use std::sync::Arc;
use std::thread::JoinHandle;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::accel::ShortcutSpec;
use super::matcher::{KeyEvent, ShortcutMatcher};
use crate::Result;
use crate::action::{ActionSender, AppAction};

/// OS-level source of raw key events.
pub trait KeySource: Send + Sync + 'static {
    /// Deliver key events to `on_event` until `cancel` fires.
    ///
    /// Must release every OS resource it acquired before returning.
    ///
    /// # Errors
    ///
    /// Returns an error if the hook cannot be installed or dies.
    fn listen(&self, cancel: &CancellationToken, on_event: &mut dyn FnMut(KeyEvent)) -> Result<()>;
}

struct Worker {
    cancel: CancellationToken,
    thread: JoinHandle<()>,
}

/// Background global-shortcut listener that posts `toggle_window` on match.
pub struct ShortcutListener {
    target: ShortcutSpec,
    source: Arc<dyn KeySource>,
    actions: ActionSender,
    worker: Option<Worker>,
}

impl ShortcutListener {
    /// Create a stopped listener for `accelerator`. An invalid accelerator
    /// leaves the listener disarmed.
    pub fn new(accelerator: &str, source: Arc<dyn KeySource>, actions: ActionSender) -> Self {
        Self {
            target: ShortcutSpec::parse_or_disarm(accelerator),
            source,
            actions,
            worker: None,
        }
    }

    #[must_use]
    pub fn target(&self) -> &ShortcutSpec {
        &self.target
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.thread.is_finished())
    }

    /// Start the listener thread. No-op if one is already running or the
    /// listener is disarmed.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn start(&mut self) -> Result<()> {
        if self.is_running() {
            debug!("Shortcut listener already running");
            return Ok(());
        }
        // A worker whose source failed has already exited; reap it.
        self.stop();

        if self.target.is_empty() {
            warn!("Shortcut listener disarmed, not starting");
            return Ok(());
        }

        let cancel = CancellationToken::new();
        let thread = {
            let cancel = cancel.clone();
            let source = Arc::clone(&self.source);
            let actions = self.actions.clone();
            let target = self.target.clone();
            std::thread::Builder::new()
                .name("shortcut-listener".to_string())
                .spawn(move || run_listener(target, source.as_ref(), &cancel, &actions))?
        };

        info!("Shortcut listener started for {}", self.target);
        self.worker = Some(Worker { cancel, thread });
        Ok(())
    }

    /// Stop the listener thread and wait for it to release the OS hook.
    /// Safe to call when never started.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        worker.cancel.cancel();
        if worker.thread.join().is_err() {
            error!("Shortcut listener thread panicked");
        }
        debug!("Shortcut listener stopped");
    }

    /// Apply a changed accelerator setting.
    ///
    /// A parse failure stops and disarms the listener. A valid accelerator
    /// restarts it so the held-key state starts empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the restarted thread cannot be spawned.
    pub fn reconfigure(&mut self, accelerator: &str) -> Result<()> {
        match ShortcutSpec::parse(accelerator) {
            Ok(spec) => {
                info!("Global shortcut changed to '{accelerator}'");
                self.stop();
                self.target = spec;
                self.start()
            }
            Err(e) => {
                warn!("Invalid shortcut '{accelerator}': {e}, disarming listener");
                self.stop();
                self.target = ShortcutSpec::default();
                Ok(())
            }
        }
    }
}

impl Drop for ShortcutListener {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_listener(
    target: ShortcutSpec,
    source: &dyn KeySource,
    cancel: &CancellationToken,
    actions: &ActionSender,
) {
    let mut matcher = ShortcutMatcher::new(target);
    let result = source.listen(cancel, &mut |event| {
        if matcher.handle(event) {
            info!("Global shortcut {} pressed", matcher.target());
            actions.post(AppAction::ToggleWindow);
        }
    });

    if let Err(e) = result {
        error!("Shortcut listener failed: {e}");
    }
}
