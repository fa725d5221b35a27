use std::cell::{OnceCell, RefCell};
use std::rc::{Rc, Weak};

use bolt_core::mode::{AppEntry, LAUNCHER_MODE, LauncherState, Mode, clean_exec};
use gtk4::gdk;
use gtk4::glib;
use gtk4::prelude::*;
use tracing::{debug, info};

use super::{SearchList, ViewContext, row_index};

struct Launcher {
    ctx: ViewContext,
    state: RefCell<LauncherState>,
    view: OnceCell<SearchList>,
}

pub struct LauncherMode {
    inner: Rc<Launcher>,
}

/// Lets the shell adjust a launcher it no longer owns.
#[derive(Clone)]
pub struct LauncherHandle(Weak<Launcher>);

impl LauncherHandle {
    pub fn set_max_results(&self, max_results: usize) {
        if let Some(launcher) = self.0.upgrade() {
            launcher.state.borrow_mut().set_max_results(max_results);
            launcher.refresh();
        }
    }
}

impl LauncherMode {
    pub fn new(ctx: ViewContext, max_results: usize) -> Self {
        Self {
            inner: Rc::new(Launcher {
                ctx,
                state: RefCell::new(LauncherState::new(max_results)),
                view: OnceCell::new(),
            }),
        }
    }

    pub fn handle(&self) -> LauncherHandle {
        LauncherHandle(Rc::downgrade(&self.inner))
    }
}

impl Mode<gtk4::Widget> for LauncherMode {
    fn name(&self) -> &str {
        LAUNCHER_MODE
    }

    fn icon_name(&self) -> &str {
        "system-run-symbolic"
    }

    fn view(&mut self) -> Option<gtk4::Widget> {
        if self.inner.view.get().is_none() {
            let _ = self.inner.view.set(build_view(&self.inner));
            self.inner.refresh();
        }
        self.inner.view.get().map(SearchList::widget)
    }

    fn activate(&mut self) {
        let entries = installed_apps();
        info!("Indexed {} applications", entries.len());
        self.inner.state.borrow_mut().set_entries(entries);
        self.inner.refresh();

        if let Some(view) = self.inner.view.get() {
            view.entry.grab_focus();
        }
    }

    fn handle_cancel_key(&mut self) -> bool {
        let cleared = self.inner.state.borrow_mut().clear_query();
        if cleared && let Some(view) = self.inner.view.get() {
            view.entry.set_text("");
            self.inner.refresh();
        }
        cleared
    }
}

impl Launcher {
    fn refresh(&self) {
        let Some(view) = self.view.get() else {
            return;
        };

        let (rows, selected): (Vec<(Option<String>, String)>, Option<usize>) = {
            let state = self.state.borrow();
            let rows = state
                .visible()
                .into_iter()
                .map(|entry| (entry.icon.clone(), entry.name.clone()))
                .collect();
            (rows, state.selected())
        };

        view.set_rows(
            rows.iter()
                .map(|(icon, name)| (icon.as_deref(), name.as_str())),
        );
        view.select_index(selected);
    }

    fn launch_selected(&self) {
        let target = self.state.borrow().activation_target().cloned();
        let Some(entry) = target else {
            debug!("Nothing to launch");
            return;
        };

        match launch(&entry) {
            Ok(()) => {
                self.state.borrow_mut().clear_query();
                if let Some(view) = self.view.get() {
                    view.entry.set_text("");
                }
                self.refresh();
                self.ctx.hide_window();
            }
            Err(message) => self
                .ctx
                .show_error(&format!("Could not launch {}", entry.name), &message),
        }
    }

    fn move_selection(&self, down: bool) {
        let selected = {
            let mut state = self.state.borrow_mut();
            if down {
                state.select_next()
            } else {
                state.select_previous()
            }
        };
        if let Some(view) = self.view.get() {
            view.select_index(selected);
        }
    }
}

fn build_view(launcher: &Rc<Launcher>) -> SearchList {
    let view = SearchList::new("Search applications", "launcher-view");

    let weak = Rc::downgrade(launcher);
    view.entry.connect_search_changed(move |entry| {
        let Some(launcher) = weak.upgrade() else {
            return;
        };
        let query = entry.text();
        if launcher.state.borrow().query() == query.as_str() {
            return;
        }
        launcher.state.borrow_mut().set_query(&query);
        launcher.refresh();
    });

    let weak = Rc::downgrade(launcher);
    view.entry.connect_activate(move |_| {
        if let Some(launcher) = weak.upgrade() {
            launcher.launch_selected();
        }
    });

    let key_controller = gtk4::EventControllerKey::new();
    let weak = Rc::downgrade(launcher);
    key_controller.connect_key_pressed(move |_, keyval, _keycode, _modifier| {
        let Some(launcher) = weak.upgrade() else {
            return glib::Propagation::Proceed;
        };
        match keyval {
            gdk::Key::Down => {
                launcher.move_selection(true);
                glib::Propagation::Stop
            }
            gdk::Key::Up => {
                launcher.move_selection(false);
                glib::Propagation::Stop
            }
            _ => glib::Propagation::Proceed,
        }
    });
    view.entry.add_controller(key_controller);

    let weak = Rc::downgrade(launcher);
    view.list.connect_row_activated(move |_, row| {
        if let Some(launcher) = weak.upgrade() {
            launcher.state.borrow_mut().select(row_index(row));
            launcher.launch_selected();
        }
    });

    view
}

fn installed_apps() -> Vec<AppEntry> {
    gio::AppInfo::all()
        .into_iter()
        .filter(|app| app.should_show())
        .filter_map(|app| {
            let id = app.id()?.to_string();
            Some(AppEntry {
                id,
                name: app.display_name().to_string(),
                icon: app
                    .icon()
                    .and_then(|icon| IconExt::to_string(&icon))
                    .map(|icon| icon.to_string()),
                command: app
                    .commandline()
                    .map(|command| clean_exec(&command.to_string_lossy())),
            })
        })
        .collect()
}

fn launch(entry: &AppEntry) -> Result<(), String> {
    let Some(app) = gio::DesktopAppInfo::new(&entry.id) else {
        return Err(format!("Desktop entry '{}' no longer exists", entry.id));
    };

    info!(
        "Launching {} ({})",
        entry.name,
        entry.command.as_deref().unwrap_or(&entry.id)
    );
    app.launch(&[], None::<&gio::AppLaunchContext>)
        .map_err(|e| e.to_string())
}
