//! GTK views for the built-in modes.
//!
//! Each mode owns its state model from `bolt_core::mode` and builds its
//! widget tree lazily on the first `view()` call.

mod chat;
mod clipboard;
mod launcher;
mod window_ops;

use std::cell::RefCell;
use std::rc::Rc;

use bolt_core::config::{AiConfig, Config};
use bolt_core::mode::{AI_CHAT_MODE, CLIPBOARD_MODE, LAUNCHER_MODE, Mode, ModeLoader, WINDOW_MODE};
use gtk4::Orientation;
use gtk4::glib;
use gtk4::prelude::*;

pub use launcher::LauncherHandle;

use crate::dialogs;

/// What the views need from the shell.
#[derive(Clone)]
pub struct ViewContext {
    pub window: glib::WeakRef<gtk4::ApplicationWindow>,
    pub ai: Rc<RefCell<AiConfig>>,
}

impl ViewContext {
    pub fn hide_window(&self) {
        if let Some(window) = self.window.upgrade() {
            window.set_visible(false);
        }
    }

    pub fn show_error(&self, title: &str, message: &str) {
        dialogs::show_error(self.window.upgrade().as_ref(), title, message);
    }
}

/// Loaders for the built-in modes in switcher order, plus a handle the shell
/// uses to push launcher settings on config reload.
pub fn builtin_loaders(
    ctx: &ViewContext,
    config: &Config,
) -> (Vec<ModeLoader<gtk4::Widget>>, LauncherHandle) {
    let launcher = launcher::LauncherMode::new(ctx.clone(), config.launcher.max_results);
    let handle = launcher.handle();

    let chat_ctx = ctx.clone();
    let clipboard_ctx = ctx.clone();
    let window_ctx = ctx.clone();

    let loaders = vec![
        ModeLoader::new(LAUNCHER_MODE, move || {
            Ok(Box::new(launcher) as Box<dyn Mode<gtk4::Widget>>)
        }),
        ModeLoader::new(AI_CHAT_MODE, move || {
            Ok(Box::new(chat::ChatMode::new(chat_ctx)) as Box<dyn Mode<gtk4::Widget>>)
        }),
        ModeLoader::new(CLIPBOARD_MODE, move || {
            let mode = clipboard::ClipboardMode::new(clipboard_ctx)?;
            Ok(Box::new(mode) as Box<dyn Mode<gtk4::Widget>>)
        }),
        ModeLoader::new(WINDOW_MODE, move || {
            Ok(Box::new(window_ops::WindowOpsMode::new(window_ctx)) as Box<dyn Mode<gtk4::Widget>>)
        }),
    ];

    (loaders, handle)
}

/// Search entry above a scrollable single-selection list.
struct SearchList {
    root: gtk4::Box,
    entry: gtk4::SearchEntry,
    list: gtk4::ListBox,
}

impl SearchList {
    fn new(placeholder_text: &str, css_class: &str) -> Self {
        let root = gtk4::Box::builder()
            .orientation(Orientation::Vertical)
            .spacing(8)
            .css_classes([css_class])
            .build();

        let entry = gtk4::SearchEntry::builder()
            .placeholder_text(placeholder_text)
            .hexpand(true)
            .build();

        let list = gtk4::ListBox::builder()
            .selection_mode(gtk4::SelectionMode::Single)
            .activate_on_single_click(true)
            .css_classes(["result-list"])
            .build();

        let scrolled = gtk4::ScrolledWindow::builder()
            .hscrollbar_policy(gtk4::PolicyType::Never)
            .vexpand(true)
            .child(&list)
            .build();

        root.append(&entry);
        root.append(&scrolled);

        Self { root, entry, list }
    }

    fn widget(&self) -> gtk4::Widget {
        self.root.clone().upcast()
    }

    /// Replace the rows with one labelled row per item.
    fn set_rows<'a>(&self, rows: impl IntoIterator<Item = (Option<&'a str>, &'a str)>) {
        self.list.remove_all();
        for (icon_name, label) in rows {
            self.list.append(&row_content(icon_name, label));
        }
    }

    fn select_index(&self, index: Option<usize>) {
        let row = index
            .and_then(|i| i32::try_from(i).ok())
            .and_then(|i| self.list.row_at_index(i));
        match row {
            Some(row) => self.list.select_row(Some(&row)),
            None => self.list.unselect_all(),
        }
    }
}

fn row_content(icon_name: Option<&str>, label: &str) -> gtk4::Box {
    let row = gtk4::Box::builder()
        .orientation(Orientation::Horizontal)
        .spacing(10)
        .margin_top(4)
        .margin_bottom(4)
        .margin_start(6)
        .margin_end(6)
        .build();

    if let Some(icon_name) = icon_name {
        row.append(&icon_image(icon_name));
    }

    row.append(
        &gtk4::Label::builder()
            .label(label)
            .xalign(0.0)
            .ellipsize(gtk4::pango::EllipsizeMode::End)
            .hexpand(true)
            .build(),
    );
    row
}

/// Image for a themed icon name or any serialized `GIcon` (file paths included).
fn icon_image(icon: &str) -> gtk4::Image {
    let image = match gio::Icon::for_string(icon) {
        Ok(gicon) => gtk4::Image::from_gicon(&gicon),
        Err(_) => gtk4::Image::from_icon_name(icon),
    };
    image.set_pixel_size(24);
    image
}

/// Index of an activated row, as a `usize`.
fn row_index(row: &gtk4::ListBoxRow) -> Option<usize> {
    usize::try_from(row.index()).ok()
}
