//! Host window: mode switcher row above a stack holding one view per mode.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use bolt_core::mode::{ModeInfo, ModeManager, ViewStack, present_mode_view};
use gtk4::Orientation;
use gtk4::gdk;
use gtk4::glib;
use gtk4::prelude::*;
use tracing::debug;

const WINDOW_WIDTH: i32 = 640;
const WINDOW_HEIGHT: i32 = 480;

pub type SharedModes = Rc<RefCell<ModeManager<gtk4::Widget>>>;

/// `gtk4::Stack` seen through the mode presentation contract.
struct ModeStack<'a>(&'a gtk4::Stack);

impl ViewStack<gtk4::Widget> for ModeStack<'_> {
    fn child_by_name(&self, name: &str) -> Option<gtk4::Widget> {
        self.0.child_by_name(name)
    }

    fn add_named(&self, view: &gtk4::Widget, name: &str) {
        self.0.add_named(view, Some(name));
    }

    fn remove(&self, view: &gtk4::Widget) {
        self.0.remove(view);
    }

    fn set_visible_child_name(&self, name: &str) {
        self.0.set_visible_child_name(name);
    }
}

pub struct LauncherWindow {
    window: gtk4::ApplicationWindow,
    switcher: gtk4::Box,
    stack: gtk4::Stack,
}

impl LauncherWindow {
    pub fn new(app: &gtk4::Application) -> Rc<Self> {
        let window = gtk4::ApplicationWindow::builder()
            .application(app)
            .title("Bolt")
            .default_width(WINDOW_WIDTH)
            .default_height(WINDOW_HEIGHT)
            .hide_on_close(true)
            .build();

        let switcher = gtk4::Box::builder()
            .orientation(Orientation::Horizontal)
            .spacing(4)
            .halign(gtk4::Align::Center)
            .css_classes(["mode-switcher"])
            .build();

        let stack = gtk4::Stack::builder()
            .vexpand(true)
            .hexpand(true)
            .transition_type(gtk4::StackTransitionType::Crossfade)
            .build();

        let content = gtk4::Box::builder()
            .orientation(Orientation::Vertical)
            .spacing(8)
            .margin_top(8)
            .margin_bottom(8)
            .margin_start(8)
            .margin_end(8)
            .build();
        content.append(&switcher);
        content.append(&stack);
        window.set_child(Some(&content));

        Rc::new(Self {
            window,
            switcher,
            stack,
        })
    }

    pub fn window(&self) -> &gtk4::ApplicationWindow {
        &self.window
    }

    pub fn weak_window(&self) -> glib::WeakRef<gtk4::ApplicationWindow> {
        self.window.downgrade()
    }

    /// Wire the window to the mode manager and paint the active mode.
    ///
    /// `on_mode_shown` receives the icon name of each mode switched to.
    pub fn attach<F>(&self, modes: &SharedModes, on_mode_shown: F)
    where
        F: Fn(&str) + 'static,
    {
        let weak_modes = Rc::downgrade(modes);

        let switcher = self.switcher.clone();
        let button_modes = weak_modes.clone();
        modes
            .borrow_mut()
            .connect_modes_updated(move |infos| rebuild_switcher(&switcher, infos, &button_modes));

        let stack = self.stack.clone();
        modes.borrow_mut().connect_mode_changed(move |change| {
            present_mode_view(&ModeStack(&stack), &change.mode_name, &change.view);
            on_mode_shown(&change.icon_name);
        });

        let initial = {
            let mut modes = modes.borrow_mut();
            let name = modes.active_mode_name().map(str::to_string);
            name.zip(modes.active_view())
        };
        if let Some((name, view)) = initial {
            present_mode_view(&ModeStack(&self.stack), &name, &view);
        }

        self.setup_key_handler(weak_modes);
    }

    fn setup_key_handler(&self, modes: Weak<RefCell<ModeManager<gtk4::Widget>>>) {
        let key_controller = gtk4::EventControllerKey::new();
        key_controller.set_propagation_phase(gtk4::PropagationPhase::Capture);

        let window = self.window.downgrade();
        key_controller.connect_key_pressed(move |_, keyval, _keycode, _modifier| {
            if keyval != gdk::Key::Escape {
                return glib::Propagation::Proceed;
            }

            let consumed = modes
                .upgrade()
                .is_some_and(|modes| modes.borrow_mut().handle_cancel_key());
            if !consumed && let Some(window) = window.upgrade() {
                window.set_visible(false);
            }
            glib::Propagation::Stop
        });

        self.window.add_controller(key_controller);
    }

    pub fn present(&self) {
        self.window.present();
    }

    pub fn hide(&self) {
        self.window.set_visible(false);
    }

    pub fn toggle(&self) {
        if self.window.is_visible() {
            debug!("Hiding launcher window");
            self.hide();
        } else {
            debug!("Presenting launcher window");
            self.present();
        }
    }
}

fn rebuild_switcher(
    switcher: &gtk4::Box,
    infos: &[ModeInfo],
    modes: &Weak<RefCell<ModeManager<gtk4::Widget>>>,
) {
    while let Some(child) = switcher.first_child() {
        switcher.remove(&child);
    }

    for info in infos {
        let content = gtk4::Box::builder()
            .orientation(Orientation::Horizontal)
            .spacing(6)
            .build();
        content.append(&gtk4::Image::from_icon_name(&info.icon_name));
        content.append(&gtk4::Label::new(Some(&info.name)));

        let button = gtk4::Button::builder()
            .child(&content)
            .tooltip_text(info.name.as_str())
            .css_classes(["flat", "mode-button"])
            .build();

        let modes = modes.clone();
        let name = info.name.clone();
        button.connect_clicked(move |_| {
            if let Some(modes) = modes.upgrade() {
                modes.borrow_mut().set_active_mode(&name, false);
            }
        });

        switcher.append(&button);
    }
}
