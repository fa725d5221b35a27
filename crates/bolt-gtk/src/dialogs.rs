//! Modal dialogs shown over the launcher window.

use gtk4::prelude::*;
use tracing::warn;

/// Report a failed user action. The window is optional so errors raised
/// while it is gone are still surfaced.
pub fn show_error(parent: Option<&gtk4::ApplicationWindow>, title: &str, message: &str) {
    warn!("{title}: {message}");

    let dialog = gtk4::AlertDialog::builder()
        .message(title)
        .detail(message)
        .modal(true)
        .build();
    dialog.show(parent);
}

pub fn show_about(parent: Option<&gtk4::ApplicationWindow>) {
    let dialog = gtk4::AboutDialog::builder()
        .program_name("Bolt")
        .version(env!("CARGO_PKG_VERSION"))
        .comments("Desktop launcher with switchable modes")
        .logo_icon_name("system-run-symbolic")
        .license_type(gtk4::License::MitX11)
        .modal(true)
        .build();

    if let Some(parent) = parent {
        dialog.set_transient_for(Some(parent));
    }
    dialog.present();
}

/// Stand-in view for a mode that has nothing to show.
pub fn placeholder(message: &str) -> gtk4::Widget {
    gtk4::Label::builder()
        .label(message)
        .wrap(true)
        .vexpand(true)
        .css_classes(["dim-label"])
        .build()
        .upcast()
}
