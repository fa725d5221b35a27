//! Bolt GTK4 shell - desktop launcher with a tray icon and a global shortcut
//!
//! Owns the GTK application, its named actions and the host window. The tray
//! and the shortcut listener run on their own threads and reach the UI only
//! through the action channel drained here.

mod app;
mod dialogs;
mod views;
mod window;

use gtk4::glib;
use gtk4::prelude::*;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const APP_ID: &str = "org.bolt.Launcher";

fn env_filter(directive: &str) -> EnvFilter {
    let filter = EnvFilter::from_default_env();
    match directive.parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}

fn setup_logging() {
    #[cfg(debug_assertions)]
    {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let log_filename = format!("bolt-{timestamp}.log");
        let log_path = std::path::Path::new("/tmp").join(&log_filename);

        let symlink_path = std::path::Path::new("/tmp/bolt.log");
        let _ = std::fs::remove_file(symlink_path);
        let _ = std::os::unix::fs::symlink(&log_path, symlink_path);

        let file_appender = tracing_appender::rolling::never("/tmp", &log_filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(non_blocking)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true),
            )
            .with(env_filter("bolt_gtk=debug"))
            .init();

        std::mem::forget(guard);
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(env_filter("bolt_gtk=info"))
            .init();
    }
}

fn main() -> glib::ExitCode {
    setup_logging();

    info!("Starting bolt {}", env!("CARGO_PKG_VERSION"));

    let app = gtk4::Application::builder().application_id(APP_ID).build();

    // Closing the window hides it; only the quit action ends the process
    let hold_guard = app.hold();
    std::mem::forget(hold_guard);

    app::install(&app);

    app.run()
}
