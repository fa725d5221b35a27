//! Error types for the tray service.

/// Errors raised while bringing the tray up or talking to the bus.
#[derive(Debug, thiserror::Error)]
pub enum TrayError {
    #[error("Invalid interface schema: {0}")]
    Schema(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("D-Bus error: {0}")]
    Bus(#[from] zbus::Error),

    #[error("Object path already registered: {0}")]
    PathInUse(String),

    #[error("Not connected to the session bus")]
    NotConnected,

    #[error("Bus name request for '{0}' was not granted")]
    NameRequest(String),
}

pub type Result<T> = std::result::Result<T, TrayError>;
