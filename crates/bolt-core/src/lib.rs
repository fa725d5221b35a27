pub mod action;
pub mod config;
pub mod mode;
pub mod shortcut;

mod error;

#[cfg(test)]
mod tests;

pub use action::{ActionSender, AppAction, action_channel};
pub use error::{Error, Result};
