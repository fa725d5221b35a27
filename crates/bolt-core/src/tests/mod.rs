//! Test module for bolt-core
//!
//! Covers:
//! - Mode manager transitions, fallbacks and notifications
//! - Host view-stack reactions to mode changes
//! - Shortcut listener lifecycle and reconfiguration
//! - Configuration loading and defaults

mod config_tests;
mod listener_tests;
mod mode_manager_tests;
