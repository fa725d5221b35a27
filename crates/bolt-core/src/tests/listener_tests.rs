//! Tests for the shortcut listener lifecycle

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use super::fixtures::{ScriptedKeySource, wait_until};
use crate::action::{AppAction, action_channel};
use crate::shortcut::{KeyEvent, KeyToken, ShortcutListener};

const TIMEOUT: Duration = Duration::from_secs(2);

fn combo(keys: &[KeyToken]) -> Vec<KeyEvent> {
    keys.iter().map(|key| KeyEvent::Pressed(*key)).collect()
}

#[test]
fn test_matching_combo_posts_toggle_window() {
    let source = Arc::new(ScriptedKeySource::new(combo(&[
        KeyToken::CtrlLeft,
        KeyToken::ShiftLeft,
        KeyToken::Char('a'),
    ])));
    let (sender, rx) = action_channel();
    let mut listener = ShortcutListener::new("<Control><Shift>a", source.clone(), sender);

    listener.start().unwrap();
    assert_eq!(rx.recv_blocking().unwrap(), AppAction::ToggleWindow);

    listener.stop();
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_superset_combo_posts_nothing() {
    let source = Arc::new(ScriptedKeySource::new(combo(&[
        KeyToken::CtrlLeft,
        KeyToken::ShiftLeft,
        KeyToken::AltLeft,
        KeyToken::Char('a'),
    ])));
    let (sender, rx) = action_channel();
    let mut listener = ShortcutListener::new("<Control><Shift>a", source.clone(), sender);

    listener.start().unwrap();
    assert!(wait_until(TIMEOUT, || source.active.load(Ordering::SeqCst) == 1));
    listener.stop();
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_unnamed_extra_key_posts_nothing() {
    // Ctrl + '[' + a: the bracket has no named token but is still held
    let source = Arc::new(ScriptedKeySource::new(combo(&[
        KeyToken::CtrlLeft,
        KeyToken::Other(26),
        KeyToken::Char('a'),
    ])));
    let (sender, rx) = action_channel();
    let mut listener = ShortcutListener::new("<Control>a", source.clone(), sender);

    listener.start().unwrap();
    assert!(wait_until(TIMEOUT, || source.active.load(Ordering::SeqCst) == 1));
    listener.stop();
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_start_is_idempotent() {
    let source = Arc::new(ScriptedKeySource::new(Vec::new()));
    let (sender, _rx) = action_channel();
    let mut listener = ShortcutListener::new("<Super>space", source.clone(), sender);

    listener.start().unwrap();
    listener.start().unwrap();
    assert!(wait_until(TIMEOUT, || source.active.load(Ordering::SeqCst) == 1));
    assert!(listener.is_running());
    assert_eq!(source.listens.load(Ordering::SeqCst), 1);

    listener.stop();
    assert!(!listener.is_running());
    assert_eq!(source.active.load(Ordering::SeqCst), 0);
}

#[test]
fn test_stop_without_start_is_safe() {
    let source = Arc::new(ScriptedKeySource::new(Vec::new()));
    let (sender, _rx) = action_channel();
    let mut listener = ShortcutListener::new("<Super>space", source, sender);
    listener.stop();
    listener.stop();
    assert!(!listener.is_running());
}

#[test]
fn test_invalid_accelerator_disarms() {
    let source = Arc::new(ScriptedKeySource::new(Vec::new()));
    let (sender, _rx) = action_channel();
    let mut listener = ShortcutListener::new("<Control>", source.clone(), sender);

    assert!(listener.target().is_empty());
    listener.start().unwrap();
    assert!(!listener.is_running());
    assert_eq!(source.listens.load(Ordering::SeqCst), 0);
}

#[test]
fn test_reconfigure_restarts_with_new_target() {
    let source = Arc::new(ScriptedKeySource::new(Vec::new()));
    let (sender, rx) = action_channel();
    let mut listener = ShortcutListener::new("<Super>space", source.clone(), sender);
    listener.start().unwrap();
    assert!(wait_until(TIMEOUT, || source.listens.load(Ordering::SeqCst) == 1));

    source.set_script(combo(&[KeyToken::AltRight, KeyToken::F(2)]));
    listener.reconfigure("<Alt>F2").unwrap();

    assert_eq!(rx.recv_blocking().unwrap(), AppAction::ToggleWindow);
    assert_eq!(source.listens.load(Ordering::SeqCst), 2);
    assert!(wait_until(TIMEOUT, || source.active.load(Ordering::SeqCst) == 1));
}

#[test]
fn test_reconfigure_with_invalid_accelerator_stops_listener() {
    let source = Arc::new(ScriptedKeySource::new(Vec::new()));
    let (sender, _rx) = action_channel();
    let mut listener = ShortcutListener::new("<Super>space", source.clone(), sender);
    listener.start().unwrap();

    listener.reconfigure("<Super>nonsense").unwrap();
    assert!(listener.target().is_empty());
    assert!(!listener.is_running());
    assert_eq!(source.active.load(Ordering::SeqCst), 0);
}

#[test]
fn test_failed_source_can_be_restarted() {
    let source = Arc::new(ScriptedKeySource::failing());
    let (sender, _rx) = action_channel();
    let mut listener = ShortcutListener::new("<Super>space", source.clone(), sender);

    listener.start().unwrap();
    assert!(wait_until(TIMEOUT, || !listener.is_running()));
    listener.start().unwrap();
    assert!(wait_until(TIMEOUT, || source.listens.load(Ordering::SeqCst) == 2));
}
