//! Tests for the mode registry and active-mode state machine

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::fixtures::{
    EventLog, RecordingMode, TestView, failing_loader, loader, placeholder,
};
use crate::mode::{ModeChange, ModeInfo, ModeManager};

struct Harness {
    log: EventLog,
    view_ids: Rc<Cell<u32>>,
    changes: Rc<RefCell<Vec<ModeChange<TestView>>>>,
}

impl Harness {
    fn new() -> Self {
        Self {
            log: Rc::new(RefCell::new(Vec::new())),
            view_ids: Rc::new(Cell::new(1)),
            changes: Rc::new(RefCell::new(Vec::new())),
        }
    }

    fn mode(&self, name: &str) -> RecordingMode {
        RecordingMode::new(name, &self.log, &self.view_ids)
    }

    fn observe(&self, manager: &mut ModeManager<TestView>) {
        let changes = Rc::clone(&self.changes);
        manager.connect_mode_changed(move |change| changes.borrow_mut().push(change.clone()));
        self.log.borrow_mut().clear();
    }

    fn log(&self) -> Vec<String> {
        self.log.borrow().clone()
    }
}

fn standard_manager(h: &Harness) -> ModeManager<TestView> {
    ModeManager::new(
        vec![
            loader(h.mode("Launcher")),
            loader(h.mode("AI Chat")),
            loader(h.mode("Clipboard History")),
        ],
        "Launcher",
        placeholder,
    )
}

#[test]
fn test_initial_mode_is_preferred_default() {
    let h = Harness::new();
    let manager = standard_manager(&h);
    assert_eq!(manager.active_mode_name(), Some("Launcher"));
    assert_eq!(h.log(), vec!["activate:Launcher"]);
}

#[test]
fn test_initial_mode_falls_back_to_first_loaded() {
    let h = Harness::new();
    let manager = ModeManager::new(
        vec![loader(h.mode("AI Chat")), loader(h.mode("Clipboard History"))],
        "Launcher",
        placeholder,
    );
    assert_eq!(manager.active_mode_name(), Some("AI Chat"));
}

#[test]
fn test_no_modes_leaves_no_active_mode() {
    let mut manager: ModeManager<TestView> =
        ModeManager::new(vec![failing_loader("Launcher")], "Launcher", placeholder);
    assert!(manager.is_empty());
    assert_eq!(manager.active_mode_name(), None);
    assert!(manager.active_view().is_none());
    assert!(!manager.handle_cancel_key());
}

#[test]
fn test_failed_loader_does_not_block_others() {
    let h = Harness::new();
    let manager = ModeManager::new(
        vec![
            loader(h.mode("Launcher")),
            failing_loader("AI Chat"),
            loader(h.mode("Clipboard History")),
        ],
        "Launcher",
        placeholder,
    );
    let names: Vec<String> = manager
        .available_modes()
        .into_iter()
        .map(|info| info.name)
        .collect();
    assert_eq!(names, vec!["Launcher", "Clipboard History"]);
}

#[test]
fn test_duplicate_names_rejected() {
    let h = Harness::new();
    let manager = ModeManager::new(
        vec![loader(h.mode("Launcher")), loader(h.mode("Launcher"))],
        "Launcher",
        placeholder,
    );
    assert_eq!(manager.len(), 1);
}

#[test]
fn test_unknown_mode_fails_and_keeps_active() {
    let h = Harness::new();
    let mut manager = standard_manager(&h);
    h.observe(&mut manager);

    assert!(!manager.set_active_mode("Calculator", false));
    assert_eq!(manager.active_mode_name(), Some("Launcher"));
    assert!(h.log().is_empty());
    assert!(h.changes.borrow().is_empty());
}

#[test]
fn test_same_mode_without_force_is_noop() {
    let h = Harness::new();
    let mut manager = standard_manager(&h);
    h.observe(&mut manager);

    assert!(manager.set_active_mode("Launcher", false));
    assert!(h.log().is_empty());
    assert!(h.changes.borrow().is_empty());
}

#[test]
fn test_same_mode_with_force_reemits() {
    let h = Harness::new();
    let mut manager = standard_manager(&h);
    h.observe(&mut manager);

    assert!(manager.set_active_mode("Launcher", true));
    assert_eq!(h.log(), vec!["deactivate:Launcher", "activate:Launcher"]);
    assert_eq!(h.changes.borrow().len(), 1);
    assert_eq!(h.changes.borrow()[0].mode_name, "Launcher");
}

#[test]
fn test_switch_deactivates_old_and_activates_new() {
    let h = Harness::new();
    let mut manager = standard_manager(&h);
    h.observe(&mut manager);

    assert!(manager.set_active_mode("AI Chat", false));
    assert_eq!(h.log(), vec!["deactivate:Launcher", "activate:AI Chat"]);
    assert_eq!(manager.active_mode_name(), Some("AI Chat"));

    let changes = h.changes.borrow();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].view.label, "AI Chat");
    assert_eq!(changes[0].icon_name, "ai chat-symbolic");
    assert!(!changes[0].is_placeholder);
}

#[test]
fn test_view_is_created_once_and_reused() {
    let h = Harness::new();
    let mut manager = standard_manager(&h);
    h.observe(&mut manager);

    manager.set_active_mode("AI Chat", false);
    manager.set_active_mode("Launcher", false);
    manager.set_active_mode("AI Chat", false);

    let changes = h.changes.borrow();
    assert_eq!(changes[0].view, changes[2].view);
}

#[test]
fn test_mode_without_view_broadcasts_placeholder() {
    let h = Harness::new();
    let mut manager = ModeManager::new(
        vec![
            loader(h.mode("Launcher")),
            loader(h.mode("Window Management").without_view()),
        ],
        "Launcher",
        placeholder,
    );
    h.observe(&mut manager);

    assert!(manager.set_active_mode("Window Management", false));
    let changes = h.changes.borrow();
    assert!(changes[0].is_placeholder);
    assert_eq!(changes[0].icon_name, "window management-symbolic");
    assert_eq!(
        changes[0].view.label,
        "Error: Mode 'Window Management' has no view."
    );
    assert_eq!(manager.active_mode_name(), Some("Window Management"));
}

#[test]
fn test_exactly_one_mode_active_after_transitions() {
    let h = Harness::new();
    let mut manager = standard_manager(&h);
    manager.set_active_mode("AI Chat", false);
    manager.set_active_mode("Clipboard History", false);

    let log = h.log();
    let activations = log.iter().filter(|e| e.starts_with("activate:")).count();
    let deactivations = log.iter().filter(|e| e.starts_with("deactivate:")).count();
    assert_eq!(activations - deactivations, 1);
}

#[test]
fn test_cancel_key_forwards_to_active_mode() {
    let h = Harness::new();
    let mut manager = ModeManager::new(
        vec![
            loader(h.mode("Launcher").consuming_cancel()),
            loader(h.mode("AI Chat")),
        ],
        "Launcher",
        placeholder,
    );
    assert!(manager.handle_cancel_key());
    manager.set_active_mode("AI Chat", false);
    assert!(!manager.handle_cancel_key());
    assert!(h.log().contains(&"cancel:AI Chat".to_string()));
}

#[test]
fn test_modes_updated_observer_gets_current_list() {
    let h = Harness::new();
    let mut manager = standard_manager(&h);
    let seen: Rc<RefCell<Vec<Vec<ModeInfo>>>> = Rc::new(RefCell::new(Vec::new()));
    let seen_clone = Rc::clone(&seen);
    manager.connect_modes_updated(move |modes| seen_clone.borrow_mut().push(modes.to_vec()));

    assert_eq!(seen.borrow().len(), 1);
    assert_eq!(seen.borrow()[0][2].name, "Clipboard History");
    assert_eq!(seen.borrow()[0][2].icon_name, "clipboard history-symbolic");

    manager.register(loader(h.mode("Window Management")));
    assert_eq!(seen.borrow().len(), 2);
    assert_eq!(seen.borrow()[1].len(), 4);
}

#[test]
fn test_mode_by_name() {
    let h = Harness::new();
    let manager = standard_manager(&h);
    assert_eq!(manager.mode_by_name("AI Chat").map(|m| m.name()), Some("AI Chat"));
    assert!(manager.mode_by_name("Calculator").is_none());
}
