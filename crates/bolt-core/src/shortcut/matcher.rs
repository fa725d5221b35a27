use std::collections::BTreeSet;

use super::accel::{KeyToken, ShortcutSpec};

/// Raw key event as delivered by a [`super::KeySource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Pressed(KeyToken),
    /// Autorepeat while the key stays down
    Repeated(KeyToken),
    Released(KeyToken),
}

/// Held-key state machine for a single target combination.
///
/// Owned by the listener thread. Held keys keep their raw (side-specific)
/// identity so releasing one Ctrl while the other stays down is tracked
/// correctly; comparison happens on the normalized set.
#[derive(Debug, Default)]
pub struct ShortcutMatcher {
    target: ShortcutSpec,
    held: BTreeSet<KeyToken>,
}

impl ShortcutMatcher {
    #[must_use]
    pub fn new(target: ShortcutSpec) -> Self {
        Self {
            target,
            held: BTreeSet::new(),
        }
    }

    /// Feed one event. Returns `true` when it completes the target combination.
    ///
    /// Only fresh presses can trigger; autorepeat is ignored so a held
    /// combination fires once per physical press.
    pub fn handle(&mut self, event: KeyEvent) -> bool {
        match event {
            KeyEvent::Pressed(key) => {
                self.held.insert(key);
                self.target.matches(&self.normalized_held())
            }
            KeyEvent::Repeated(_) => false,
            KeyEvent::Released(key) => {
                self.held.remove(&key);
                false
            }
        }
    }

    /// Held keys with side-specific modifiers folded to their canonical form.
    #[must_use]
    pub fn normalized_held(&self) -> BTreeSet<KeyToken> {
        self.held.iter().map(|key| key.canonical()).collect()
    }

    #[must_use]
    pub fn held(&self) -> &BTreeSet<KeyToken> {
        &self.held
    }

    pub fn reset(&mut self) {
        self.held.clear();
    }

    #[must_use]
    pub fn target(&self) -> &ShortcutSpec {
        &self.target
    }
}
