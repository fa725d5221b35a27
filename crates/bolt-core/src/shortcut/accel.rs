//! Accelerator strings (`<Control><Shift>a`) and the key tokens they parse to.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::{Error, Result};

static ACCEL_PARTS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(<[^>]+>|[^<]+)").ok());

/// Abstract key identity, independent of the platform key codes.
///
/// Modifiers come in a canonical form and side-specific forms; key events
/// carry whichever the device reports and [`KeyToken::canonical`] folds them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyToken {
    Ctrl,
    CtrlLeft,
    CtrlRight,
    Alt,
    AltLeft,
    AltRight,
    Shift,
    ShiftLeft,
    ShiftRight,
    Super,
    SuperLeft,
    SuperRight,
    Space,
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    F(u8),
    /// Lowercase ASCII letter or digit
    Char(char),
    /// Any other physical key, by raw code. Never produced by parsing, but
    /// still held, so it blocks an exact match.
    Other(u16),
}

impl KeyToken {
    /// Fold side-specific modifier variants into their generic form.
    ///
    /// This is the only place left/right modifier identity is discarded.
    #[must_use]
    pub fn canonical(self) -> Self {
        match self {
            KeyToken::CtrlLeft | KeyToken::CtrlRight => KeyToken::Ctrl,
            KeyToken::AltLeft | KeyToken::AltRight => KeyToken::Alt,
            KeyToken::ShiftLeft | KeyToken::ShiftRight => KeyToken::Shift,
            KeyToken::SuperLeft | KeyToken::SuperRight => KeyToken::Super,
            KeyToken::Char(c) => KeyToken::Char(c.to_ascii_lowercase()),
            other => other,
        }
    }

    fn from_modifier_name(name: &str) -> Option<Self> {
        Some(match name.to_lowercase().as_str() {
            "control" | "ctrl" | "primary" => KeyToken::Ctrl,
            "alt" | "meta" => KeyToken::Alt,
            "shift" => KeyToken::Shift,
            "super" => KeyToken::Super,
            _ => return None,
        })
    }

    fn from_key_name(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        Some(match lower.as_str() {
            "space" => KeyToken::Space,
            "enter" | "return" => KeyToken::Enter,
            "esc" | "escape" => KeyToken::Escape,
            "tab" => KeyToken::Tab,
            "backspace" => KeyToken::Backspace,
            "delete" => KeyToken::Delete,
            "home" => KeyToken::Home,
            "end" => KeyToken::End,
            "pageup" | "page_up" => KeyToken::PageUp,
            "pagedown" | "page_down" => KeyToken::PageDown,
            "up" => KeyToken::Up,
            "down" => KeyToken::Down,
            "left" => KeyToken::Left,
            "right" => KeyToken::Right,
            _ => {
                if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                    return (1..=12).contains(&n).then_some(KeyToken::F(n));
                }
                let mut chars = lower.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_alphanumeric() => KeyToken::Char(c),
                    _ => return None,
                }
            }
        })
    }
}

impl fmt::Display for KeyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyToken::F(n) => write!(f, "F{n}"),
            KeyToken::Char(c) => write!(f, "{c}"),
            KeyToken::Other(code) => write!(f, "key#{code}"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Target key combination: modifier tokens plus one terminal key, all canonical.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShortcutSpec {
    keys: BTreeSet<KeyToken>,
}

impl ShortcutSpec {
    /// Parse an accelerator string such as `<Control><Shift>a` or `<Super>space`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Shortcut`] for an empty string, an unknown modifier,
    /// a missing terminal key or an unknown key name.
    pub fn parse(accelerator: &str) -> Result<Self> {
        let accelerator = accelerator.trim();
        if accelerator.is_empty() {
            return Err(Error::Shortcut("empty accelerator".to_string()));
        }

        let Some(splitter) = ACCEL_PARTS.as_ref() else {
            return Err(Error::Shortcut("accelerator pattern unavailable".to_string()));
        };
        let parts: Vec<&str> = splitter
            .find_iter(accelerator)
            .map(|m| m.as_str().trim())
            .filter(|part| !part.is_empty())
            .collect();

        let Some((key_part, modifier_parts)) = parts.split_last() else {
            return Err(Error::Shortcut(format!("no key in '{accelerator}'")));
        };
        if key_part.starts_with('<') {
            return Err(Error::Shortcut(format!("no key in '{accelerator}'")));
        }

        let mut keys = BTreeSet::new();
        for part in modifier_parts {
            let name = part.trim_start_matches('<').trim_end_matches('>');
            let token = KeyToken::from_modifier_name(name)
                .ok_or_else(|| Error::Shortcut(format!("unknown modifier '{part}'")))?;
            keys.insert(token);
        }

        let key = KeyToken::from_key_name(key_part)
            .ok_or_else(|| Error::Shortcut(format!("unknown key '{key_part}'")))?;
        keys.insert(key);

        Ok(Self { keys })
    }

    /// Parse, logging and disarming (empty spec) on failure.
    #[must_use]
    pub fn parse_or_disarm(accelerator: &str) -> Self {
        Self::parse(accelerator).unwrap_or_else(|e| {
            warn!("Invalid shortcut '{accelerator}': {e}");
            Self::default()
        })
    }

    /// An empty spec never matches.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[must_use]
    pub fn keys(&self) -> &BTreeSet<KeyToken> {
        &self.keys
    }

    /// Exact-set comparison against a normalized held-key set.
    #[must_use]
    pub fn matches(&self, normalized_held: &BTreeSet<KeyToken>) -> bool {
        !self.keys.is_empty() && *normalized_held == self.keys
    }
}

impl fmt::Display for ShortcutSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.keys.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join("+"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ctrl_shift_letter() {
        let spec = ShortcutSpec::parse("<Control><Shift>a").unwrap();
        let expected: BTreeSet<_> = [KeyToken::Ctrl, KeyToken::Shift, KeyToken::Char('a')]
            .into_iter()
            .collect();
        assert_eq!(spec.keys(), &expected);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let upper = ShortcutSpec::parse("<CONTROL><Shift>A").unwrap();
        let lower = ShortcutSpec::parse("<control><shift>a").unwrap();
        assert_eq!(upper, lower);
    }

    #[test]
    fn test_parse_named_keys() {
        let spec = ShortcutSpec::parse("<Super>space").unwrap();
        assert!(spec.keys().contains(&KeyToken::Space));
        assert!(spec.keys().contains(&KeyToken::Super));

        assert!(ShortcutSpec::parse("<Alt>Return").unwrap().keys().contains(&KeyToken::Enter));
        assert!(ShortcutSpec::parse("<Ctrl>page_down").unwrap().keys().contains(&KeyToken::PageDown));
        assert!(ShortcutSpec::parse("<Ctrl>F12").unwrap().keys().contains(&KeyToken::F(12)));
        assert!(ShortcutSpec::parse("<Ctrl>1").unwrap().keys().contains(&KeyToken::Char('1')));
    }

    #[test]
    fn test_meta_maps_to_alt() {
        let meta = ShortcutSpec::parse("<Meta>x").unwrap();
        let alt = ShortcutSpec::parse("<Alt>x").unwrap();
        assert_eq!(meta, alt);
    }

    #[test]
    fn test_parse_key_without_modifiers() {
        let spec = ShortcutSpec::parse("F5").unwrap();
        assert_eq!(spec.keys().len(), 1);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(ShortcutSpec::parse("").is_err());
        assert!(ShortcutSpec::parse("   ").is_err());
        assert!(ShortcutSpec::parse("<Control>").is_err());
        assert!(ShortcutSpec::parse("<Hyper>a").is_err());
        assert!(ShortcutSpec::parse("<Control>foo").is_err());
        assert!(ShortcutSpec::parse("<Control>F13").is_err());
    }

    #[test]
    fn test_parse_or_disarm_yields_empty_spec() {
        assert!(ShortcutSpec::parse_or_disarm("<Control>").is_empty());
        assert!(ShortcutSpec::parse_or_disarm("").is_empty());
        assert!(!ShortcutSpec::parse_or_disarm("<Control>space").is_empty());
    }

    #[test]
    fn test_canonical_folds_sides() {
        assert_eq!(KeyToken::CtrlLeft.canonical(), KeyToken::Ctrl);
        assert_eq!(KeyToken::CtrlRight.canonical(), KeyToken::Ctrl);
        assert_eq!(KeyToken::AltRight.canonical(), KeyToken::Alt);
        assert_eq!(KeyToken::ShiftLeft.canonical(), KeyToken::Shift);
        assert_eq!(KeyToken::SuperRight.canonical(), KeyToken::Super);
        assert_eq!(KeyToken::Char('A').canonical(), KeyToken::Char('a'));
        assert_eq!(KeyToken::Space.canonical(), KeyToken::Space);
    }

    #[test]
    fn test_empty_spec_never_matches() {
        let held: BTreeSet<KeyToken> = BTreeSet::new();
        assert!(!ShortcutSpec::default().matches(&held));
    }

    #[test]
    fn test_display() {
        let spec = ShortcutSpec::parse("<Control><Shift>a").unwrap();
        assert_eq!(spec.to_string(), "Ctrl+Shift+a");
    }
}
