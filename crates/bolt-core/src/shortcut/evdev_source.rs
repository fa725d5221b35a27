//! Key source reading `/dev/input` keyboards through evdev.
//!
//! Works on X11 and Wayland alike; the user needs read access to the event
//! devices (usually membership in the `input` group).

use evdev::{EventStream, InputEventKind, Key};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::accel::KeyToken;
use super::listener::KeySource;
use super::matcher::KeyEvent;
use crate::{Error, Result};

#[derive(Debug, Default, Clone, Copy)]
pub struct EvdevKeySource;

impl KeySource for EvdevKeySource {
    fn listen(&self, cancel: &CancellationToken, on_event: &mut dyn FnMut(KeyEvent)) -> Result<()> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        runtime.block_on(async {
            let keyboards = open_keyboards();
            if keyboards.is_empty() {
                return Err(Error::Shortcut(
                    "no readable keyboard devices under /dev/input".to_string(),
                ));
            }

            let (tx, mut rx) = mpsc::unbounded_channel();
            let mut readers = JoinSet::new();
            for (name, stream) in keyboards {
                readers.spawn(forward_events(name, stream, tx.clone()));
            }
            drop(tx);

            let outcome = loop {
                tokio::select! {
                    () = cancel.cancelled() => break Ok(()),
                    event = rx.recv() => match event {
                        Some(event) => on_event(event),
                        None => break Err(Error::Shortcut("all keyboard devices closed".to_string())),
                    },
                }
            };

            // Dropping the readers closes the device file descriptors.
            readers.abort_all();
            while readers.join_next().await.is_some() {}
            outcome
        })
    }
}

fn open_keyboards() -> Vec<(String, EventStream)> {
    evdev::enumerate()
        .filter_map(|(path, device)| {
            let is_keyboard = device
                .supported_keys()
                .is_some_and(|keys| keys.contains(Key::KEY_SPACE) && keys.contains(Key::KEY_A));
            if !is_keyboard {
                return None;
            }

            let name = device.name().unwrap_or("unnamed").to_string();
            match device.into_event_stream() {
                Ok(stream) => {
                    debug!("Listening on keyboard '{name}' ({})", path.display());
                    Some((name, stream))
                }
                Err(e) => {
                    warn!("Cannot read keyboard {}: {e}", path.display());
                    None
                }
            }
        })
        .collect()
}

async fn forward_events(name: String, mut stream: EventStream, tx: mpsc::UnboundedSender<KeyEvent>) {
    loop {
        let event = match stream.next_event().await {
            Ok(event) => event,
            Err(e) => {
                warn!("Keyboard '{name}' stopped delivering events: {e}");
                return;
            }
        };

        let InputEventKind::Key(key) = event.kind() else {
            continue;
        };
        let token = key_token(key);
        let key_event = match event.value() {
            0 => KeyEvent::Released(token),
            1 => KeyEvent::Pressed(token),
            2 => KeyEvent::Repeated(token),
            _ => continue,
        };
        if tx.send(key_event).is_err() {
            return;
        }
    }
}

/// Map a Linux key code to a layout-independent token (US physical layout).
///
/// Unnamed keys keep their raw code so they still count as held.
fn key_token(key: Key) -> KeyToken {
    match key {
        Key::KEY_LEFTCTRL => KeyToken::CtrlLeft,
        Key::KEY_RIGHTCTRL => KeyToken::CtrlRight,
        Key::KEY_LEFTALT => KeyToken::AltLeft,
        Key::KEY_RIGHTALT => KeyToken::AltRight,
        Key::KEY_LEFTSHIFT => KeyToken::ShiftLeft,
        Key::KEY_RIGHTSHIFT => KeyToken::ShiftRight,
        Key::KEY_LEFTMETA => KeyToken::SuperLeft,
        Key::KEY_RIGHTMETA => KeyToken::SuperRight,
        Key::KEY_SPACE => KeyToken::Space,
        Key::KEY_ENTER | Key::KEY_KPENTER => KeyToken::Enter,
        Key::KEY_ESC => KeyToken::Escape,
        Key::KEY_TAB => KeyToken::Tab,
        Key::KEY_BACKSPACE => KeyToken::Backspace,
        Key::KEY_DELETE => KeyToken::Delete,
        Key::KEY_HOME => KeyToken::Home,
        Key::KEY_END => KeyToken::End,
        Key::KEY_PAGEUP => KeyToken::PageUp,
        Key::KEY_PAGEDOWN => KeyToken::PageDown,
        Key::KEY_UP => KeyToken::Up,
        Key::KEY_DOWN => KeyToken::Down,
        Key::KEY_LEFT => KeyToken::Left,
        Key::KEY_RIGHT => KeyToken::Right,
        Key::KEY_F1 => KeyToken::F(1),
        Key::KEY_F2 => KeyToken::F(2),
        Key::KEY_F3 => KeyToken::F(3),
        Key::KEY_F4 => KeyToken::F(4),
        Key::KEY_F5 => KeyToken::F(5),
        Key::KEY_F6 => KeyToken::F(6),
        Key::KEY_F7 => KeyToken::F(7),
        Key::KEY_F8 => KeyToken::F(8),
        Key::KEY_F9 => KeyToken::F(9),
        Key::KEY_F10 => KeyToken::F(10),
        Key::KEY_F11 => KeyToken::F(11),
        Key::KEY_F12 => KeyToken::F(12),
        Key::KEY_1 => KeyToken::Char('1'),
        Key::KEY_2 => KeyToken::Char('2'),
        Key::KEY_3 => KeyToken::Char('3'),
        Key::KEY_4 => KeyToken::Char('4'),
        Key::KEY_5 => KeyToken::Char('5'),
        Key::KEY_6 => KeyToken::Char('6'),
        Key::KEY_7 => KeyToken::Char('7'),
        Key::KEY_8 => KeyToken::Char('8'),
        Key::KEY_9 => KeyToken::Char('9'),
        Key::KEY_0 => KeyToken::Char('0'),
        Key::KEY_A => KeyToken::Char('a'),
        Key::KEY_B => KeyToken::Char('b'),
        Key::KEY_C => KeyToken::Char('c'),
        Key::KEY_D => KeyToken::Char('d'),
        Key::KEY_E => KeyToken::Char('e'),
        Key::KEY_F => KeyToken::Char('f'),
        Key::KEY_G => KeyToken::Char('g'),
        Key::KEY_H => KeyToken::Char('h'),
        Key::KEY_I => KeyToken::Char('i'),
        Key::KEY_J => KeyToken::Char('j'),
        Key::KEY_K => KeyToken::Char('k'),
        Key::KEY_L => KeyToken::Char('l'),
        Key::KEY_M => KeyToken::Char('m'),
        Key::KEY_N => KeyToken::Char('n'),
        Key::KEY_O => KeyToken::Char('o'),
        Key::KEY_P => KeyToken::Char('p'),
        Key::KEY_Q => KeyToken::Char('q'),
        Key::KEY_R => KeyToken::Char('r'),
        Key::KEY_S => KeyToken::Char('s'),
        Key::KEY_T => KeyToken::Char('t'),
        Key::KEY_U => KeyToken::Char('u'),
        Key::KEY_V => KeyToken::Char('v'),
        Key::KEY_W => KeyToken::Char('w'),
        Key::KEY_X => KeyToken::Char('x'),
        Key::KEY_Y => KeyToken::Char('y'),
        Key::KEY_Z => KeyToken::Char('z'),
        other => KeyToken::Other(other.code()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::shortcut::{ShortcutMatcher, ShortcutSpec};

    #[test]
    fn test_modifier_codes_keep_their_side() {
        assert_eq!(key_token(Key::KEY_LEFTCTRL), KeyToken::CtrlLeft);
        assert_eq!(key_token(Key::KEY_RIGHTMETA), KeyToken::SuperRight);
    }

    #[test]
    fn test_letter_and_digit_codes() {
        assert_eq!(key_token(Key::KEY_A), KeyToken::Char('a'));
        assert_eq!(key_token(Key::KEY_0), KeyToken::Char('0'));
        assert_eq!(key_token(Key::KEY_F12), KeyToken::F(12));
    }

    #[test]
    fn test_unmapped_code_keeps_raw_code() {
        assert_eq!(
            key_token(Key::KEY_VOLUMEUP),
            KeyToken::Other(Key::KEY_VOLUMEUP.code())
        );
        assert_eq!(
            key_token(Key::KEY_LEFTBRACE),
            KeyToken::Other(Key::KEY_LEFTBRACE.code())
        );
    }

    #[test]
    fn test_unmapped_held_key_blocks_match() {
        let mut matcher = ShortcutMatcher::new(ShortcutSpec::parse("<Control>a").unwrap());
        let fired = [Key::KEY_LEFTCTRL, Key::KEY_LEFTBRACE, Key::KEY_A]
            .into_iter()
            .filter(|key| matcher.handle(KeyEvent::Pressed(key_token(*key))))
            .count();
        assert_eq!(fired, 0);
    }
}
