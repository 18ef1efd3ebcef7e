use std::collections::BTreeMap;

use super::{ButtonState, InputEvent, Key};

/// State of one key.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct KeyInfo {
    pub down: bool,
    /// Frame at which the key was last released.
    pub released_frame: Option<u64>,
}

/// Key state table fed from input events.
///
/// Repeat events are ignored unless the keyboard was created with
/// `accept_repeat`. Queries for keys never seen return the released default.
#[derive(Debug, Default)]
pub struct Keyboard {
    keys: BTreeMap<Key, KeyInfo>,
    accept_repeat: bool,
    frame: u64,
}

impl Keyboard {
    pub fn new(accept_repeat: bool) -> Self {
        Self { accept_repeat, ..Self::default() }
    }

    /// Advances the frame counter `released` is evaluated against.
    pub fn begin_frame(&mut self, frame: u64) {
        self.frame = frame;
    }

    /// Applies a key event. Returns true if the event changed the table.
    pub fn event(&mut self, event: &InputEvent) -> bool {
        let InputEvent::Key { key, state, repeat, .. } = event else {
            return false;
        };
        if *repeat && !self.accept_repeat {
            return false;
        }

        let info = self.keys.entry(*key).or_default();
        match state {
            ButtonState::Pressed => info.down = true,
            ButtonState::Released => {
                info.down = false;
                info.released_frame = Some(self.frame);
            }
        }
        true
    }

    pub fn get(&self, key: Key) -> KeyInfo {
        self.keys.get(&key).copied().unwrap_or_default()
    }

    pub fn down(&self, key: Key) -> bool {
        self.get(key).down
    }

    /// True only during the frame the key was released.
    pub fn released(&self, key: Key) -> bool {
        self.get(key).released_frame == Some(self.frame)
    }

    /// Every key seen so far, in key order.
    pub fn iter(&self) -> impl Iterator<Item = (Key, KeyInfo)> + '_ {
        self.keys.iter().map(|(k, v)| (*k, *v))
    }

    /// Releases every held key, as on focus loss.
    pub fn release_all(&mut self) {
        let frame = self.frame;
        for info in self.keys.values_mut().filter(|i| i.down) {
            info.down = false;
            info.released_frame = Some(frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;

    fn key(key: Key, state: ButtonState, repeat: bool) -> InputEvent {
        InputEvent::Key { key, state, modifiers: Modifiers::default(), repeat }
    }

    #[test]
    fn unknown_key_is_up() {
        let kb = Keyboard::default();
        assert_eq!(kb.get(Key::A), KeyInfo::default());
        assert!(!kb.released(Key::A));
    }

    #[test]
    fn released_only_on_release_frame() {
        let mut kb = Keyboard::new(false);
        kb.begin_frame(1);
        kb.event(&key(Key::Space, ButtonState::Pressed, false));
        assert!(kb.down(Key::Space));

        kb.begin_frame(2);
        kb.event(&key(Key::Space, ButtonState::Released, false));
        assert!(!kb.down(Key::Space));
        assert!(kb.released(Key::Space));

        kb.begin_frame(3);
        assert!(!kb.released(Key::Space));
    }

    #[test]
    fn repeat_filtering() {
        let mut kb = Keyboard::new(false);
        assert!(!kb.event(&key(Key::W, ButtonState::Pressed, true)));
        assert!(!kb.down(Key::W));

        let mut kb = Keyboard::new(true);
        assert!(kb.event(&key(Key::W, ButtonState::Pressed, true)));
        assert!(kb.down(Key::W));
    }

    #[test]
    fn non_key_events_are_ignored() {
        let mut kb = Keyboard::default();
        assert!(!kb.event(&InputEvent::Focused(false)));
        assert_eq!(kb.iter().count(), 0);
    }

    #[test]
    fn release_all_marks_held_keys_released() {
        let mut kb = Keyboard::default();
        kb.begin_frame(5);
        kb.event(&key(Key::A, ButtonState::Pressed, false));
        kb.event(&key(Key::B, ButtonState::Pressed, false));
        kb.event(&key(Key::B, ButtonState::Released, false));
        kb.begin_frame(6);
        kb.release_all();

        assert!(!kb.down(Key::A));
        assert!(kb.released(Key::A));
        assert_eq!(kb.get(Key::B).released_frame, Some(5));
    }
}
