use std::collections::HashSet;

use super::{ButtonState, InputEvent, Keyboard, Modifiers, MouseButton};

/// Aggregated input state of the window, updated by the runtime before events
/// are dispatched to the application.
#[derive(Debug, Default)]
pub struct InputState {
    pub keyboard: Keyboard,
    pub modifiers: Modifiers,
    pub focused: bool,
    /// Pointer position in logical pixels, `None` while outside the window.
    pub pointer: Option<(f32, f32)>,
    buttons_down: HashSet<MouseButton>,
}

impl InputState {
    pub fn new(accept_key_repeat: bool) -> Self {
        Self { keyboard: Keyboard::new(accept_key_repeat), ..Self::default() }
    }

    pub fn begin_frame(&mut self, frame: u64) {
        self.keyboard.begin_frame(frame);
    }

    pub fn apply(&mut self, event: &InputEvent) {
        match event {
            InputEvent::Key { modifiers, .. } => {
                self.modifiers = *modifiers;
                self.keyboard.event(event);
            }
            InputEvent::PointerMoved { x, y, modifiers } => {
                self.pointer = Some((*x, *y));
                self.modifiers = *modifiers;
            }
            InputEvent::PointerButton { button, state, x, y, modifiers } => {
                self.pointer = Some((*x, *y));
                self.modifiers = *modifiers;
                match state {
                    ButtonState::Pressed => self.buttons_down.insert(*button),
                    ButtonState::Released => self.buttons_down.remove(button),
                };
            }
            InputEvent::Wheel { modifiers, .. } => self.modifiers = *modifiers,
            InputEvent::ModifiersChanged(m) => self.modifiers = *m,
            InputEvent::PointerLeft => self.pointer = None,
            InputEvent::Focused(focused) => {
                self.focused = *focused;
                if !focused {
                    // Releases arriving while unfocused are never delivered.
                    self.keyboard.release_all();
                    self.buttons_down.clear();
                    self.modifiers = Modifiers::default();
                }
            }
        }
    }

    pub fn button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Key;

    fn press(button: MouseButton) -> InputEvent {
        InputEvent::PointerButton {
            button,
            state: ButtonState::Pressed,
            x: 10.0,
            y: 20.0,
            modifiers: Modifiers { shift: true, ..Modifiers::default() },
        }
    }

    #[test]
    fn tracks_buttons_pointer_and_modifiers() {
        let mut input = InputState::new(false);
        input.apply(&press(MouseButton::Left));

        assert!(input.button_down(MouseButton::Left));
        assert_eq!(input.pointer, Some((10.0, 20.0)));
        assert!(input.modifiers.shift);

        input.apply(&InputEvent::PointerLeft);
        assert_eq!(input.pointer, None);
    }

    #[test]
    fn focus_loss_clears_held_state() {
        let mut input = InputState::new(false);
        input.apply(&press(MouseButton::Right));
        input.apply(&InputEvent::Key {
            key: Key::Q,
            state: ButtonState::Pressed,
            modifiers: Modifiers::default(),
            repeat: false,
        });
        assert!(input.keyboard.down(Key::Q));

        input.apply(&InputEvent::Focused(false));
        assert!(!input.button_down(MouseButton::Right));
        assert!(!input.keyboard.down(Key::Q));
        assert!(!input.focused);
    }
}
