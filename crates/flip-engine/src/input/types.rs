/// Keyboard key identifier.
///
/// Keys without a variant are reported as `Unknown` with the platform key code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Backspace,
    Space,
    Delete,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    Shift,
    Control,
    Alt,
    Meta,

    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    F1, F2, F3, F4, F5, F6,
    F7, F8, F9, F10, F11, F12,

    Unknown(u32),
}

/// Press/release transition of a key or mouse button.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ButtonState {
    Pressed,
    Released,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Wheel delta as reported by the platform.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum WheelDelta {
    Lines(f32),
    /// High precision scrolling, in logical pixels.
    Pixels(f32),
}

impl WheelDelta {
    /// Pixel deltas are converted assuming 20 px per line.
    pub fn lines(self) -> f32 {
        match self {
            WheelDelta::Lines(y) => y,
            WheelDelta::Pixels(y) => y / 20.0,
        }
    }
}

/// Platform-agnostic input event. Positions are in logical pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key {
        key: Key,
        state: ButtonState,
        modifiers: Modifiers,
        /// Generated by key auto-repeat.
        repeat: bool,
    },
    PointerMoved {
        x: f32,
        y: f32,
        modifiers: Modifiers,
    },
    PointerButton {
        button: MouseButton,
        state: ButtonState,
        x: f32,
        y: f32,
        modifiers: Modifiers,
    },
    /// Vertical wheel movement; positive scrolls away from the user.
    Wheel {
        delta: WheelDelta,
        modifiers: Modifiers,
    },
    ModifiersChanged(Modifiers),
    PointerLeft,
    Focused(bool),
}
