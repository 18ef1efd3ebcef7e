//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! The runtime translates platform events into `InputEvent`s.

mod keyboard;
pub(crate) mod platform;
mod state;
mod types;

pub use keyboard::{KeyInfo, Keyboard};
pub use state::InputState;
pub use types::{ButtonState, InputEvent, Key, Modifiers, MouseButton, WheelDelta};
