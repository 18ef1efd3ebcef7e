//! Window and event loop.
//!
//! Owns the `winit` event loop and the single application window, builds the
//! wgpu backend once the window exists and drives a `core::Host` from
//! window events. Headless runs skip the window and drive the host for a
//! fixed number of frames.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig, HEADLESS_FRAMES};
