//! flip engine crate.
//!
//! Immediate-mode 3D drawing over a small id-based GPU interface, with the
//! window runtime, input, camera and timing pieces an application needs.

pub mod camera;
pub mod core;
pub mod device;
pub mod gfx;
pub mod imdraw;
pub mod input;
pub mod loader;
pub mod logging;
pub mod profile;
pub mod render;
pub mod time;
pub mod window;
