//! Cameras produce the `CameraView` a frame is rendered from.

mod orbit;

use glam::Vec3;

use crate::input::InputEvent;
use crate::time::Time;

pub use orbit::OrbitCamera;

/// View parameters handed to the renderer when opening the default pass.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraView {
    /// Vertical field of view, in radians.
    pub fov: f32,
    pub center: Vec3,
    pub eye: Vec3,
}

pub trait Camera {
    fn update(&mut self, _time: &Time) {}

    /// Returns true when the event was consumed.
    fn event(&mut self, _event: &InputEvent) -> bool {
        false
    }

    fn camera_view(&self) -> &CameraView;
}
