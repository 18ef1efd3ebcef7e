use std::f32::consts::{FRAC_PI_2, TAU};

use glam::{Vec2, Vec3};

use crate::input::{ButtonState, InputEvent, Modifiers, MouseButton};
use crate::time::Time;

use super::{Camera, CameraView};

const MIN_DISTANCE: f32 = 1.0;
const MAX_DISTANCE: f32 = 100.0;
const MIN_LATITUDE: f32 = -1.5;
const MAX_LATITUDE: f32 = 1.5;

const ORBIT_FACTOR: f32 = 0.01;
const PAN_FACTOR: f32 = 0.002;
const MOVE_FACTOR: f32 = 0.002;
const ZOOM_FACTOR: f32 = 0.5;

/// Mouse driven camera orbiting `center`.
///
/// - left drag: orbit
/// - shift + left drag: pan in the view plane
/// - ctrl + left drag: move on the horizontal plane
/// - wheel: zoom
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    view: CameraView,
    distance: f32,
    latitude: f32,
    longitude: f32,

    dragging: bool,
    last_pointer: Option<Vec2>,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        let mut camera = Self {
            view: CameraView { fov: FRAC_PI_2, center: Vec3::ZERO, eye: Vec3::ZERO },
            distance: 20.0,
            latitude: 0.2,
            longitude: 0.0,
            dragging: false,
            last_pointer: None,
        };
        camera.update_eye();
        camera
    }
}

impl OrbitCamera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn latitude(&self) -> f32 {
        self.latitude
    }

    pub fn longitude(&self) -> f32 {
        self.longitude
    }

    pub fn set_fov(&mut self, fov: f32) {
        self.view.fov = fov;
    }

    pub fn orbit(&mut self, delta: Vec2) {
        self.longitude = (self.longitude - delta.x).rem_euclid(TAU);
        self.latitude = (self.latitude + delta.y).clamp(MIN_LATITUDE, MAX_LATITUDE);
        self.update_eye();
    }

    pub fn pan(&mut self, delta: Vec2) {
        let (sln, cln) = self.longitude.sin_cos();
        let (sla, cla) = self.latitude.sin_cos();
        let left = Vec3::new(-cln, 0.0, sln);
        let up = Vec3::new(-sla * sln, cla, -sla * cln);

        self.view.center += (left * delta.x + up * delta.y) * self.distance;
        self.update_eye();
    }

    /// Moves the center on the horizontal plane.
    pub fn move_horizontal(&mut self, delta: Vec2) {
        let (sln, cln) = self.longitude.sin_cos();
        let left = Vec3::new(-cln, 0.0, sln);
        let forward = Vec3::new(-sln, 0.0, -cln);

        self.view.center += (left * delta.x + forward * delta.y) * self.distance;
        self.update_eye();
    }

    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance + delta).clamp(MIN_DISTANCE, MAX_DISTANCE);
        self.update_eye();
    }

    fn update_eye(&mut self) {
        let (sln, cln) = self.longitude.sin_cos();
        let (sla, cla) = self.latitude.sin_cos();
        let center_to_eye = Vec3::new(cla * sln, sla, cla * cln);
        self.view.eye = self.view.center + center_to_eye * self.distance;
    }

    fn drag(&mut self, delta: Vec2, modifiers: Modifiers) {
        if modifiers.ctrl {
            self.move_horizontal(delta * MOVE_FACTOR);
        } else if modifiers.shift {
            self.pan(delta * PAN_FACTOR);
        } else {
            self.orbit(delta * ORBIT_FACTOR);
        }
    }
}

impl Camera for OrbitCamera {
    fn update(&mut self, _time: &Time) {
        self.update_eye();
    }

    fn event(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::PointerButton { button: MouseButton::Left, state, x, y, .. } => {
                self.dragging = *state == ButtonState::Pressed;
                self.last_pointer = Some(Vec2::new(*x, *y));
                true
            }
            InputEvent::PointerMoved { x, y, modifiers } => {
                let pos = Vec2::new(*x, *y);
                let last = self.last_pointer.replace(pos);
                match last {
                    Some(last) if self.dragging => {
                        self.drag(pos - last, *modifiers);
                        true
                    }
                    _ => false,
                }
            }
            InputEvent::Wheel { delta, .. } => {
                self.zoom(-delta.lines() * ZOOM_FACTOR);
                true
            }
            InputEvent::PointerLeft => {
                self.last_pointer = None;
                false
            }
            InputEvent::Focused(false) => {
                self.dragging = false;
                false
            }
            _ => false,
        }
    }

    fn camera_view(&self) -> &CameraView {
        &self.view
    }
}
