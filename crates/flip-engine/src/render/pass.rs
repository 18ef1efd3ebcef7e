use std::ops::{Deref, DerefMut};

use crate::camera::CameraView;

use super::{PassToken, Renderer};

/// Scoped default pass: opened on construction, ended and committed on drop.
///
/// Derefs to the renderer so draws can be issued through the guard.
pub struct DefaultPass<'a> {
    renderer: &'a mut dyn Renderer,
}

impl<'a> DefaultPass<'a> {
    pub fn new(renderer: &'a mut dyn Renderer, view: &CameraView) -> Self {
        renderer.begin_default_pass(PassToken::new(), view);
        Self { renderer }
    }
}

impl<'a> Deref for DefaultPass<'a> {
    type Target = dyn Renderer + 'a;

    fn deref(&self) -> &Self::Target {
        &*self.renderer
    }
}

impl DerefMut for DefaultPass<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.renderer
    }
}

impl Drop for DefaultPass<'_> {
    fn drop(&mut self) {
        self.renderer.end_default_pass(PassToken::new());
    }
}
