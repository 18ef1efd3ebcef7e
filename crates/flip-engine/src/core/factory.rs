use crate::camera::{Camera, OrbitCamera};
use crate::gfx::{GfxError, GfxRef};
use crate::render::{Renderer, RendererImpl};

/// Builds the renderer used by the runtime.
pub fn make_renderer(gfx: GfxRef, clear_color: [f32; 4]) -> Result<Box<dyn Renderer>, GfxError> {
    Ok(Box::new(RendererImpl::new(gfx, clear_color)?))
}

/// Builds the camera used by the runtime.
pub fn make_camera() -> Box<dyn Camera> {
    Box::new(OrbitCamera::new())
}
