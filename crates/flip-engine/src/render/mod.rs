//! Renderer capability interface.
//!
//! Applications draw through `dyn Renderer`: shapes, axes, grids and
//! immediate-mode sessions (`imdraw::ImDraw`). The pass and session hooks take
//! tokens only this crate can construct, so they can be implemented elsewhere
//! but are only ever driven by [`DefaultPass`] and `ImDraw`.

mod color;
mod pass;
mod renderer_impl;
mod shapes;

use glam::Mat4;

use crate::camera::CameraView;
use crate::gfx::{GfxError, ImageId, SamplerId};
use crate::imdraw::{ImVertex, RenderMode};
use crate::input::InputEvent;

pub use color::Color;
pub use pass::DefaultPass;
pub use renderer_impl::RendererImpl;
pub use shapes::{Shape, ShapeMeshes};

/// Grants access to the default pass hooks.
pub struct PassToken(());

impl PassToken {
    pub(crate) fn new() -> Self {
        Self(())
    }
}

/// Grants access to the immediate-draw session hooks.
pub struct ImDrawToken(());

impl ImDrawToken {
    pub(crate) fn new() -> Self {
        Self(())
    }
}

pub trait Renderer {
    /// View-projection of the current default pass.
    fn view_proj(&self) -> Mat4;

    /// Returns true when the event was consumed.
    fn event(&mut self, _event: &InputEvent) -> bool {
        false
    }

    fn draw_shapes(&mut self, transforms: &[Mat4], shape: Shape, color: Color) -> Result<(), GfxError>;

    fn draw_shape(&mut self, transform: Mat4, shape: Shape, color: Color) -> Result<(), GfxError> {
        self.draw_shapes(&[transform], shape, color)
    }

    /// Unit X/Y/Z segments in red, green and blue.
    fn draw_axes(&mut self, transforms: &[Mat4]) -> Result<(), GfxError>;

    fn draw_axis(&mut self, transform: Mat4) -> Result<(), GfxError> {
        self.draw_axes(&[transform])
    }

    /// `cells × cells` unit grid on the XZ plane, centered on the origin.
    fn draw_grids(&mut self, transforms: &[Mat4], cells: u32) -> Result<(), GfxError>;

    fn draw_grid(&mut self, transform: Mat4, cells: u32) -> Result<(), GfxError> {
        self.draw_grids(&[transform], cells)
    }

    fn begin_default_pass(&mut self, token: PassToken, view: &CameraView);
    fn end_default_pass(&mut self, token: PassToken);

    fn begin_im_draw(
        &mut self,
        token: ImDrawToken,
        transform: Mat4,
        mode: RenderMode,
    ) -> Result<Vec<ImVertex>, GfxError>;

    fn end_im_draw(
        &mut self,
        token: ImDrawToken,
        vertices: Vec<ImVertex>,
        image: ImageId,
        sampler: SamplerId,
    ) -> Result<(), GfxError>;
}
