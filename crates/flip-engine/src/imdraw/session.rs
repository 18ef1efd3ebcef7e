use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::gfx::{GfxError, ImageId, SamplerId};
use crate::render::{Color, ImDrawToken, Renderer};

use super::{ImVertex, RenderMode};

/// Scoped immediate-draw session.
///
/// Opening a session resolves the pipeline for its mode. Vertices are
/// accumulated in submission order using the current pen color and uv, and the
/// whole batch is drawn in one call when the session ends. Dropping the
/// session ends it; call [`ImDraw::end`] to observe the result instead.
///
/// The session holds the renderer mutably, so sessions cannot nest.
pub struct ImDraw<'a> {
    renderer: &'a mut dyn Renderer,
    vertices: Vec<ImVertex>,
    pen: ImVertex,
    image: ImageId,
    sampler: SamplerId,
    ended: bool,
}

impl<'a> ImDraw<'a> {
    pub fn new(
        renderer: &'a mut dyn Renderer,
        transform: Mat4,
        mode: RenderMode,
    ) -> Result<Self, GfxError> {
        let vertices = renderer.begin_im_draw(ImDrawToken::new(), transform, mode)?;
        Ok(Self {
            renderer,
            vertices,
            pen: ImVertex::new(Vec3::ZERO, Vec4::ONE, Vec2::ZERO),
            image: ImageId::INVALID,
            sampler: SamplerId::INVALID,
            ended: false,
        })
    }

    /// Texture and sampler for the whole batch. Invalid ids (for example a
    /// texture still loading) draw with the built-in white texture and linear
    /// sampler instead.
    pub fn texture(&mut self, image: ImageId, sampler: SamplerId) -> &mut Self {
        self.image = image;
        self.sampler = sampler;
        self
    }

    pub fn color(&mut self, color: impl Into<Color>) -> &mut Self {
        self.pen.color = color.into().to_array();
        self
    }

    pub fn rgba(&mut self, r: f32, g: f32, b: f32, a: f32) -> &mut Self {
        self.pen.color = [r, g, b, a];
        self
    }

    pub fn uv(&mut self, u: f32, v: f32) -> &mut Self {
        self.pen.uv = [u, v];
        self
    }

    pub fn uv_v(&mut self, uv: Vec2) -> &mut Self {
        self.pen.uv = uv.to_array();
        self
    }

    pub fn vertex(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.pen.position = [x, y, z];
        self.submit()
    }

    pub fn vertex_v(&mut self, position: Vec3) -> &mut Self {
        self.pen.position = position.to_array();
        self.submit()
    }

    pub fn vertex_color(&mut self, position: Vec3, color: impl Into<Color>) -> &mut Self {
        self.color(color);
        self.vertex_v(position)
    }

    pub fn vertex_uv(&mut self, position: Vec3, uv: Vec2) -> &mut Self {
        self.uv_v(uv);
        self.vertex_v(position)
    }

    pub fn vertex_uv_color(&mut self, position: Vec3, uv: Vec2, color: impl Into<Color>) -> &mut Self {
        self.uv_v(uv);
        self.color(color);
        self.vertex_v(position)
    }

    /// Submits prebuilt vertices as-is; the pen is left unchanged.
    pub fn extend(&mut self, vertices: &[ImVertex]) -> &mut Self {
        self.vertices.extend_from_slice(vertices);
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Ends the session, issuing its draw.
    pub fn end(mut self) -> Result<(), GfxError> {
        self.finish()
    }

    fn submit(&mut self) -> &mut Self {
        self.vertices.push(self.pen);
        self
    }

    fn finish(&mut self) -> Result<(), GfxError> {
        self.ended = true;
        let vertices = std::mem::take(&mut self.vertices);
        self.renderer
            .end_im_draw(ImDrawToken::new(), vertices, self.image, self.sampler)
    }
}

impl Drop for ImDraw<'_> {
    fn drop(&mut self) {
        if !self.ended
            && let Err(err) = self.finish()
        {
            log::error!("imdraw: session end failed: {err}");
        }
    }
}
