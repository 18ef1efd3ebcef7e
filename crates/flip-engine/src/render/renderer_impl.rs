use glam::{Mat4, Vec3};

use crate::camera::CameraView;
use crate::gfx::{GfxError, GfxRef, ImageId, PassAction, SamplerId};
use crate::imdraw::{ImDraw, ImDrawer, ImVertex, RenderMode};

use super::{Color, ImDrawToken, PassToken, Renderer, Shape, ShapeMeshes};

const Z_NEAR: f32 = 0.01;
const Z_FAR: f32 = 100.0;

/// Renderer over a [`Gfx`](crate::gfx::Gfx) backend. Every primitive it draws
/// goes through immediate-draw sessions.
pub struct RendererImpl {
    drawer: ImDrawer,
    shapes: ShapeMeshes,
    gfx: GfxRef,
    pass: PassAction,
    view_proj: Mat4,
}

impl RendererImpl {
    pub fn new(gfx: GfxRef, clear_color: [f32; 4]) -> Result<Self, GfxError> {
        Ok(Self {
            drawer: ImDrawer::new(gfx.clone())?,
            shapes: ShapeMeshes::new(),
            gfx,
            pass: PassAction { clear_color: Some(clear_color) },
            view_proj: Mat4::IDENTITY,
        })
    }

    pub fn drawer(&self) -> &ImDrawer {
        &self.drawer
    }
}

/// Perspective (right handed, depth 0..1) times look-at with +Y up.
pub(crate) fn view_projection(view: &CameraView, framebuffer: (u32, u32)) -> Mat4 {
    let (w, h) = framebuffer;
    let aspect = if h == 0 { 1.0 } else { w as f32 / h as f32 };
    let proj = Mat4::perspective_rh(view.fov, aspect, Z_NEAR, Z_FAR);
    let look = Mat4::look_at_rh(view.eye, view.center, Vec3::Y);
    proj * look
}

fn grid_lines(cells: u32) -> Vec<Vec3> {
    let half = cells as f32 * 0.5;
    let mut points = Vec::with_capacity((cells as usize + 1) * 4);
    for i in 0..=cells {
        let t = i as f32 - half;
        points.extend([Vec3::new(t, 0.0, -half), Vec3::new(t, 0.0, half)]);
        points.extend([Vec3::new(-half, 0.0, t), Vec3::new(half, 0.0, t)]);
    }
    points
}

impl Renderer for RendererImpl {
    fn view_proj(&self) -> Mat4 {
        self.view_proj
    }

    fn draw_shapes(&mut self, transforms: &[Mat4], shape: Shape, color: Color) -> Result<(), GfxError> {
        let mode = RenderMode::default().with_blending(color.a < 1.0);
        let vertices = self.shapes.tinted(shape, color);
        for transform in transforms {
            let mut im = ImDraw::new(&mut *self, *transform, mode)?;
            im.extend(&vertices);
            im.end()?;
        }
        Ok(())
    }

    fn draw_axes(&mut self, transforms: &[Mat4]) -> Result<(), GfxError> {
        for transform in transforms {
            let mut im = ImDraw::new(&mut *self, *transform, RenderMode::lines())?;
            for (axis, color) in [(Vec3::X, Color::RED), (Vec3::Y, Color::GREEN), (Vec3::Z, Color::BLUE)] {
                im.color(color);
                im.vertex_v(Vec3::ZERO);
                im.vertex_v(axis);
            }
            im.end()?;
        }
        Ok(())
    }

    fn draw_grids(&mut self, transforms: &[Mat4], cells: u32) -> Result<(), GfxError> {
        let points = grid_lines(cells);
        let mode = RenderMode::lines().with_blending(true);
        for transform in transforms {
            let mut im = ImDraw::new(&mut *self, *transform, mode)?;
            im.color(Color::GREY.with_alpha(0.5));
            for p in &points {
                im.vertex_v(*p);
            }
            im.end()?;
        }
        Ok(())
    }

    fn begin_default_pass(&mut self, _token: PassToken, view: &CameraView) {
        self.view_proj = view_projection(view, self.gfx.framebuffer_size());
        self.gfx.begin_pass(&self.pass);
    }

    fn end_default_pass(&mut self, _token: PassToken) {
        self.gfx.end_pass();
        self.gfx.commit();
    }

    fn begin_im_draw(
        &mut self,
        _token: ImDrawToken,
        transform: Mat4,
        mode: RenderMode,
    ) -> Result<Vec<ImVertex>, GfxError> {
        self.drawer.begin(self.view_proj, transform, mode)
    }

    fn end_im_draw(
        &mut self,
        _token: ImDrawToken,
        vertices: Vec<ImVertex>,
        image: ImageId,
        sampler: SamplerId,
    ) -> Result<(), GfxError> {
        self.drawer.end(vertices, image, sampler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::recording::{Call, RecordingGfx};
    use crate::gfx::Bindings;
    use crate::render::DefaultPass;
    use std::rc::Rc;

    fn setup() -> (Rc<RecordingGfx>, RendererImpl) {
        let rec = RecordingGfx::new();
        let gfx: GfxRef = rec.clone();
        let renderer = RendererImpl::new(gfx, [0.1, 0.1, 0.1, 1.0]).unwrap();
        rec.clear_calls();
        (rec, renderer)
    }

    fn view() -> CameraView {
        CameraView { fov: 1.0, center: Vec3::ZERO, eye: Vec3::new(0.0, 0.0, 5.0) }
    }

    fn draw_counts(rec: &RecordingGfx) -> Vec<u32> {
        rec.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Draw { count, .. } => Some(count),
                _ => None,
            })
            .collect()
    }

    fn appended_vertices(rec: &RecordingGfx) -> Vec<Vec<ImVertex>> {
        rec.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Append { data, .. } => Some(bytemuck::pod_collect_to_vec(&data)),
                _ => None,
            })
            .collect()
    }

    // ── pass ──────────────────────────────────────────────────────────────

    #[test]
    fn default_pass_brackets_draws_and_commits() {
        let (rec, mut renderer) = setup();
        {
            let mut pass = DefaultPass::new(&mut renderer, &view());
            pass.draw_axis(Mat4::IDENTITY).unwrap();
        }

        let calls = rec.calls();
        assert_eq!(calls.first(), Some(&Call::BeginPass));
        assert_eq!(&calls[calls.len() - 2..], &[Call::EndPass, Call::Commit]);
    }

    #[test]
    fn view_projection_maps_center_to_screen_middle() {
        let vp = view_projection(&view(), (1280, 720));
        let clip = vp * Vec3::ZERO.extend(1.0);
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);

        // Zero height must not produce NaNs.
        assert!(!view_projection(&view(), (0, 0)).is_nan());
    }

    // ── immediate sessions ────────────────────────────────────────────────

    #[test]
    fn green_line_strip_scenario() {
        let (rec, mut renderer) = setup();
        let white = renderer.drawer().white_image();
        let linear = renderer.drawer().linear_sampler();
        {
            let mut pass = DefaultPass::new(&mut renderer, &view());
            let mut im = ImDraw::new(&mut *pass, Mat4::IDENTITY, RenderMode::line_strip()).unwrap();
            im.color(Color::GREEN);
            im.vertex(-1.0, -1.0, 0.0);
            im.vertex(-1.0, 1.0, 0.0);
            im.vertex(1.0, 1.0, 0.0);
            im.vertex(1.0, -1.0, 0.0);
            im.vertex(-1.0, -1.0, 0.0);
        }

        assert_eq!(draw_counts(&rec), vec![5]);

        let batches = appended_vertices(&rec);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 5);
        assert!(batches[0].iter().all(|v| v.color == Color::GREEN.to_array()));
        assert_eq!(batches[0][1].position, [-1.0, 1.0, 0.0]);

        let bindings: Vec<Bindings> = rec
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::ApplyBindings(b) => Some(b),
                _ => None,
            })
            .collect();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].image, white);
        assert_eq!(bindings[0].sampler, linear);
    }

    #[test]
    fn pen_state_applies_forward_only() {
        let (rec, mut renderer) = setup();
        {
            let mut im = ImDraw::new(&mut renderer, Mat4::IDENTITY, RenderMode::default()).unwrap();
            im.vertex(0.0, 0.0, 0.0);
            im.color(Color::RED).uv(0.5, 1.0);
            im.vertex(1.0, 0.0, 0.0);
            im.vertex_uv_color(Vec3::Y, glam::Vec2::ZERO, Color::BLUE);
            im.vertex(0.0, 0.0, 1.0);
        }

        let v = &appended_vertices(&rec)[0];
        assert_eq!(v[0].color, Color::WHITE.to_array());
        assert_eq!(v[0].uv, [0.0, 0.0]);
        assert_eq!(v[1].color, Color::RED.to_array());
        assert_eq!(v[1].uv, [0.5, 1.0]);
        assert_eq!(v[2].color, Color::BLUE.to_array());
        // Full-attribute overloads update the pen like the setters do.
        assert_eq!(v[3].color, Color::BLUE.to_array());
        assert_eq!(v[3].uv, [0.0, 0.0]);
    }

    #[test]
    fn session_texture_override_is_bound() {
        let (rec, mut renderer) = setup();
        {
            let mut im = ImDraw::new(&mut renderer, Mat4::IDENTITY, RenderMode::default()).unwrap();
            im.texture(ImageId(77), SamplerId(78));
            im.vertex(0.0, 0.0, 0.0);
        }
        let bound = rec
            .calls()
            .into_iter()
            .find_map(|c| match c {
                Call::ApplyBindings(b) => Some(b),
                _ => None,
            })
            .unwrap();
        assert_eq!((bound.image, bound.sampler), (ImageId(77), SamplerId(78)));
    }

    #[test]
    fn consecutive_sessions_draw_in_order() {
        let (rec, mut renderer) = setup();
        for n in 1..=3 {
            let mut im = ImDraw::new(&mut renderer, Mat4::IDENTITY, RenderMode::lines()).unwrap();
            for _ in 0..n * 2 {
                im.vertex(0.0, 0.0, 0.0);
            }
            im.end().unwrap();
        }
        assert_eq!(draw_counts(&rec), vec![2, 4, 6]);
    }

    #[test]
    fn empty_session_issues_zero_count_draw() {
        let (rec, mut renderer) = setup();
        drop(ImDraw::new(&mut renderer, Mat4::IDENTITY, RenderMode::default()).unwrap());
        assert_eq!(draw_counts(&rec), vec![0]);
    }

    #[test]
    fn session_uses_pass_view_projection() {
        let (rec, mut renderer) = setup();
        let transform = Mat4::from_translation(Vec3::X);
        let expected;
        {
            let mut pass = DefaultPass::new(&mut renderer, &view());
            expected = pass.view_proj() * transform;
            ImDraw::new(&mut *pass, transform, RenderMode::default()).unwrap().end().unwrap();
        }

        let uniforms = rec
            .calls()
            .into_iter()
            .find_map(|c| match c {
                Call::ApplyUniforms(bytes) => Some(bytes),
                _ => None,
            })
            .unwrap();
        let mvp: [[f32; 4]; 4] = bytemuck::pod_read_unaligned(&uniforms);
        assert_eq!(Mat4::from_cols_array_2d(&mvp), expected);
    }

    // ── primitives ────────────────────────────────────────────────────────

    #[test]
    fn axes_are_colored_unit_segments() {
        let (rec, mut renderer) = setup();
        renderer.draw_axes(&[Mat4::IDENTITY, Mat4::from_scale(Vec3::splat(2.0))]).unwrap();

        assert_eq!(draw_counts(&rec), vec![6, 6]);
        let v = &appended_vertices(&rec)[0];
        assert_eq!(v[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(v[1].color, Color::RED.to_array());
        assert_eq!(v[3].position, [0.0, 1.0, 0.0]);
        assert_eq!(v[3].color, Color::GREEN.to_array());
        assert_eq!(v[5].position, [0.0, 0.0, 1.0]);
        assert_eq!(v[5].color, Color::BLUE.to_array());
    }

    #[test]
    fn grid_spans_cells_on_xz_plane() {
        let (rec, mut renderer) = setup();
        renderer.draw_grid(Mat4::IDENTITY, 4).unwrap();

        assert_eq!(draw_counts(&rec), vec![(4 + 1) * 4]);
        let v = &appended_vertices(&rec)[0];
        assert!(v.iter().all(|v| v.position[1] == 0.0));
        assert!(v.iter().all(|v| v.position[0].abs() <= 2.0 && v.position[2].abs() <= 2.0));

        let pipeline = rec
            .calls()
            .into_iter()
            .find_map(|c| match c {
                Call::ApplyPipeline(id) => Some(id),
                _ => None,
            })
            .unwrap();
        assert!(rec.pipeline_desc(pipeline).unwrap().blend.is_some());
    }

    #[test]
    fn shapes_draw_once_per_transform() {
        let (rec, mut renderer) = setup();
        let transforms = [Mat4::IDENTITY, Mat4::from_translation(Vec3::X), Mat4::from_translation(Vec3::Y)];
        renderer.draw_shapes(&transforms, Shape::Cube, Color::YELLOW).unwrap();

        assert_eq!(draw_counts(&rec), vec![36, 36, 36]);
        assert_eq!(rec.count(|c| matches!(c, Call::MakePipeline(_))), 1);
    }
}
