use std::path::Path;

use anyhow::Result;
use glam::{Mat4, Vec2, Vec3};

use flip_engine::core::{AppCtx, Application, LoopControl};
use flip_engine::device::GpuInit;
use flip_engine::gfx::{CullMode, ImageId, SamplerId};
use flip_engine::imdraw::{ImDraw, RenderMode};
use flip_engine::input::{InputState, Key};
use flip_engine::loader::{AsyncImage, LoadState};
use flip_engine::logging::{init_logging, LoggingConfig};
use flip_engine::profile::{Profile, ProfileRecord, RECORD_LEN};
use flip_engine::render::{Color, Renderer, Shape};
use flip_engine::time::Time;
use flip_engine::window::{Runtime, RuntimeConfig};

const TEXTURE_PATH: &str = "media/texture.png";

#[derive(Default)]
struct Demo {
    texture: Option<AsyncImage>,
    texture_state: Option<LoadState>,
    spin: f32,
    shapes_profile: ProfileRecord,
    displayed: u64,
}

impl Demo {
    fn texture_id(&self) -> ImageId {
        self.texture.as_ref().map_or(ImageId::INVALID, AsyncImage::id)
    }

    fn draw_quads(&self, renderer: &mut dyn Renderer) -> Result<()> {
        // Outline in a line strip, pen color set once.
        let at = Mat4::from_translation(Vec3::new(-4.0, 0.01, 0.0));
        let mut outline = ImDraw::new(renderer, at, RenderMode::line_strip())?;
        outline
            .color(Color::GREEN)
            .vertex(0.0, 0.0, 0.0)
            .vertex(2.0, 0.0, 0.0)
            .vertex(2.0, 0.0, 2.0)
            .vertex(0.0, 0.0, 2.0)
            .vertex(0.0, 0.0, 0.0);
        outline.end()?;

        let translucent = RenderMode::default().with_blending(true).with_cull_mode(CullMode::None);
        let at = Mat4::from_translation(Vec3::new(-1.0, 1.0, -3.0));
        let mut quad = ImDraw::new(renderer, at, translucent)?;
        quad.color(Color::YELLOW.with_alpha(0.5));
        for p in [[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 0.0], [2.0, 2.0], [0.0, 2.0]] {
            quad.vertex(p[0], p[1], 0.0);
        }
        quad.end()?;

        // Falls back to plain white until the texture is ready.
        let at = Mat4::from_translation(Vec3::new(2.0, 1.0, -3.0));
        let mut textured = ImDraw::new(renderer, at, RenderMode::default())?;
        textured.texture(self.texture_id(), SamplerId::INVALID);
        let corners = [
            (Vec3::new(0.0, 0.0, 0.0), Vec2::new(0.0, 1.0)),
            (Vec3::new(2.0, 0.0, 0.0), Vec2::new(1.0, 1.0)),
            (Vec3::new(2.0, 2.0, 0.0), Vec2::new(1.0, 0.0)),
            (Vec3::new(0.0, 2.0, 0.0), Vec2::new(0.0, 0.0)),
        ];
        for i in [0, 1, 2, 0, 2, 3] {
            let (position, uv) = corners[i];
            textured.vertex_uv(position, uv);
        }
        textured.end()?;
        Ok(())
    }

    fn draw_shapes(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        let _profile = Profile::new(&mut self.shapes_profile);
        let spin = Mat4::from_rotation_y(self.spin);

        for (i, shape) in Shape::ALL.into_iter().enumerate() {
            let x = (i as f32 - 2.0) * 3.0;
            let transform = Mat4::from_translation(Vec3::new(x, 0.0, 4.0)) * spin;
            let color = [Color::RED, Color::CYAN, Color::MAGENTA, Color::BLUE, Color::GREY][i % 5];
            renderer.draw_shape(transform, shape, color)?;
        }

        let ring: Vec<Mat4> = (0..8)
            .map(|i| {
                let angle = i as f32 * std::f32::consts::TAU / 8.0 + self.spin;
                Mat4::from_rotation_y(angle)
                    * Mat4::from_translation(Vec3::new(8.0, 0.5, 0.0))
                    * Mat4::from_scale(Vec3::splat(0.5))
            })
            .collect();
        renderer.draw_shapes(&ring, Shape::Cube, Color::YELLOW.with_alpha(0.6))?;
        Ok(())
    }
}

impl Application for Demo {
    fn initialize(&mut self, ctx: &mut AppCtx<'_>) -> Result<()> {
        let (w, h) = ctx.framebuffer_size();
        log::info!("demo starting at {w}x{h}{}", if ctx.is_headless() { " (headless)" } else { "" });

        if Path::new(TEXTURE_PATH).exists() {
            self.texture = Some(ctx.loader().load_image(TEXTURE_PATH));
        } else {
            log::warn!("`{TEXTURE_PATH}` not found, textured quad stays white");
        }
        Ok(())
    }

    fn update(&mut self, time: &Time, input: &InputState) -> LoopControl {
        if input.keyboard.released(Key::Escape) {
            return LoopControl::Break;
        }

        let state = self.texture.as_ref().map(AsyncImage::state);
        if state != self.texture_state {
            log::info!("texture: {state:?}");
            self.texture_state = state;
        }

        self.spin = (self.spin + time.dt * 0.5) % std::f32::consts::TAU;
        LoopControl::Continue
    }

    fn display(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        renderer.draw_grid(Mat4::IDENTITY, 20)?;
        renderer.draw_axis(Mat4::from_translation(Vec3::new(0.0, 0.001, 0.0)))?;
        self.draw_quads(renderer)?;
        self.draw_shapes(renderer)?;

        self.displayed += 1;
        if self.displayed % RECORD_LEN as u64 == 0 {
            let stats = self.shapes_profile.stats();
            log::info!("shapes: {:.3} ms mean, {:.3} ms max", stats.mean, stats.max);
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    if std::env::args().skip(1).any(|arg| arg == "--headless") {
        return Runtime::run_headless(Demo::default());
    }

    let config = RuntimeConfig { title: "flip demo".to_string(), ..RuntimeConfig::default() };
    Runtime::run(config, GpuInit::default(), Demo::default())
}
