use glam::Mat4;

use crate::gfx::{
    make_image, make_sampler, make_shader, Bindings, DynamicBuffer, Filter, GfxError, GfxRef,
    Image, ImageDesc, ImageId, PipelineId, Sampler, SamplerDesc, SamplerId, Shader, ShaderDesc,
    Wrap,
};

use super::vertex::ImUniforms;
use super::{ImVertex, PipelineCache, RenderMode};

const SHADER_SRC: &str = include_str!("shaders/imdraw.wgsl");

/// Batches immediate-mode vertices into one draw per session.
///
/// Owns the pipeline cache, the per-frame vertex stream and the fallback
/// texture/sampler. `begin` resolves the pipeline for a mode; `end` uploads the
/// session's vertices and issues exactly one draw, even for zero vertices.
pub struct ImDrawer {
    cache: PipelineCache,
    vertices: DynamicBuffer,
    white: Image,
    linear: Sampler,
    _shader: Shader,

    gfx: GfxRef,
    pipeline: PipelineId,
    mvp: Mat4,

    /// Vertex storage handed to sessions and returned on `end`.
    scratch: Vec<ImVertex>,
}

impl ImDrawer {
    pub fn new(gfx: GfxRef) -> Result<Self, GfxError> {
        let shader = make_shader(
            &gfx,
            &ShaderDesc {
                source: SHADER_SRC,
                vertex_entry: "vs_main",
                fragment_entry: "fs_main",
                uniform_size: size_of::<ImUniforms>() as u64,
                label: "imdraw shader",
            },
        )?;

        let white = make_image(
            &gfx,
            &ImageDesc { width: 1, height: 1, pixels: &[255u8; 4], label: "imdraw white" },
        )?;

        let linear = make_sampler(
            &gfx,
            &SamplerDesc {
                min_filter: Filter::Linear,
                mag_filter: Filter::Linear,
                wrap_u: Wrap::Repeat,
                wrap_v: Wrap::Repeat,
                label: "imdraw linear",
            },
        )?;

        Ok(Self {
            cache: PipelineCache::new(gfx.clone(), shader.id()),
            vertices: DynamicBuffer::new(gfx.clone(), "imdraw vertices"),
            white,
            linear,
            _shader: shader,
            gfx,
            pipeline: PipelineId::INVALID,
            mvp: Mat4::IDENTITY,
            scratch: Vec::new(),
        })
    }

    /// Opens a session: resolves the pipeline for `mode` and stores the
    /// combined transform. Returns an empty vertex list to fill.
    pub fn begin(
        &mut self,
        view_proj: Mat4,
        transform: Mat4,
        mode: RenderMode,
    ) -> Result<Vec<ImVertex>, GfxError> {
        self.pipeline = self.cache.resolve(mode)?;
        self.mvp = view_proj * transform;

        let mut vertices = std::mem::take(&mut self.scratch);
        vertices.clear();
        Ok(vertices)
    }

    /// Closes a session and issues its draw.
    ///
    /// Invalid `image`/`sampler` ids fall back to the built-in white texture and
    /// linear sampler.
    pub fn end(
        &mut self,
        vertices: Vec<ImVertex>,
        image: ImageId,
        sampler: SamplerId,
    ) -> Result<(), GfxError> {
        let result = self.flush(&vertices, image, sampler);
        self.scratch = vertices;
        result
    }

    fn flush(
        &mut self,
        vertices: &[ImVertex],
        image: ImageId,
        sampler: SamplerId,
    ) -> Result<(), GfxError> {
        let binding = self.vertices.append(bytemuck::cast_slice(vertices))?;

        self.gfx.apply_pipeline(self.pipeline);
        self.gfx.apply_bindings(&Bindings {
            vertex_buffer: binding.buffer,
            vertex_buffer_offset: binding.offset,
            image: if image.is_valid() { image } else { self.white.id() },
            sampler: if sampler.is_valid() { sampler } else { self.linear.id() },
        });
        let uniforms = ImUniforms { mvp: self.mvp.to_cols_array_2d() };
        self.gfx.apply_uniforms(bytemuck::bytes_of(&uniforms));
        self.gfx.draw(0, vertices.len() as u32, 1);
        Ok(())
    }

    pub fn white_image(&self) -> ImageId {
        self.white.id()
    }

    pub fn linear_sampler(&self) -> SamplerId {
        self.linear.id()
    }

    pub fn pipeline_count(&self) -> usize {
        self.cache.len()
    }
}
