//! GPU abstraction layer.
//!
//! `Gfx` is a small id-based command interface: resources are created from
//! descriptors and referenced by opaque ids, draws are issued inside a pass by
//! applying a pipeline, bindings and uniforms. Higher layers (`imdraw`,
//! `render`) only talk to this trait, so they run unchanged against the wgpu
//! backend, the headless null backend, or a recording double in tests.
//!
//! Frame model:
//! - `begin_pass` / `end_pass` bracket draw recording
//! - `commit` ends the frame; buffer append cursors restart on the next one

mod dynamic_buffer;
mod error;
mod null;
mod resource;
mod types;
mod wgpu_backend;

#[cfg(test)]
pub(crate) mod recording;

use std::rc::Rc;

pub use dynamic_buffer::{BufferBinding, DynamicBuffer};
pub use error::GfxError;
pub use null::NullGfx;
pub use resource::{
    make_buffer, make_image, make_pipeline, make_sampler, make_shader, Buffer, GfxId, Image,
    Pipeline, Resource, Sampler, Shader,
};
pub use types::{
    BlendFactor, BlendState, Bindings, BufferDesc, BufferId, BufferUsage, CompareFunc, CullMode,
    DepthState, FaceWinding, Filter, ImageDesc, ImageId, PassAction, PipelineDesc, PipelineId,
    PrimitiveType, SamplerDesc, SamplerId, ShaderDesc, ShaderId, VertexFormat, VertexLayout, Wrap,
};
pub use wgpu_backend::WgpuGfx;

/// Shared handle to the active backend.
///
/// Rendering is single-threaded; every owner of GPU resources keeps one of these
/// so the backend outlives all resources created from it.
pub type GfxRef = Rc<dyn Gfx>;

/// Id-based GPU command interface.
///
/// Creation calls return the `INVALID` sentinel on failure. Destroy calls on an
/// unknown or invalid id are ignored.
pub trait Gfx {
    fn make_buffer(&self, desc: &BufferDesc) -> BufferId;
    fn make_image(&self, desc: &ImageDesc<'_>) -> ImageId;
    fn make_sampler(&self, desc: &SamplerDesc) -> SamplerId;
    fn make_shader(&self, desc: &ShaderDesc<'_>) -> ShaderId;
    fn make_pipeline(&self, desc: &PipelineDesc) -> PipelineId;

    fn destroy_buffer(&self, id: BufferId);
    fn destroy_image(&self, id: ImageId);
    fn destroy_sampler(&self, id: SamplerId);
    fn destroy_shader(&self, id: ShaderId);
    fn destroy_pipeline(&self, id: PipelineId);

    /// Writes `data` at the buffer's current append cursor and returns the byte
    /// offset it was placed at. The cursor advances by `data.len()` rounded up
    /// to 4 bytes and restarts at zero on the first append of a new frame.
    fn append_buffer(&self, id: BufferId, data: &[u8]) -> u64;

    /// Returns true if appending `len` bytes this frame would exceed capacity.
    fn buffer_will_overflow(&self, id: BufferId, len: u64) -> bool;

    /// Monotonic frame counter, incremented by `commit`.
    fn frame_index(&self) -> u64;

    /// Current framebuffer size in physical pixels.
    fn framebuffer_size(&self) -> (u32, u32);

    fn begin_pass(&self, action: &PassAction);
    fn apply_pipeline(&self, id: PipelineId);
    fn apply_bindings(&self, bindings: &Bindings);
    fn apply_uniforms(&self, data: &[u8]);
    fn draw(&self, base_element: u32, num_elements: u32, num_instances: u32);
    fn end_pass(&self);
    fn commit(&self);
}
