use std::fmt;

use super::{
    BufferDesc, BufferId, Gfx, GfxError, GfxRef, ImageDesc, ImageId, PipelineDesc, PipelineId,
    SamplerDesc, SamplerId, ShaderDesc, ShaderId,
};

/// Id type that knows how to destroy the resource it names.
pub trait GfxId: Copy + Eq + fmt::Debug {
    const NONE: Self;
    const KIND: &'static str;

    fn destroy(self, gfx: &dyn Gfx);
}

macro_rules! impl_gfx_id {
    ($id:ty, $kind:literal, $destroy:ident) => {
        impl GfxId for $id {
            const NONE: Self = <$id>::INVALID;
            const KIND: &'static str = $kind;

            #[inline]
            fn destroy(self, gfx: &dyn Gfx) {
                gfx.$destroy(self);
            }
        }
    };
}

impl_gfx_id!(BufferId, "buffer", destroy_buffer);
impl_gfx_id!(ImageId, "image", destroy_image);
impl_gfx_id!(SamplerId, "sampler", destroy_sampler);
impl_gfx_id!(ShaderId, "shader", destroy_shader);
impl_gfx_id!(PipelineId, "pipeline", destroy_pipeline);

/// Owning handle to one GPU resource.
///
/// Dropping a valid handle destroys the resource exactly once. Handles are
/// move-only; `std::mem::take` moves the id out and leaves an invalid handle
/// behind. `release` gives the raw id back without destroying it.
pub struct Resource<I: GfxId> {
    id: I,
    gfx: Option<GfxRef>,
}

pub type Buffer = Resource<BufferId>;
pub type Image = Resource<ImageId>;
pub type Sampler = Resource<SamplerId>;
pub type Shader = Resource<ShaderId>;
pub type Pipeline = Resource<PipelineId>;

impl<I: GfxId> Resource<I> {
    /// Takes ownership of `id`. An invalid id produces an invalid handle.
    pub fn new(gfx: GfxRef, id: I) -> Self {
        Self { id, gfx: Some(gfx) }
    }

    #[inline]
    pub fn id(&self) -> I {
        self.id
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.id != I::NONE
    }

    /// Hands back the raw id; this handle becomes invalid and will not destroy it.
    #[must_use = "a released id is no longer destroyed automatically"]
    pub fn release(&mut self) -> I {
        std::mem::replace(&mut self.id, I::NONE)
    }

    /// Destroys the owned resource now and leaves this handle invalid.
    pub fn reset(&mut self) {
        drop(std::mem::take(self));
    }
}

impl<I: GfxId> Default for Resource<I> {
    fn default() -> Self {
        Self { id: I::NONE, gfx: None }
    }
}

impl<I: GfxId> Drop for Resource<I> {
    fn drop(&mut self) {
        if self.id == I::NONE {
            return;
        }
        if let Some(gfx) = self.gfx.as_deref() {
            self.id.destroy(gfx);
        }
    }
}

impl<I: GfxId> fmt::Debug for Resource<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Resource").field(&self.id).finish()
    }
}

fn checked<I: GfxId>(gfx: &GfxRef, id: I, label: &str) -> Result<Resource<I>, GfxError> {
    if id == I::NONE {
        return Err(GfxError::creation(I::KIND, label));
    }
    Ok(Resource::new(gfx.clone(), id))
}

pub fn make_buffer(gfx: &GfxRef, desc: &BufferDesc) -> Result<Buffer, GfxError> {
    checked(gfx, gfx.make_buffer(desc), desc.label)
}

pub fn make_image(gfx: &GfxRef, desc: &ImageDesc<'_>) -> Result<Image, GfxError> {
    checked(gfx, gfx.make_image(desc), desc.label)
}

pub fn make_sampler(gfx: &GfxRef, desc: &SamplerDesc) -> Result<Sampler, GfxError> {
    checked(gfx, gfx.make_sampler(desc), desc.label)
}

pub fn make_shader(gfx: &GfxRef, desc: &ShaderDesc<'_>) -> Result<Shader, GfxError> {
    checked(gfx, gfx.make_shader(desc), desc.label)
}

pub fn make_pipeline(gfx: &GfxRef, desc: &PipelineDesc) -> Result<Pipeline, GfxError> {
    checked(gfx, gfx.make_pipeline(desc), desc.label)
}
