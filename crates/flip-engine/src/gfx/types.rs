//! Resource ids and descriptors shared by every `Gfx` implementation.

use std::fmt;

macro_rules! gfx_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
        pub struct $name(pub u32);

        impl $name {
            /// Sentinel returned by failed creations and held by released handles.
            pub const INVALID: Self = Self(0);

            #[inline]
            pub const fn is_valid(self) -> bool {
                self.0 != 0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", stringify!($name), self.0)
                } else {
                    write!(f, "{}(invalid)", stringify!($name))
                }
            }
        }
    };
}

gfx_id!(
    /// Opaque GPU buffer id.
    BufferId
);
gfx_id!(
    /// Opaque GPU image (texture) id.
    ImageId
);
gfx_id!(
    /// Opaque sampler id.
    SamplerId
);
gfx_id!(
    /// Opaque shader id.
    ShaderId
);
gfx_id!(
    /// Opaque pipeline id.
    PipelineId
);

/// How a buffer's contents are expected to change.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum BufferUsage {
    /// Written once at creation.
    Immutable,
    /// Rewritten every frame through appends.
    #[default]
    Stream,
}

#[derive(Debug, Clone, Default)]
pub struct BufferDesc {
    /// Capacity in bytes.
    pub size: u64,
    pub usage: BufferUsage,
    pub label: &'static str,
}

/// Straight RGBA8 pixel data, row-major, tightly packed.
#[derive(Debug, Clone)]
pub struct ImageDesc<'a> {
    pub width: u32,
    pub height: u32,
    pub pixels: &'a [u8],
    pub label: &'a str,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum Filter {
    #[default]
    Nearest,
    Linear,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum Wrap {
    #[default]
    Repeat,
    ClampToEdge,
    MirroredRepeat,
}

#[derive(Debug, Clone, Default)]
pub struct SamplerDesc {
    pub min_filter: Filter,
    pub mag_filter: Filter,
    pub wrap_u: Wrap,
    pub wrap_v: Wrap,
    pub label: &'static str,
}

/// WGSL shader with one uniform block (group 0) and one texture/sampler pair (group 1).
#[derive(Debug, Clone)]
pub struct ShaderDesc<'a> {
    pub source: &'a str,
    pub vertex_entry: &'a str,
    pub fragment_entry: &'a str,
    /// Size in bytes of the uniform block bound at group 0.
    pub uniform_size: u64,
    pub label: &'static str,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum PrimitiveType {
    Points,
    Lines,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum CompareFunc {
    Never,
    Less,
    Equal,
    #[default]
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum CullMode {
    None,
    Front,
    #[default]
    Back,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum FaceWinding {
    #[default]
    Ccw,
    Cw,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcAlpha,
    OneMinusSrcAlpha,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BlendState {
    pub src_factor: BlendFactor,
    pub dst_factor: BlendFactor,
}

impl BlendState {
    /// Standard non-premultiplied alpha blending.
    pub const ALPHA: Self = Self {
        src_factor: BlendFactor::SrcAlpha,
        dst_factor: BlendFactor::OneMinusSrcAlpha,
    };
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct DepthState {
    pub write_enabled: bool,
    pub compare: CompareFunc,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum VertexFormat {
    Float2,
    Float3,
    Float4,
}

impl VertexFormat {
    pub const fn size(self) -> u64 {
        match self {
            VertexFormat::Float2 => 8,
            VertexFormat::Float3 => 12,
            VertexFormat::Float4 => 16,
        }
    }
}

/// Single interleaved vertex buffer layout; attribute locations follow slice order.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct VertexLayout {
    pub stride: u64,
    pub attributes: Vec<VertexFormat>,
}

#[derive(Debug, Clone)]
pub struct PipelineDesc {
    pub shader: ShaderId,
    pub layout: VertexLayout,
    pub primitive: PrimitiveType,
    pub cull_mode: CullMode,
    pub face_winding: FaceWinding,
    pub depth: DepthState,
    pub blend: Option<BlendState>,
    pub label: &'static str,
}

/// Vertex buffer + texture/sampler bound for the next draw.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct Bindings {
    pub vertex_buffer: BufferId,
    pub vertex_buffer_offset: u64,
    pub image: ImageId,
    pub sampler: SamplerId,
}

/// Pass begin behavior.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PassAction {
    /// `Some` clears color (and depth) to the given RGBA; `None` loads previous contents.
    pub clear_color: Option<[f32; 4]>,
}

impl Default for PassAction {
    fn default() -> Self {
        Self { clear_color: Some([0.1, 0.1, 0.1, 1.0]) }
    }
}
