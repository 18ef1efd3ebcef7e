use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3, Vec4};

use crate::gfx::{VertexFormat, VertexLayout};

/// Interleaved immediate-mode vertex: position, straight RGBA color, uv.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ImVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
    pub uv: [f32; 2],
}

impl ImVertex {
    pub fn new(position: Vec3, color: Vec4, uv: Vec2) -> Self {
        Self {
            position: position.to_array(),
            color: color.to_array(),
            uv: uv.to_array(),
        }
    }

    pub fn layout() -> VertexLayout {
        VertexLayout {
            stride: size_of::<ImVertex>() as u64,
            attributes: vec![VertexFormat::Float3, VertexFormat::Float4, VertexFormat::Float2],
        }
    }
}

/// Uniform block of the immediate-draw shader.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct ImUniforms {
    pub mvp: [[f32; 4]; 4],
}
