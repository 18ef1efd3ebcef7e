/// Represents a single acquired surface frame.
///
/// Held by the backend from the first pass of a frame until `commit`. Holding
/// the surface texture prevents acquisition of subsequent frames.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
