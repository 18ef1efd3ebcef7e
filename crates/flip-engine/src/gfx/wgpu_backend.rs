use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::num::NonZeroU64;
use std::ops::Range;
use std::sync::Arc;

use winit::dpi::PhysicalSize;

use crate::device::{Gpu, GpuFrame, SurfaceErrorAction};

use super::{
    BlendFactor, Bindings, BufferDesc, BufferId, CompareFunc, CullMode, FaceWinding, Filter, Gfx,
    ImageDesc, ImageId, PassAction, PipelineDesc, PipelineId, PrimitiveType, SamplerDesc,
    SamplerId, ShaderDesc, ShaderId, VertexFormat, Wrap,
};

/// Bytes reserved per `apply_uniforms` call; also the bound uniform range.
const UNIFORM_SLOT: u64 = 256;

/// wgpu implementation of [`Gfx`].
///
/// Shader and pipeline validation failures are reported by the device's error
/// handler; the creation call then returns the invalid id.
///
/// Resources live in id-keyed tables. Draw commands are recorded per pass and
/// encoded into the frame's command encoder at `commit`, after the frame's
/// uniforms have been uploaded in one write. Recorded commands hold their own
/// references, so destroying a resource mid-frame does not affect draws that
/// already used it.
pub struct WgpuGfx {
    // Declared before `gpu`: every resource is released before the device.
    state: RefCell<State>,
    shared: SharedLayouts,
    gpu: RefCell<Gpu>,
    lost: Cell<bool>,
}

struct SharedLayouts {
    uniforms: wgpu::BindGroupLayout,
    textures: wgpu::BindGroupLayout,
    pipeline: wgpu::PipelineLayout,
    uniform_stride: u64,
}

struct BufferEntry {
    buffer: Arc<wgpu::Buffer>,
    capacity: u64,
    cursor: u64,
    frame: u64,
}

struct ImageEntry {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

struct ShaderEntry {
    module: wgpu::ShaderModule,
    vertex_entry: String,
    fragment_entry: String,
}

enum PassCmd {
    Pipeline(Arc<wgpu::RenderPipeline>),
    VertexBuffer { buffer: Arc<wgpu::Buffer>, offset: u64 },
    Textures(Arc<wgpu::BindGroup>),
    Uniforms { offset: u32 },
    Draw { vertices: Range<u32>, instances: Range<u32> },
}

struct RecordedPass {
    clear: Option<[f32; 4]>,
    cmds: Vec<PassCmd>,
}

#[derive(Default)]
struct UniformBuffer {
    buffer: Option<wgpu::Buffer>,
    bind_group: Option<wgpu::BindGroup>,
    capacity: u64,
}

#[derive(Default)]
struct State {
    next_id: u32,
    frame_index: u64,

    buffers: HashMap<BufferId, BufferEntry>,
    images: HashMap<ImageId, ImageEntry>,
    samplers: HashMap<SamplerId, wgpu::Sampler>,
    shaders: HashMap<ShaderId, ShaderEntry>,
    pipelines: HashMap<PipelineId, Arc<wgpu::RenderPipeline>>,
    texture_groups: HashMap<(ImageId, SamplerId), Arc<wgpu::BindGroup>>,

    uniforms: UniformBuffer,
    uniform_staging: Vec<u8>,

    passes: Vec<RecordedPass>,
    current: Option<RecordedPass>,
    frame: Option<GpuFrame>,
    frame_unavailable: bool,
}

impl State {
    fn next_id(&mut self) -> u32 {
        self.next_id = self.next_id.wrapping_add(1).max(1);
        self.next_id
    }

    fn record(&mut self, cmd: PassCmd) {
        match self.current.as_mut() {
            Some(pass) => pass.cmds.push(cmd),
            None => log::warn!("gfx: draw state applied outside of a pass; ignored"),
        }
    }
}

impl WgpuGfx {
    pub fn new(gpu: Gpu) -> Self {
        let shared = SharedLayouts::new(&gpu);
        Self {
            state: RefCell::new(State::default()),
            shared,
            gpu: RefCell::new(gpu),
            lost: Cell::new(false),
        }
    }

    /// Reconfigures the surface and depth target.
    pub fn resize(&self, size: PhysicalSize<u32>) {
        self.gpu.borrow_mut().resize(size);
    }

    /// True after a fatal surface error; the host should shut down.
    pub fn is_lost(&self) -> bool {
        self.lost.get()
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.gpu.borrow().adapter_info()
    }

    fn acquire_frame(&self, state: &mut State) {
        if state.frame.is_some() || state.frame_unavailable {
            return;
        }

        let size = self.gpu.borrow().size();
        if size.width == 0 || size.height == 0 {
            state.frame_unavailable = true;
            return;
        }

        let acquired = self.gpu.borrow().begin_frame();
        match acquired {
            Ok(frame) => state.frame = Some(frame),
            Err(err) => {
                let action = self.gpu.borrow_mut().handle_surface_error(err);
                if action == SurfaceErrorAction::Fatal {
                    log::error!("gfx: fatal surface error; rendering stopped");
                    self.lost.set(true);
                } else {
                    log::debug!("gfx: frame skipped ({action:?})");
                }
                state.frame_unavailable = true;
            }
        }
    }

    fn ensure_uniform_capacity(&self, device: &wgpu::Device, uniforms: &mut UniformBuffer, len: u64) {
        if uniforms.buffer.is_some() && len <= uniforms.capacity {
            return;
        }

        let capacity = len.next_power_of_two().max(self.shared.uniform_stride * 64);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("flip uniform ring"),
            size: capacity,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("flip uniform bind group"),
            layout: &self.shared.uniforms,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(UNIFORM_SLOT),
                }),
            }],
        });

        log::debug!("gfx: uniform ring grown to {capacity} bytes");
        uniforms.buffer = Some(buffer);
        uniforms.bind_group = Some(bind_group);
        uniforms.capacity = capacity;
    }

    fn texture_group(
        &self,
        state: &mut State,
        image: ImageId,
        sampler: SamplerId,
    ) -> Option<Arc<wgpu::BindGroup>> {
        if let Some(group) = state.texture_groups.get(&(image, sampler)) {
            return Some(group.clone());
        }

        let view = &state.images.get(&image)?.view;
        let sampler_obj = state.samplers.get(&sampler)?;
        let group = Arc::new(self.gpu.borrow().device().create_bind_group(
            &wgpu::BindGroupDescriptor {
                label: Some("flip texture bind group"),
                layout: &self.shared.textures,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(sampler_obj),
                    },
                ],
            },
        ));
        state.texture_groups.insert((image, sampler), group.clone());
        Some(group)
    }
}

impl SharedLayouts {
    fn new(gpu: &Gpu) -> Self {
        let device = gpu.device();

        let uniforms = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("flip uniforms bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let textures = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("flip textures bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("flip pipeline layout"),
            bind_group_layouts: &[&uniforms, &textures],
            immediate_size: 0,
        });

        let align = u64::from(device.limits().min_uniform_buffer_offset_alignment);
        Self {
            uniforms,
            textures,
            pipeline,
            uniform_stride: align.max(UNIFORM_SLOT),
        }
    }
}

impl Gfx for WgpuGfx {
    fn make_buffer(&self, desc: &BufferDesc) -> BufferId {
        // Physical size is padded to the copy alignment; zero-capacity buffers stay bindable.
        let padded = desc.size.max(4).next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT);
        let buffer = self.gpu.borrow().device().create_buffer(&wgpu::BufferDescriptor {
            label: Some(desc.label),
            size: padded,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut state = self.state.borrow_mut();
        let id = BufferId(state.next_id());
        let frame = state.frame_index;
        state.buffers.insert(
            id,
            BufferEntry { buffer: Arc::new(buffer), capacity: desc.size, cursor: 0, frame },
        );
        id
    }

    fn make_image(&self, desc: &ImageDesc<'_>) -> ImageId {
        let gpu = self.gpu.borrow();
        let max = gpu.device().limits().max_texture_dimension_2d;
        let expected = desc.width as usize * desc.height as usize * 4;
        if desc.width == 0 || desc.height == 0 || desc.width > max || desc.height > max {
            log::warn!("gfx: image `{}` has unsupported size {}x{}", desc.label, desc.width, desc.height);
            return ImageId::INVALID;
        }
        if desc.pixels.len() != expected {
            log::warn!(
                "gfx: image `{}` expects {} bytes of RGBA8, got {}",
                desc.label,
                expected,
                desc.pixels.len()
            );
            return ImageId::INVALID;
        }

        let size = wgpu::Extent3d {
            width: desc.width,
            height: desc.height,
            depth_or_array_layers: 1,
        };
        let texture = gpu.device().create_texture(&wgpu::TextureDescriptor {
            label: Some(desc.label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        gpu.queue().write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            desc.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * desc.width),
                rows_per_image: Some(desc.height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut state = self.state.borrow_mut();
        let id = ImageId(state.next_id());
        state.images.insert(id, ImageEntry { _texture: texture, view });
        id
    }

    fn make_sampler(&self, desc: &SamplerDesc) -> SamplerId {
        let sampler = self.gpu.borrow().device().create_sampler(&wgpu::SamplerDescriptor {
            label: Some(desc.label),
            address_mode_u: to_wgpu_wrap(desc.wrap_u),
            address_mode_v: to_wgpu_wrap(desc.wrap_v),
            mag_filter: to_wgpu_filter(desc.mag_filter),
            min_filter: to_wgpu_filter(desc.min_filter),
            ..Default::default()
        });

        let mut state = self.state.borrow_mut();
        let id = SamplerId(state.next_id());
        state.samplers.insert(id, sampler);
        id
    }

    fn make_shader(&self, desc: &ShaderDesc<'_>) -> ShaderId {
        if desc.uniform_size == 0 || desc.uniform_size > UNIFORM_SLOT {
            log::error!(
                "gfx: shader `{}` uniform block of {} bytes does not fit a {}-byte slot",
                desc.label,
                desc.uniform_size,
                UNIFORM_SLOT
            );
            return ShaderId::INVALID;
        }

        let gpu = self.gpu.borrow();
        let mark = gpu.validation_errors().checkpoint();
        let module = gpu.device().create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(desc.label),
            source: wgpu::ShaderSource::Wgsl(desc.source.into()),
        });
        if gpu.validation_errors().failed_since(mark) {
            log::error!("gfx: shader `{}` failed validation", desc.label);
            return ShaderId::INVALID;
        }

        let mut state = self.state.borrow_mut();
        let id = ShaderId(state.next_id());
        state.shaders.insert(
            id,
            ShaderEntry {
                module,
                vertex_entry: desc.vertex_entry.to_owned(),
                fragment_entry: desc.fragment_entry.to_owned(),
            },
        );
        id
    }

    fn make_pipeline(&self, desc: &PipelineDesc) -> PipelineId {
        let gpu = self.gpu.borrow();
        let mut state = self.state.borrow_mut();

        let Some(shader) = state.shaders.get(&desc.shader) else {
            log::error!("gfx: pipeline `{}` references unknown {:?}", desc.label, desc.shader);
            return PipelineId::INVALID;
        };

        let mut offset = 0;
        let attributes: Vec<wgpu::VertexAttribute> = desc
            .layout
            .attributes
            .iter()
            .enumerate()
            .map(|(location, format)| {
                let attr = wgpu::VertexAttribute {
                    format: to_wgpu_vertex_format(*format),
                    offset,
                    shader_location: location as u32,
                };
                offset += format.size();
                attr
            })
            .collect();
        if offset > desc.layout.stride {
            log::error!(
                "gfx: pipeline `{}` attributes span {} bytes but stride is {}",
                desc.label,
                offset,
                desc.layout.stride
            );
            return PipelineId::INVALID;
        }

        let blend = desc.blend.map(|b| {
            let component = wgpu::BlendComponent {
                src_factor: to_wgpu_blend_factor(b.src_factor),
                dst_factor: to_wgpu_blend_factor(b.dst_factor),
                operation: wgpu::BlendOperation::Add,
            };
            wgpu::BlendState { color: component, alpha: component }
        });

        let mark = gpu.validation_errors().checkpoint();
        let pipeline = gpu.device().create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(desc.label),
            layout: Some(&self.shared.pipeline),

            vertex: wgpu::VertexState {
                module: &shader.module,
                entry_point: Some(shader.vertex_entry.as_str()),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: desc.layout.stride,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &attributes,
                }],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader.module,
                entry_point: Some(shader.fragment_entry.as_str()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.surface_format(),
                    blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: to_wgpu_topology(desc.primitive),
                strip_index_format: None,
                front_face: match desc.face_winding {
                    FaceWinding::Ccw => wgpu::FrontFace::Ccw,
                    FaceWinding::Cw => wgpu::FrontFace::Cw,
                },
                cull_mode: match desc.cull_mode {
                    CullMode::None => None,
                    CullMode::Front => Some(wgpu::Face::Front),
                    CullMode::Back => Some(wgpu::Face::Back),
                },
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: Some(wgpu::DepthStencilState {
                format: gpu.depth_format(),
                depth_write_enabled: desc.depth.write_enabled,
                depth_compare: to_wgpu_compare(desc.depth.compare),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });
        if gpu.validation_errors().failed_since(mark) {
            log::error!("gfx: pipeline `{}` failed validation", desc.label);
            return PipelineId::INVALID;
        }

        let id = PipelineId(state.next_id());
        state.pipelines.insert(id, Arc::new(pipeline));
        id
    }

    fn destroy_buffer(&self, id: BufferId) {
        self.state.borrow_mut().buffers.remove(&id);
    }

    fn destroy_image(&self, id: ImageId) {
        let mut state = self.state.borrow_mut();
        state.images.remove(&id);
        state.texture_groups.retain(|(image, _), _| *image != id);
    }

    fn destroy_sampler(&self, id: SamplerId) {
        let mut state = self.state.borrow_mut();
        state.samplers.remove(&id);
        state.texture_groups.retain(|(_, sampler), _| *sampler != id);
    }

    fn destroy_shader(&self, id: ShaderId) {
        self.state.borrow_mut().shaders.remove(&id);
    }

    fn destroy_pipeline(&self, id: PipelineId) {
        self.state.borrow_mut().pipelines.remove(&id);
    }

    fn append_buffer(&self, id: BufferId, data: &[u8]) -> u64 {
        let mut state = self.state.borrow_mut();
        let frame = state.frame_index;
        let Some(entry) = state.buffers.get_mut(&id) else {
            log::error!("gfx: append to unknown {id:?}");
            return 0;
        };

        if entry.frame != frame {
            entry.frame = frame;
            entry.cursor = 0;
        }

        let offset = entry.cursor;
        let len = data.len() as u64;
        if offset + len > entry.capacity {
            log::error!(
                "gfx: append of {} bytes overflows {:?} ({} of {} used)",
                len,
                id,
                offset,
                entry.capacity
            );
            return offset;
        }

        if len > 0 {
            let queue_gpu = self.gpu.borrow();
            if len % wgpu::COPY_BUFFER_ALIGNMENT == 0 {
                queue_gpu.queue().write_buffer(&entry.buffer, offset, data);
            } else {
                let mut padded = data.to_vec();
                padded.resize(len.next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT) as usize, 0);
                queue_gpu.queue().write_buffer(&entry.buffer, offset, &padded);
            }
        }

        entry.cursor = (offset + len).next_multiple_of(4);
        offset
    }

    fn buffer_will_overflow(&self, id: BufferId, len: u64) -> bool {
        let state = self.state.borrow();
        match state.buffers.get(&id) {
            Some(entry) => {
                let cursor = if entry.frame == state.frame_index { entry.cursor } else { 0 };
                cursor + len > entry.capacity
            }
            None => true,
        }
    }

    fn frame_index(&self) -> u64 {
        self.state.borrow().frame_index
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        let size = self.gpu.borrow().size();
        (size.width, size.height)
    }

    fn begin_pass(&self, action: &PassAction) {
        let mut state = self.state.borrow_mut();
        if state.current.is_some() {
            log::warn!("gfx: begin_pass while a pass is open; previous pass closed");
            let open = state.current.take();
            state.passes.extend(open);
        }
        self.acquire_frame(&mut state);
        state.current = Some(RecordedPass { clear: action.clear_color, cmds: Vec::new() });
    }

    fn apply_pipeline(&self, id: PipelineId) {
        let mut state = self.state.borrow_mut();
        match state.pipelines.get(&id).cloned() {
            Some(pipeline) => state.record(PassCmd::Pipeline(pipeline)),
            None => log::warn!("gfx: apply of unknown {id:?}"),
        }
    }

    fn apply_bindings(&self, bindings: &Bindings) {
        let mut state = self.state.borrow_mut();

        match state.buffers.get(&bindings.vertex_buffer) {
            Some(entry) => {
                let buffer = entry.buffer.clone();
                state.record(PassCmd::VertexBuffer { buffer, offset: bindings.vertex_buffer_offset });
            }
            None => log::warn!("gfx: bind of unknown {:?}", bindings.vertex_buffer),
        }

        match self.texture_group(&mut state, bindings.image, bindings.sampler) {
            Some(group) => state.record(PassCmd::Textures(group)),
            None => log::warn!(
                "gfx: bind of unknown {:?}/{:?}",
                bindings.image,
                bindings.sampler
            ),
        }
    }

    fn apply_uniforms(&self, data: &[u8]) {
        let mut state = self.state.borrow_mut();
        if data.len() as u64 > UNIFORM_SLOT {
            log::error!("gfx: uniform block of {} bytes exceeds slot size", data.len());
            return;
        }

        let offset = state.uniform_staging.len();
        let stride = self.shared.uniform_stride as usize;
        state.uniform_staging.resize(offset + stride, 0);
        state.uniform_staging[offset..offset + data.len()].copy_from_slice(data);
        state.record(PassCmd::Uniforms { offset: offset as u32 });
    }

    fn draw(&self, base_element: u32, num_elements: u32, num_instances: u32) {
        self.state.borrow_mut().record(PassCmd::Draw {
            vertices: base_element..base_element + num_elements,
            instances: 0..num_instances,
        });
    }

    fn end_pass(&self) {
        let mut state = self.state.borrow_mut();
        match state.current.take() {
            Some(pass) => state.passes.push(pass),
            None => log::warn!("gfx: end_pass without begin_pass"),
        }
    }

    fn commit(&self) {
        let mut state = self.state.borrow_mut();
        if let Some(open) = state.current.take() {
            log::warn!("gfx: commit with an open pass; closing it");
            state.passes.push(open);
        }

        let passes = std::mem::take(&mut state.passes);
        if let Some(mut frame) = state.frame.take() {
            let gpu = self.gpu.borrow();

            let staging_len = state.uniform_staging.len() as u64;
            self.ensure_uniform_capacity(gpu.device(), &mut state.uniforms, staging_len);
            if staging_len > 0
                && let Some(buffer) = state.uniforms.buffer.as_ref()
            {
                gpu.queue().write_buffer(buffer, 0, &state.uniform_staging);
            }

            if let Some(uniform_group) = state.uniforms.bind_group.as_ref() {
                for (i, pass) in passes.iter().enumerate() {
                    encode_pass(&mut frame, gpu.depth_view(), uniform_group, pass, i == 0);
                }
            }

            gpu.submit(frame);
        }

        state.uniform_staging.clear();
        state.frame_unavailable = false;
        state.frame_index += 1;
    }
}

fn encode_pass(
    frame: &mut GpuFrame,
    depth_view: &wgpu::TextureView,
    uniform_group: &wgpu::BindGroup,
    pass: &RecordedPass,
    first_in_frame: bool,
) {
    let color_load = match pass.clear {
        Some([r, g, b, a]) => wgpu::LoadOp::Clear(wgpu::Color {
            r: f64::from(r),
            g: f64::from(g),
            b: f64::from(b),
            a: f64::from(a),
        }),
        None => wgpu::LoadOp::Load,
    };
    // Depth has no stored previous frame; the first pass always starts cleared.
    let depth_load = if pass.clear.is_some() || first_in_frame {
        wgpu::LoadOp::Clear(1.0)
    } else {
        wgpu::LoadOp::Load
    };

    let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("flip pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: &frame.view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: color_load,
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: depth_view,
            depth_ops: Some(wgpu::Operations {
                load: depth_load,
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    });

    // Draws only go out once pipeline, vertex buffer, textures and uniforms are all bound.
    let mut has_pipeline = false;
    let mut has_vertices = false;
    let mut has_textures = false;
    let mut has_uniforms = false;

    for cmd in &pass.cmds {
        match cmd {
            PassCmd::Pipeline(pipeline) => {
                rpass.set_pipeline(pipeline);
                has_pipeline = true;
            }
            PassCmd::VertexBuffer { buffer, offset } => {
                // Empty slices are not bindable; a zero-length append binds nothing.
                has_vertices = *offset < buffer.size();
                if has_vertices {
                    rpass.set_vertex_buffer(0, buffer.slice(*offset..));
                }
            }
            PassCmd::Textures(group) => {
                rpass.set_bind_group(1, group.as_ref(), &[]);
                has_textures = true;
            }
            PassCmd::Uniforms { offset } => {
                rpass.set_bind_group(0, uniform_group, &[*offset]);
                has_uniforms = true;
            }
            PassCmd::Draw { vertices, instances } => {
                if vertices.is_empty() || instances.is_empty() {
                    continue;
                }
                if has_pipeline && has_vertices && has_textures && has_uniforms {
                    rpass.draw(vertices.clone(), instances.clone());
                } else {
                    log::warn!("gfx: draw with incomplete state skipped");
                }
            }
        }
    }
}

fn to_wgpu_topology(p: PrimitiveType) -> wgpu::PrimitiveTopology {
    match p {
        PrimitiveType::Points => wgpu::PrimitiveTopology::PointList,
        PrimitiveType::Lines => wgpu::PrimitiveTopology::LineList,
        PrimitiveType::LineStrip => wgpu::PrimitiveTopology::LineStrip,
        PrimitiveType::Triangles => wgpu::PrimitiveTopology::TriangleList,
        PrimitiveType::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
    }
}

fn to_wgpu_compare(c: CompareFunc) -> wgpu::CompareFunction {
    match c {
        CompareFunc::Never => wgpu::CompareFunction::Never,
        CompareFunc::Less => wgpu::CompareFunction::Less,
        CompareFunc::Equal => wgpu::CompareFunction::Equal,
        CompareFunc::LessEqual => wgpu::CompareFunction::LessEqual,
        CompareFunc::Greater => wgpu::CompareFunction::Greater,
        CompareFunc::NotEqual => wgpu::CompareFunction::NotEqual,
        CompareFunc::GreaterEqual => wgpu::CompareFunction::GreaterEqual,
        CompareFunc::Always => wgpu::CompareFunction::Always,
    }
}

fn to_wgpu_blend_factor(f: BlendFactor) -> wgpu::BlendFactor {
    match f {
        BlendFactor::Zero => wgpu::BlendFactor::Zero,
        BlendFactor::One => wgpu::BlendFactor::One,
        BlendFactor::SrcAlpha => wgpu::BlendFactor::SrcAlpha,
        BlendFactor::OneMinusSrcAlpha => wgpu::BlendFactor::OneMinusSrcAlpha,
    }
}

fn to_wgpu_vertex_format(f: VertexFormat) -> wgpu::VertexFormat {
    match f {
        VertexFormat::Float2 => wgpu::VertexFormat::Float32x2,
        VertexFormat::Float3 => wgpu::VertexFormat::Float32x3,
        VertexFormat::Float4 => wgpu::VertexFormat::Float32x4,
    }
}

fn to_wgpu_filter(f: Filter) -> wgpu::FilterMode {
    match f {
        Filter::Nearest => wgpu::FilterMode::Nearest,
        Filter::Linear => wgpu::FilterMode::Linear,
    }
}

fn to_wgpu_wrap(w: Wrap) -> wgpu::AddressMode {
    match w {
        Wrap::Repeat => wgpu::AddressMode::Repeat,
        Wrap::ClampToEdge => wgpu::AddressMode::ClampToEdge,
        Wrap::MirroredRepeat => wgpu::AddressMode::MirrorRepeat,
    }
}
