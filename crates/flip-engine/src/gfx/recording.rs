//! Recording `Gfx` double for unit tests.
//!
//! Hands out sequential ids, tracks buffer capacity and per-frame append cursors
//! the same way the wgpu backend does, and records every call in order.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::{
    Bindings, BufferDesc, BufferId, Gfx, ImageDesc, ImageId, PassAction, PipelineDesc, PipelineId,
    SamplerDesc, SamplerId, ShaderDesc, ShaderId,
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    MakeBuffer { id: BufferId, size: u64 },
    MakeImage(ImageId),
    MakeSampler(SamplerId),
    MakeShader(ShaderId),
    MakePipeline(PipelineId),
    DestroyBuffer(BufferId),
    DestroyImage(ImageId),
    DestroySampler(SamplerId),
    DestroyShader(ShaderId),
    DestroyPipeline(PipelineId),
    Append { buffer: BufferId, offset: u64, data: Vec<u8> },
    BeginPass,
    ApplyPipeline(PipelineId),
    ApplyBindings(Bindings),
    ApplyUniforms(Vec<u8>),
    Draw { base: u32, count: u32, instances: u32 },
    EndPass,
    Commit,
}

struct BufferState {
    capacity: u64,
    cursor: u64,
    frame: u64,
}

#[derive(Default)]
struct Inner {
    next_id: u32,
    frame: u64,
    fail_next: bool,
    calls: Vec<Call>,
    buffers: HashMap<BufferId, BufferState>,
    pipelines: HashMap<PipelineId, PipelineDesc>,
}

impl Inner {
    fn next(&mut self) -> Option<u32> {
        if std::mem::take(&mut self.fail_next) {
            return None;
        }
        self.next_id += 1;
        Some(self.next_id)
    }
}

#[derive(Default)]
pub(crate) struct RecordingGfx {
    inner: RefCell<Inner>,
}

impl RecordingGfx {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Makes the next `make_*` call return the invalid sentinel.
    pub(crate) fn fail_next_creation(&self) {
        self.inner.borrow_mut().fail_next = true;
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.inner.borrow().calls.clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.inner.borrow_mut().calls.clear();
    }

    pub(crate) fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.inner.borrow().calls.iter().filter(|c| pred(c)).count()
    }

    pub(crate) fn pipeline_desc(&self, id: PipelineId) -> Option<PipelineDesc> {
        self.inner.borrow().pipelines.get(&id).cloned()
    }

    pub(crate) fn buffer_capacity(&self, id: BufferId) -> Option<u64> {
        self.inner.borrow().buffers.get(&id).map(|b| b.capacity)
    }

    pub(crate) fn live_buffers(&self) -> usize {
        self.inner.borrow().buffers.len()
    }

    pub(crate) fn live_pipelines(&self) -> usize {
        self.inner.borrow().pipelines.len()
    }

    fn push(&self, call: Call) {
        self.inner.borrow_mut().calls.push(call);
    }
}

impl Gfx for RecordingGfx {
    fn make_buffer(&self, desc: &BufferDesc) -> BufferId {
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        let Some(raw) = inner.next() else { return BufferId::INVALID };
        let id = BufferId(raw);
        let frame = inner.frame;
        inner.buffers.insert(id, BufferState { capacity: desc.size, cursor: 0, frame });
        inner.calls.push(Call::MakeBuffer { id, size: desc.size });
        id
    }

    fn make_image(&self, _desc: &ImageDesc<'_>) -> ImageId {
        let mut inner = self.inner.borrow_mut();
        let Some(raw) = inner.next() else { return ImageId::INVALID };
        inner.calls.push(Call::MakeImage(ImageId(raw)));
        ImageId(raw)
    }

    fn make_sampler(&self, _desc: &SamplerDesc) -> SamplerId {
        let mut inner = self.inner.borrow_mut();
        let Some(raw) = inner.next() else { return SamplerId::INVALID };
        inner.calls.push(Call::MakeSampler(SamplerId(raw)));
        SamplerId(raw)
    }

    fn make_shader(&self, _desc: &ShaderDesc<'_>) -> ShaderId {
        let mut inner = self.inner.borrow_mut();
        let Some(raw) = inner.next() else { return ShaderId::INVALID };
        inner.calls.push(Call::MakeShader(ShaderId(raw)));
        ShaderId(raw)
    }

    fn make_pipeline(&self, desc: &PipelineDesc) -> PipelineId {
        let mut inner = self.inner.borrow_mut();
        let Some(raw) = inner.next() else { return PipelineId::INVALID };
        let id = PipelineId(raw);
        inner.pipelines.insert(id, desc.clone());
        inner.calls.push(Call::MakePipeline(id));
        id
    }

    fn destroy_buffer(&self, id: BufferId) {
        let mut inner = self.inner.borrow_mut();
        inner.buffers.remove(&id);
        inner.calls.push(Call::DestroyBuffer(id));
    }

    fn destroy_image(&self, id: ImageId) {
        self.push(Call::DestroyImage(id));
    }

    fn destroy_sampler(&self, id: SamplerId) {
        self.push(Call::DestroySampler(id));
    }

    fn destroy_shader(&self, id: ShaderId) {
        self.push(Call::DestroyShader(id));
    }

    fn destroy_pipeline(&self, id: PipelineId) {
        let mut inner = self.inner.borrow_mut();
        inner.pipelines.remove(&id);
        inner.calls.push(Call::DestroyPipeline(id));
    }

    fn append_buffer(&self, id: BufferId, data: &[u8]) -> u64 {
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        let frame = inner.frame;
        let buffer = inner.buffers.get_mut(&id).expect("append to unknown buffer");
        if buffer.frame != frame {
            buffer.frame = frame;
            buffer.cursor = 0;
        }
        let offset = buffer.cursor;
        assert!(
            offset + data.len() as u64 <= buffer.capacity,
            "append overflow: {} + {} > {}",
            offset,
            data.len(),
            buffer.capacity
        );
        buffer.cursor = (offset + data.len() as u64 + 3) & !3;
        inner.calls.push(Call::Append { buffer: id, offset, data: data.to_vec() });
        offset
    }

    fn buffer_will_overflow(&self, id: BufferId, len: u64) -> bool {
        let inner = self.inner.borrow();
        match inner.buffers.get(&id) {
            Some(b) => {
                let cursor = if b.frame == inner.frame { b.cursor } else { 0 };
                cursor + len > b.capacity
            }
            None => true,
        }
    }

    fn frame_index(&self) -> u64 {
        self.inner.borrow().frame
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        (1280, 720)
    }

    fn begin_pass(&self, _action: &PassAction) {
        self.push(Call::BeginPass);
    }

    fn apply_pipeline(&self, id: PipelineId) {
        self.push(Call::ApplyPipeline(id));
    }

    fn apply_bindings(&self, bindings: &Bindings) {
        self.push(Call::ApplyBindings(*bindings));
    }

    fn apply_uniforms(&self, data: &[u8]) {
        self.push(Call::ApplyUniforms(data.to_vec()));
    }

    fn draw(&self, base_element: u32, num_elements: u32, num_instances: u32) {
        self.push(Call::Draw { base: base_element, count: num_elements, instances: num_instances });
    }

    fn end_pass(&self) {
        self.push(Call::EndPass);
    }

    fn commit(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.frame += 1;
        inner.calls.push(Call::Commit);
    }
}
