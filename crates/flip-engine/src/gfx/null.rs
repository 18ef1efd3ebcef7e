//! Backend without a device, used when running headless.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::{
    Bindings, BufferDesc, BufferId, Gfx, ImageDesc, ImageId, PassAction, PipelineDesc, PipelineId,
    SamplerDesc, SamplerId, ShaderDesc, ShaderId,
};

struct Cursor {
    capacity: u64,
    offset: u64,
    frame: u64,
}

#[derive(Default)]
struct State {
    next_id: u32,
    frame: u64,
    buffers: HashMap<BufferId, Cursor>,
}

/// Hands out ids and keeps buffer append cursors, but owns no GPU objects
/// and draws nothing. There is no framebuffer, so its size is zero.
#[derive(Default)]
pub struct NullGfx {
    state: RefCell<State>,
}

impl NullGfx {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    fn next(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        state.next_id
    }
}

impl Gfx for NullGfx {
    fn make_buffer(&self, desc: &BufferDesc) -> BufferId {
        let id = BufferId(self.next());
        let mut state = self.state.borrow_mut();
        let frame = state.frame;
        state.buffers.insert(id, Cursor { capacity: desc.size, offset: 0, frame });
        id
    }

    fn make_image(&self, _desc: &ImageDesc<'_>) -> ImageId {
        ImageId(self.next())
    }

    fn make_sampler(&self, _desc: &SamplerDesc) -> SamplerId {
        SamplerId(self.next())
    }

    fn make_shader(&self, _desc: &ShaderDesc<'_>) -> ShaderId {
        ShaderId(self.next())
    }

    fn make_pipeline(&self, _desc: &PipelineDesc) -> PipelineId {
        PipelineId(self.next())
    }

    fn destroy_buffer(&self, id: BufferId) {
        self.state.borrow_mut().buffers.remove(&id);
    }

    fn destroy_image(&self, _id: ImageId) {}

    fn destroy_sampler(&self, _id: SamplerId) {}

    fn destroy_shader(&self, _id: ShaderId) {}

    fn destroy_pipeline(&self, _id: PipelineId) {}

    fn append_buffer(&self, id: BufferId, data: &[u8]) -> u64 {
        let mut state = self.state.borrow_mut();
        let frame = state.frame;
        let Some(cursor) = state.buffers.get_mut(&id) else {
            log::warn!("gfx: append to unknown buffer {id:?}");
            return 0;
        };
        if cursor.frame != frame {
            cursor.frame = frame;
            cursor.offset = 0;
        }
        let offset = cursor.offset;
        cursor.offset = (offset + data.len() as u64 + 3) & !3;
        offset
    }

    fn buffer_will_overflow(&self, id: BufferId, len: u64) -> bool {
        let state = self.state.borrow();
        state.buffers.get(&id).is_none_or(|c| {
            let offset = if c.frame == state.frame { c.offset } else { 0 };
            offset + len > c.capacity
        })
    }

    fn frame_index(&self) -> u64 {
        self.state.borrow().frame
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        (0, 0)
    }

    fn begin_pass(&self, _action: &PassAction) {}

    fn apply_pipeline(&self, _id: PipelineId) {}

    fn apply_bindings(&self, _bindings: &Bindings) {}

    fn apply_uniforms(&self, _data: &[u8]) {}

    fn draw(&self, _base_element: u32, _num_elements: u32, _num_instances: u32) {}

    fn end_pass(&self) {}

    fn commit(&self) {
        self.state.borrow_mut().frame += 1;
    }
}
