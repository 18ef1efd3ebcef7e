use super::{make_buffer, Buffer, BufferDesc, BufferId, BufferUsage, GfxError, GfxRef};

/// A buffer region produced by an append: bind `buffer` at `offset`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BufferBinding {
    pub buffer: BufferId,
    pub offset: u64,
}

/// Growable stream buffer shared by all appends of a frame.
///
/// Capacity only grows. When an append would not fit in what is left for the
/// current frame, the buffer is replaced by one sized for everything appended
/// so far this frame plus the new data, so after a few frames it settles at the
/// per-frame peak and stops reallocating.
pub struct DynamicBuffer {
    gfx: GfxRef,
    buffer: Buffer,
    capacity: u64,

    /// Frame the `frame_bytes` counter belongs to.
    frame: u64,
    /// Bytes appended during `frame`, across reallocations, 4-byte aligned.
    frame_bytes: u64,

    label: &'static str,
}

impl DynamicBuffer {
    pub fn new(gfx: GfxRef, label: &'static str) -> Self {
        let frame = gfx.frame_index();
        Self {
            gfx,
            buffer: Buffer::default(),
            capacity: 0,
            frame,
            frame_bytes: 0,
            label,
        }
    }

    /// Current capacity in bytes (0 before the first append).
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn buffer_id(&self) -> BufferId {
        self.buffer.id()
    }

    /// Appends `data` and returns where it landed.
    ///
    /// Zero-length appends are valid and never grow the buffer.
    pub fn append(&mut self, data: &[u8]) -> Result<BufferBinding, GfxError> {
        let frame = self.gfx.frame_index();
        if frame != self.frame {
            self.frame = frame;
            self.frame_bytes = 0;
        }

        let len = data.len() as u64;
        if !self.buffer.is_valid() || self.frame_bytes + len > self.capacity {
            // Sized to the aligned cursor so a following empty append still fits.
            let size = self.frame_bytes + align4(len);
            let buffer = make_buffer(
                &self.gfx,
                &BufferDesc { size, usage: BufferUsage::Stream, label: self.label },
            )?;
            log::debug!(
                "{}: reallocated {} -> {} bytes (frame {})",
                self.label,
                self.capacity,
                size,
                frame
            );
            // Dropping the previous handle destroys the old buffer.
            self.buffer = buffer;
            self.capacity = size;
        }

        debug_assert!(!self.gfx.buffer_will_overflow(self.buffer.id(), len));

        let offset = self.gfx.append_buffer(self.buffer.id(), data);
        self.frame_bytes += align4(len);

        Ok(BufferBinding { buffer: self.buffer.id(), offset })
    }
}

#[inline]
fn align4(n: u64) -> u64 {
    (n + 3) & !3
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::recording::{Call, RecordingGfx};
    use crate::gfx::Gfx;

    fn setup() -> (std::rc::Rc<RecordingGfx>, DynamicBuffer) {
        let rec = RecordingGfx::new();
        let gfx: GfxRef = rec.clone();
        (rec, DynamicBuffer::new(gfx, "test dynamic buffer"))
    }

    fn makes(rec: &RecordingGfx) -> usize {
        rec.count(|c| matches!(c, Call::MakeBuffer { .. }))
    }

    #[test]
    fn first_append_allocates_exact_size() {
        let (rec, mut buf) = setup();
        let b = buf.append(&[1u8; 36]).unwrap();
        assert!(b.buffer.is_valid());
        assert_eq!(b.offset, 0);
        assert_eq!(buf.capacity(), 36);
        assert_eq!(rec.buffer_capacity(b.buffer), Some(36));
    }

    #[test]
    fn appends_in_same_frame_are_packed() {
        let (rec, mut buf) = setup();

        // Warm up so the second frame has enough room without reallocating.
        buf.append(&[0u8; 72]).unwrap();
        buf.append(&[0u8; 108]).unwrap();
        rec.commit();

        let a = buf.append(&[1u8; 72]).unwrap();
        let b = buf.append(&[2u8; 108]).unwrap();
        assert_eq!(a.buffer, b.buffer);
        assert_eq!(b.offset, a.offset + 72);
    }

    #[test]
    fn capacity_covers_frame_total_and_never_shrinks() {
        let (rec, mut buf) = setup();
        let sizes = [40u64, 12, 100, 8, 64];

        let mut previous = buf.capacity();
        for s in sizes {
            buf.append(&vec![0u8; s as usize]).unwrap();
            assert!(buf.capacity() >= previous);
            previous = buf.capacity();
        }
        assert!(buf.capacity() >= sizes.iter().sum::<u64>());

        rec.commit();
        buf.append(&[0u8; 4]).unwrap();
        assert_eq!(buf.capacity(), previous);
    }

    #[test]
    fn settles_after_peak_frame() {
        let (rec, mut buf) = setup();

        for _ in 0..3 {
            buf.append(&[0u8; 100]).unwrap();
            buf.append(&[0u8; 200]).unwrap();
            buf.append(&[0u8; 300]).unwrap();
            rec.commit();
        }
        let after_first_frames = makes(&rec);

        for _ in 0..5 {
            buf.append(&[0u8; 100]).unwrap();
            buf.append(&[0u8; 200]).unwrap();
            buf.append(&[0u8; 300]).unwrap();
            rec.commit();
        }
        assert_eq!(makes(&rec), after_first_frames);
        assert!(buf.capacity() >= 600);
    }

    #[test]
    fn reallocation_destroys_previous_buffer() {
        let (rec, mut buf) = setup();
        let first = buf.append(&[0u8; 16]).unwrap();
        let second = buf.append(&[0u8; 32]).unwrap();

        assert_ne!(first.buffer, second.buffer);
        assert_eq!(second.offset, 0);
        assert_eq!(rec.count(|c| *c == Call::DestroyBuffer(first.buffer)), 1);
        assert_eq!(rec.live_buffers(), 1);
    }

    #[test]
    fn zero_length_append_does_not_grow() {
        let (rec, mut buf) = setup();
        let empty = buf.append(&[]).unwrap();
        assert!(empty.buffer.is_valid());
        assert_eq!(buf.capacity(), 0);

        buf.append(&[0u8; 8]).unwrap();
        rec.commit();
        let cap = buf.capacity();
        let makes_before = makes(&rec);

        let b = buf.append(&[]).unwrap();
        assert!(b.buffer.is_valid());
        assert_eq!(buf.capacity(), cap);
        assert_eq!(makes(&rec), makes_before);
    }

    #[test]
    fn empty_append_after_unaligned_data_keeps_buffer() {
        let (rec, mut buf) = setup();
        let first = buf.append(&[1u8; 5]).unwrap();
        let cap = buf.capacity();
        let makes_before = makes(&rec);

        let empty = buf.append(&[]).unwrap();
        assert_eq!(empty.buffer, first.buffer);
        assert_eq!(buf.capacity(), cap);
        assert_eq!(makes(&rec), makes_before);
        assert_eq!(rec.count(|c| matches!(c, Call::DestroyBuffer(_))), 0);
    }

    #[test]
    fn unaligned_appends_pack_without_reallocating_next_frame() {
        let (rec, mut buf) = setup();
        buf.append(&[0u8; 5]).unwrap();
        buf.append(&[0u8; 7]).unwrap();
        rec.commit();
        let makes_before = makes(&rec);

        let a = buf.append(&[0u8; 5]).unwrap();
        let b = buf.append(&[0u8; 7]).unwrap();
        assert_eq!(b.offset, a.offset + 8);
        assert_eq!(makes(&rec), makes_before);
    }

    #[test]
    fn dropping_releases_buffer() {
        let (rec, mut buf) = setup();
        buf.append(&[0u8; 8]).unwrap();
        drop(buf);
        assert_eq!(rec.live_buffers(), 0);
    }
}
