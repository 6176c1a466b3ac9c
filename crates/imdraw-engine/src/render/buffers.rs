use crate::draw::{DrawData, DrawIdx, DrawVert};
use crate::error::{RenderError, Result};
use crate::gpu::{BufferDesc, BufferKind, CommandRecorder, GpuBackend};

/// Copy size/offset granularity for buffer updates.
const COPY_ALIGNMENT: u64 = 4;

/// A GPU buffer whose capacity only grows.
pub struct GpuBuffer<B: GpuBackend> {
    raw: B::Buffer,
    capacity: u64,
    label: &'static str,
    kind: BufferKind,
}

impl<B: GpuBackend> GpuBuffer<B> {
    pub fn new(backend: &B, label: &'static str, kind: BufferKind, capacity: u64) -> Result<Self> {
        let raw = backend.create_buffer(&BufferDesc {
            label,
            size: capacity,
            kind,
        })?;
        Ok(Self {
            raw,
            capacity,
            label,
            kind,
        })
    }

    #[inline]
    pub fn raw(&self) -> &B::Buffer {
        &self.raw
    }

    #[inline]
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Grows to the next power of two ≥ `required` bytes if the buffer is too small.
    ///
    /// Contents are not preserved across growth. Returns whether a new buffer
    /// was allocated.
    pub fn ensure_capacity(&mut self, backend: &B, required: u64) -> Result<bool> {
        if required <= self.capacity {
            return Ok(false);
        }

        let new_capacity = required
            .checked_next_power_of_two()
            .ok_or(RenderError::CapacityOverflow {
                resource: self.label,
                requested: usize::try_from(required).unwrap_or(usize::MAX),
            })?;

        let raw = backend.create_buffer(&BufferDesc {
            label: self.label,
            size: new_capacity,
            kind: self.kind,
        })?;
        let old = std::mem::replace(&mut self.raw, raw);
        backend.destroy_buffer(old);

        log::debug!(
            "{}: grown {} -> {} bytes (required {required})",
            self.label,
            self.capacity,
            new_capacity
        );
        self.capacity = new_capacity;
        Ok(true)
    }

    pub fn destroy(self, backend: &B) {
        backend.destroy_buffer(self.raw);
    }
}

/// Vertex + index buffers shared by every draw list of a frame.
///
/// Each frame the lists are packed back to back (vertex batches at the
/// running vertex offset, index batches at the running index offset) into
/// CPU staging vectors, then written with one update per buffer. Staging
/// memory is reused across frames.
pub struct FrameBuffers<B: GpuBackend> {
    vertex: GpuBuffer<B>,
    index: GpuBuffer<B>,
    vtx_staging: Vec<u8>,
    idx_staging: Vec<u8>,
}

impl<B: GpuBackend> FrameBuffers<B> {
    pub fn new(backend: &B, vertex_bytes: u64, index_bytes: u64) -> Result<Self> {
        let vertex = GpuBuffer::new(
            backend,
            "imdraw vertex buffer",
            BufferKind::Vertex,
            align_copy(vertex_bytes.max(COPY_ALIGNMENT)),
        )?;
        let index = GpuBuffer::new(
            backend,
            "imdraw index buffer",
            BufferKind::Index,
            align_copy(index_bytes.max(COPY_ALIGNMENT)),
        )?;

        Ok(Self {
            vertex,
            index,
            vtx_staging: Vec::new(),
            idx_staging: Vec::new(),
        })
    }

    #[inline]
    pub fn vertex(&self) -> &GpuBuffer<B> {
        &self.vertex
    }

    #[inline]
    pub fn index(&self) -> &GpuBuffer<B> {
        &self.index
    }

    pub fn ensure_vertex_capacity(&mut self, backend: &B, required_bytes: u64) -> Result<bool> {
        self.vertex.ensure_capacity(backend, align_copy(required_bytes))
    }

    pub fn ensure_index_capacity(&mut self, backend: &B, required_bytes: u64) -> Result<bool> {
        self.index.ensure_capacity(backend, align_copy(required_bytes))
    }

    /// Makes both buffers large enough for `draw_data`.
    pub fn reserve_for(&mut self, backend: &B, draw_data: &DrawData) -> Result<()> {
        let vtx = byte_len::<DrawVert>("imdraw vertex buffer", draw_data.total_vtx_count())?;
        let idx = byte_len::<DrawIdx>("imdraw index buffer", draw_data.total_idx_count())?;

        self.ensure_vertex_capacity(backend, vtx)?;
        self.ensure_index_capacity(backend, idx)?;
        Ok(())
    }

    /// Packs every draw list in stream order and uploads both batches.
    ///
    /// Requires a preceding `reserve_for` with the same draw data.
    pub fn upload<R>(&mut self, recorder: &mut R, draw_data: &DrawData)
    where
        R: CommandRecorder<B>,
    {
        self.vtx_staging.clear();
        self.idx_staging.clear();

        for list in &draw_data.draw_lists {
            self.vtx_staging.extend_from_slice(list.vtx_bytes());
            self.idx_staging.extend_from_slice(list.idx_bytes());
        }

        write_padded::<B, R>(recorder, self.vertex.raw(), &mut self.vtx_staging);
        write_padded::<B, R>(recorder, self.index.raw(), &mut self.idx_staging);
    }

    pub fn destroy(self, backend: &B) {
        self.vertex.destroy(backend);
        self.index.destroy(backend);
    }
}

fn write_padded<B, R>(recorder: &mut R, buffer: &B::Buffer, staging: &mut Vec<u8>)
where
    B: GpuBackend,
    R: CommandRecorder<B>,
{
    if staging.is_empty() {
        return;
    }
    let padded = align_copy(staging.len() as u64) as usize;
    staging.resize(padded, 0);
    recorder.update_buffer(buffer, 0, staging);
}

#[inline]
fn align_copy(bytes: u64) -> u64 {
    bytes.div_ceil(COPY_ALIGNMENT).saturating_mul(COPY_ALIGNMENT)
}

fn byte_len<T>(resource: &'static str, count: usize) -> Result<u64> {
    count
        .checked_mul(std::mem::size_of::<T>())
        .and_then(|bytes| u64::try_from(bytes).ok())
        .filter(|&bytes| bytes <= u64::MAX - COPY_ALIGNMENT)
        .ok_or(RenderError::CapacityOverflow {
            resource,
            requested: count,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::{ClipRect, DrawList, TextureId};
    use crate::testing::{MockBackend, Recorded, RecordingRecorder};

    fn buffers(backend: &MockBackend) -> FrameBuffers<MockBackend> {
        FrameBuffers::new(backend, 10_000, 2_000).unwrap()
    }

    fn list(vertices: usize, indices: usize) -> DrawList {
        let mut l = DrawList::new();
        l.vtx_buffer = (0..vertices)
            .map(|i| DrawVert::new([i as f32, 0.0], [0.0; 2], 0xffff_ffff))
            .collect();
        l.idx_buffer = (0..indices).map(|i| i as DrawIdx).collect();
        l.push_command(indices as u32, ClipRect::new(0.0, 0.0, 1.0, 1.0), TextureId::FONT_ATLAS);
        l
    }

    #[test]
    fn growth_is_sufficient_and_monotonic() {
        let backend = MockBackend::default();
        let mut fb = buffers(&backend);

        let mut last = fb.vertex().capacity();
        for required in [100u64, 12_000, 9_000, 40_000, 16_385, 3, 70_000] {
            fb.ensure_vertex_capacity(&backend, required).unwrap();
            let cap = fb.vertex().capacity();
            assert!(cap >= required, "{cap} < {required}");
            assert!(cap >= last, "capacity shrank: {last} -> {cap}");
            last = cap;
        }
    }

    #[test]
    fn growth_uses_next_power_of_two() {
        let backend = MockBackend::default();
        let mut fb = buffers(&backend);

        assert!(fb.ensure_index_capacity(&backend, 2_001).unwrap());
        assert_eq!(fb.index().capacity(), 4_096);
        assert!(!fb.ensure_index_capacity(&backend, 4_096).unwrap());
    }

    #[test]
    fn growth_releases_the_old_buffer() {
        let backend = MockBackend::default();
        let mut fb = buffers(&backend);
        let before = backend.counters();

        fb.ensure_vertex_capacity(&backend, 20_000).unwrap();

        let after = backend.counters();
        assert_eq!(after.buffers_created, before.buffers_created + 1);
        assert_eq!(after.buffers_destroyed, before.buffers_destroyed + 1);
        assert_eq!(backend.buffer_size(fb.vertex().raw()), 32_768);
    }

    #[test]
    fn fitting_request_allocates_nothing() {
        let backend = MockBackend::default();
        let mut fb = buffers(&backend);
        let before = backend.counters();

        fb.ensure_vertex_capacity(&backend, 10_000).unwrap();
        fb.ensure_index_capacity(&backend, 1).unwrap();

        assert_eq!(backend.counters(), before);
    }

    #[test]
    fn overflowing_request_is_rejected() {
        let backend = MockBackend::default();
        let mut fb = buffers(&backend);
        let err = fb.ensure_vertex_capacity(&backend, u64::MAX - 8);
        assert!(matches!(err, Err(RenderError::CapacityOverflow { .. })));
    }

    #[test]
    fn failed_allocation_keeps_the_old_buffer() {
        let backend = MockBackend::default();
        let mut fb = buffers(&backend);
        backend.fail_buffers_larger_than(16_384);

        let err = fb.ensure_vertex_capacity(&backend, 20_000);
        assert!(matches!(err, Err(RenderError::ResourceAllocation { .. })));
        assert_eq!(fb.vertex().capacity(), 10_000);
        assert_eq!(backend.buffer_size(fb.vertex().raw()), 10_000);
    }

    #[test]
    fn upload_packs_lists_in_stream_order() {
        let backend = MockBackend::default();
        let mut fb = buffers(&backend);
        let data = DrawData {
            draw_lists: vec![list(3, 3), list(4, 6)],
            display_size: [100.0, 100.0],
            framebuffer_scale: [1.0, 1.0],
        };

        fb.reserve_for(&backend, &data).unwrap();
        let mut rec = RecordingRecorder::default();
        fb.upload(&mut rec, &data);

        let vtx_id = backend.buffer_id(fb.vertex().raw());
        let idx_id = backend.buffer_id(fb.index().raw());

        let mut expected_vtx = Vec::new();
        expected_vtx.extend_from_slice(data.draw_lists[0].vtx_bytes());
        expected_vtx.extend_from_slice(data.draw_lists[1].vtx_bytes());

        // 9 u16 indices = 18 bytes, padded to 20.
        let mut expected_idx = Vec::new();
        expected_idx.extend_from_slice(data.draw_lists[0].idx_bytes());
        expected_idx.extend_from_slice(data.draw_lists[1].idx_bytes());
        expected_idx.extend_from_slice(&[0, 0]);

        assert_eq!(
            rec.commands,
            vec![
                Recorded::UpdateBuffer { buffer: vtx_id, offset: 0, data: expected_vtx },
                Recorded::UpdateBuffer { buffer: idx_id, offset: 0, data: expected_idx },
            ]
        );
    }

    #[test]
    fn reserve_accounts_for_copy_padding() {
        let backend = MockBackend::default();
        let mut fb = FrameBuffers::new(&backend, 4, 4).unwrap();
        let data = DrawData {
            draw_lists: vec![list(1, 3)],
            ..Default::default()
        };

        fb.reserve_for(&backend, &data).unwrap();
        // 3 indices = 6 bytes → aligned to 8.
        assert_eq!(fb.index().capacity(), 8);
        assert_eq!(fb.vertex().capacity(), 32);
    }
}
