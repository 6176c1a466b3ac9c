//! GPU-free doubles for renderer tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::draw::{DrawData, ScissorRect, TextureId};
use crate::error::{RenderError, Result};
use crate::gpu::{
    BindingResource, BlendMode, BufferDesc, BufferKind, CommandRecorder, CullMode, GpuBackend,
    IndexFormat, LayoutKind, PipelineDesc, SamplerKind, TextureDesc, VertexLayout,
};
use crate::toolkit::{FontAtlasImage, FrameIo, InputEvent, UiToolkit};

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Counters {
    pub buffers_created: usize,
    pub buffers_destroyed: usize,
    pub textures_created: usize,
    pub textures_destroyed: usize,
    pub samplers_created: usize,
    pub samplers_destroyed: usize,
    pub layouts_created: usize,
    pub layouts_destroyed: usize,
    pub pipelines_created: usize,
    pub pipelines_destroyed: usize,
    pub bind_groups_created: usize,
    pub bind_groups_destroyed: usize,
}

impl Counters {
    pub fn is_balanced(&self) -> bool {
        self.buffers_created == self.buffers_destroyed
            && self.textures_created == self.textures_destroyed
            && self.samplers_created == self.samplers_destroyed
            && self.layouts_created == self.layouts_destroyed
            && self.pipelines_created == self.pipelines_destroyed
            && self.bind_groups_created == self.bind_groups_destroyed
    }

    pub fn live_bind_groups(&self) -> usize {
        self.bind_groups_created - self.bind_groups_destroyed
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct MockBuffer {
    pub id: u64,
    pub size: u64,
    pub kind: BufferKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MockTexture {
    pub id: u64,
}

impl MockTexture {
    /// A texture owned by the application, outside the backend's counters.
    pub fn external(id: u64) -> Self {
        Self { id }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct MockHandle {
    pub id: u64,
}

#[derive(Debug, PartialEq, Eq)]
pub struct MockBindGroup {
    pub id: u64,
    /// Texture bound at slot 0, for texture bind groups.
    pub texture: Option<u64>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MockTarget(pub u32);

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PipelineSummary {
    pub blend: BlendMode,
    pub cull: CullMode,
    pub vertex_layout: VertexLayout,
}

#[derive(Default)]
struct MockState {
    counters: Cell<Counters>,
    next_id: Cell<u64>,
    max_buffer_size: Cell<Option<u64>>,
    fail_bind_groups: Cell<bool>,
    fail_pipelines: Cell<bool>,
    last_pipeline: Cell<Option<PipelineSummary>>,
    texture_writes: RefCell<Vec<(u64, u32, u32, usize)>>,
}

/// Backend that hands out numbered handles and counts every allocation.
///
/// Clones share state, so a test can keep a handle while the renderer owns
/// another.
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Rc<MockState>,
}

impl MockBackend {
    pub fn counters(&self) -> Counters {
        self.state.counters.get()
    }

    pub fn buffer_size(&self, buffer: &MockBuffer) -> u64 {
        buffer.size
    }

    pub fn buffer_id(&self, buffer: &MockBuffer) -> u64 {
        buffer.id
    }

    /// Makes buffer creation fail above `limit` bytes.
    pub fn fail_buffers_larger_than(&self, limit: u64) {
        self.state.max_buffer_size.set(Some(limit));
    }

    pub fn fail_bind_groups(&self, fail: bool) {
        self.state.fail_bind_groups.set(fail);
    }

    pub fn fail_pipelines(&self, fail: bool) {
        self.state.fail_pipelines.set(fail);
    }

    pub fn last_pipeline(&self) -> Option<PipelineSummary> {
        self.state.last_pipeline.get()
    }

    /// `(texture id, width, height, byte count)` per `write_texture` call.
    pub fn texture_writes(&self) -> Vec<(u64, u32, u32, usize)> {
        self.state.texture_writes.borrow().clone()
    }

    fn next_id(&self) -> u64 {
        // Start high so mock ids never look like texture handles.
        let id = self.state.next_id.get() + 1000;
        self.state.next_id.set(self.state.next_id.get() + 1);
        id
    }

    fn bump(&self, f: impl FnOnce(&mut Counters)) {
        let mut c = self.state.counters.get();
        f(&mut c);
        self.state.counters.set(c);
    }
}

impl GpuBackend for MockBackend {
    type Buffer = MockBuffer;
    type Texture = MockTexture;
    type Sampler = MockHandle;
    type Layout = MockHandle;
    type Pipeline = MockHandle;
    type BindGroup = MockBindGroup;
    type Target = MockTarget;

    fn create_buffer(&self, desc: &BufferDesc) -> Result<MockBuffer> {
        if let Some(limit) = self.state.max_buffer_size.get() {
            if desc.size > limit {
                return Err(RenderError::allocation(desc.label, "mock size limit"));
            }
        }
        self.bump(|c| c.buffers_created += 1);
        Ok(MockBuffer {
            id: self.next_id(),
            size: desc.size,
            kind: desc.kind,
        })
    }

    fn destroy_buffer(&self, _buffer: MockBuffer) {
        self.bump(|c| c.buffers_destroyed += 1);
    }

    fn create_texture(&self, _desc: &TextureDesc) -> Result<MockTexture> {
        self.bump(|c| c.textures_created += 1);
        Ok(MockTexture { id: self.next_id() })
    }

    fn write_texture(&self, texture: &MockTexture, width: u32, height: u32, pixels: &[u8]) {
        self.state
            .texture_writes
            .borrow_mut()
            .push((texture.id, width, height, pixels.len()));
    }

    fn destroy_texture(&self, _texture: MockTexture) {
        self.bump(|c| c.textures_destroyed += 1);
    }

    fn create_sampler(&self, _kind: SamplerKind) -> Result<MockHandle> {
        self.bump(|c| c.samplers_created += 1);
        Ok(MockHandle { id: self.next_id() })
    }

    fn destroy_sampler(&self, _sampler: MockHandle) {
        self.bump(|c| c.samplers_destroyed += 1);
    }

    fn create_layout(&self, _kind: LayoutKind) -> Result<MockHandle> {
        self.bump(|c| c.layouts_created += 1);
        Ok(MockHandle { id: self.next_id() })
    }

    fn destroy_layout(&self, _layout: MockHandle) {
        self.bump(|c| c.layouts_destroyed += 1);
    }

    fn create_pipeline(&self, desc: &PipelineDesc<'_, Self>) -> Result<MockHandle> {
        if self.state.fail_pipelines.get() {
            return Err(RenderError::allocation(desc.label, "mock failure"));
        }
        self.state.last_pipeline.set(Some(PipelineSummary {
            blend: desc.blend,
            cull: desc.cull,
            vertex_layout: desc.vertex_layout,
        }));
        self.bump(|c| c.pipelines_created += 1);
        Ok(MockHandle { id: self.next_id() })
    }

    fn destroy_pipeline(&self, _pipeline: MockHandle) {
        self.bump(|c| c.pipelines_destroyed += 1);
    }

    fn create_bind_group(
        &self,
        _layout: &MockHandle,
        resources: &[BindingResource<'_, Self>],
    ) -> Result<MockBindGroup> {
        if self.state.fail_bind_groups.get() {
            return Err(RenderError::allocation("bind group", "mock failure"));
        }
        let texture = resources.iter().find_map(|r| match r {
            BindingResource::Texture(t) => Some(t.id),
            _ => None,
        });
        self.bump(|c| c.bind_groups_created += 1);
        Ok(MockBindGroup {
            id: self.next_id(),
            texture,
        })
    }

    fn destroy_bind_group(&self, _group: MockBindGroup) {
        self.bump(|c| c.bind_groups_destroyed += 1);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    UpdateBuffer { buffer: u64, offset: u64, data: Vec<u8> },
    BeginPass(u32),
    SetPipeline(u64),
    SetVertexBuffer(u64),
    SetIndexBuffer(u64, IndexFormat),
    SetBindGroup { slot: u32, group: u64 },
    SetScissor(ScissorRect),
    DrawIndexed { index_count: u32, first_index: u32, base_vertex: i32 },
    EndPass,
}

#[derive(Debug, Default)]
pub struct RecordingRecorder {
    pub commands: Vec<Recorded>,
}

impl RecordingRecorder {
    /// `(index_count, first_index, base_vertex)` per draw.
    pub fn draws(&self) -> Vec<(u32, u32, i32)> {
        self.commands
            .iter()
            .filter_map(|c| match *c {
                Recorded::DrawIndexed { index_count, first_index, base_vertex } => {
                    Some((index_count, first_index, base_vertex))
                }
                _ => None,
            })
            .collect()
    }

    pub fn scissors(&self) -> Vec<ScissorRect> {
        self.commands
            .iter()
            .filter_map(|c| match *c {
                Recorded::SetScissor(rect) => Some(rect),
                _ => None,
            })
            .collect()
    }

    /// Bind group ids set at `slot`, in order.
    pub fn bind_groups(&self, slot: u32) -> Vec<u64> {
        self.commands
            .iter()
            .filter_map(|c| match *c {
                Recorded::SetBindGroup { slot: s, group } if s == slot => Some(group),
                _ => None,
            })
            .collect()
    }

    pub fn uploads(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, Recorded::UpdateBuffer { .. }))
            .count()
    }
}

impl CommandRecorder<MockBackend> for RecordingRecorder {
    fn update_buffer(&mut self, buffer: &MockBuffer, offset: u64, data: &[u8]) {
        self.commands.push(Recorded::UpdateBuffer {
            buffer: buffer.id,
            offset,
            data: data.to_vec(),
        });
    }

    fn begin_render_pass(&mut self, target: &MockTarget) {
        self.commands.push(Recorded::BeginPass(target.0));
    }

    fn set_pipeline(&mut self, pipeline: &MockHandle) {
        self.commands.push(Recorded::SetPipeline(pipeline.id));
    }

    fn set_vertex_buffer(&mut self, buffer: &MockBuffer) {
        self.commands.push(Recorded::SetVertexBuffer(buffer.id));
    }

    fn set_index_buffer(&mut self, buffer: &MockBuffer, format: IndexFormat) {
        self.commands.push(Recorded::SetIndexBuffer(buffer.id, format));
    }

    fn set_bind_group(&mut self, slot: u32, group: &MockBindGroup) {
        self.commands.push(Recorded::SetBindGroup { slot, group: group.id });
    }

    fn set_scissor(&mut self, rect: ScissorRect) {
        self.commands.push(Recorded::SetScissor(rect));
    }

    fn draw_indexed(&mut self, index_count: u32, first_index: u32, base_vertex: i32) {
        self.commands.push(Recorded::DrawIndexed {
            index_count,
            first_index,
            base_vertex,
        });
    }

    fn end_render_pass(&mut self) {
        self.commands.push(Recorded::EndPass);
    }
}

/// Counters a test can read after the renderer consumed the toolkit.
#[derive(Debug, Default)]
pub struct ToolkitLog {
    pub frames: Vec<FrameIo>,
    pub inputs: Vec<InputEvent>,
    pub font_ids: Vec<TextureId>,
    pub atlas_reads: usize,
    pub atlas_clears: usize,
    pub renders: usize,
    pub shutdowns: usize,
}

/// Toolkit that replays a fixed draw stream every frame.
pub struct MockToolkit {
    pub frame: DrawData,
    pub atlas_size: (u32, u32),
    pub atlas: Vec<u8>,
    pub log: Rc<RefCell<ToolkitLog>>,
}

impl MockToolkit {
    pub fn new() -> Self {
        Self::with_frame(DrawData::default())
    }

    pub fn with_frame(frame: DrawData) -> Self {
        Self {
            frame,
            atlas_size: (2, 2),
            atlas: vec![0xff; 2 * 2 * 4],
            log: Rc::default(),
        }
    }

    pub fn log(&self) -> Rc<RefCell<ToolkitLog>> {
        Rc::clone(&self.log)
    }
}

impl UiToolkit for MockToolkit {
    fn new_frame(&mut self, io: FrameIo) {
        self.log.borrow_mut().frames.push(io);
        self.frame.display_size = io.display_size;
        self.frame.framebuffer_scale = io.framebuffer_scale;
    }

    fn render(&mut self) -> &DrawData {
        self.log.borrow_mut().renders += 1;
        &self.frame
    }

    fn font_atlas_rgba32(&mut self) -> FontAtlasImage<'_> {
        self.log.borrow_mut().atlas_reads += 1;
        FontAtlasImage {
            width: self.atlas_size.0,
            height: self.atlas_size.1,
            bytes_per_pixel: 4,
            pixels: &self.atlas,
        }
    }

    fn set_font_texture_id(&mut self, id: TextureId) {
        self.log.borrow_mut().font_ids.push(id);
    }

    fn clear_font_atlas_data(&mut self) {
        self.log.borrow_mut().atlas_clears += 1;
    }

    fn handle_input(&mut self, event: &InputEvent) {
        self.log.borrow_mut().inputs.push(event.clone());
    }

    fn shutdown(&mut self) {
        self.log.borrow_mut().shutdowns += 1;
    }
}
