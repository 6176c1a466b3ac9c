use crate::draw::ScissorRect;
use crate::gpu::{CommandRecorder, IndexFormat};

use super::WgpuBackend;

/// Records UI draws into a caller-owned `wgpu::CommandEncoder`.
///
/// Buffer updates go through `Queue::write_buffer`, so they land before the
/// encoder's commands at submission. The recorder must be dropped before the
/// encoder is finished.
pub struct WgpuRecorder<'a> {
    queue: &'a wgpu::Queue,
    encoder: &'a mut wgpu::CommandEncoder,
    pass: Option<wgpu::RenderPass<'static>>,
}

impl<'a> WgpuRecorder<'a> {
    #[inline]
    pub fn new(queue: &'a wgpu::Queue, encoder: &'a mut wgpu::CommandEncoder) -> Self {
        Self {
            queue,
            encoder,
            pass: None,
        }
    }

    fn pass(&mut self) -> Option<&mut wgpu::RenderPass<'static>> {
        if self.pass.is_none() {
            log::warn!("WgpuRecorder: pass command issued outside a render pass; ignored");
        }
        self.pass.as_mut()
    }
}

impl CommandRecorder<WgpuBackend> for WgpuRecorder<'_> {
    fn update_buffer(&mut self, buffer: &wgpu::Buffer, offset: u64, data: &[u8]) {
        self.queue.write_buffer(buffer, offset, data);
    }

    fn begin_render_pass(&mut self, target: &wgpu::TextureView) {
        let pass = self
            .encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("imdraw ui pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            })
            .forget_lifetime();
        self.pass = Some(pass);
    }

    fn set_pipeline(&mut self, pipeline: &wgpu::RenderPipeline) {
        if let Some(pass) = self.pass() {
            pass.set_pipeline(pipeline);
        }
    }

    fn set_vertex_buffer(&mut self, buffer: &wgpu::Buffer) {
        if let Some(pass) = self.pass() {
            pass.set_vertex_buffer(0, buffer.slice(..));
        }
    }

    fn set_index_buffer(&mut self, buffer: &wgpu::Buffer, format: IndexFormat) {
        let format = match format {
            IndexFormat::Uint16 => wgpu::IndexFormat::Uint16,
            IndexFormat::Uint32 => wgpu::IndexFormat::Uint32,
        };
        if let Some(pass) = self.pass() {
            pass.set_index_buffer(buffer.slice(..), format);
        }
    }

    fn set_bind_group(&mut self, slot: u32, group: &wgpu::BindGroup) {
        if let Some(pass) = self.pass() {
            pass.set_bind_group(slot, group, &[]);
        }
    }

    fn set_scissor(&mut self, rect: ScissorRect) {
        if let Some(pass) = self.pass() {
            pass.set_scissor_rect(rect.x, rect.y, rect.width, rect.height);
        }
    }

    fn draw_indexed(&mut self, index_count: u32, first_index: u32, base_vertex: i32) {
        let Some(end) = first_index.checked_add(index_count) else {
            log::warn!("WgpuRecorder: index range {first_index}+{index_count} overflows; draw ignored");
            return;
        };
        if let Some(pass) = self.pass() {
            pass.draw_indexed(first_index..end, base_vertex, 0..1);
        }
    }

    fn end_render_pass(&mut self) {
        // Dropping the pass ends it.
        self.pass = None;
    }
}
