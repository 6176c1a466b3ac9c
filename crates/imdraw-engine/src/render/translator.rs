use crate::draw::{DrawData, TextureId, INDEX_FORMAT};
use crate::error::{RenderError, Result};
use crate::gpu::{CommandRecorder, GpuBackend};

use super::BindingRegistry;

/// Where the renderer is within the current frame.
///
/// `update` opens a frame, `render` uploads and records it, and the frame
/// closes when the pass ends. Any error returns the renderer to `Idle`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum FramePhase {
    #[default]
    Idle,
    /// Toolkit frame started; buffers and projection not yet written.
    FrameOpen,
    /// Render pass open, commands being translated.
    Recording,
    /// Pass ended; nothing more may be recorded until the next `update`.
    FrameClosed,
}

/// Counts for one recorded frame.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draw_lists: usize,
    pub commands: usize,
    pub draw_calls: usize,
    /// Commands dropped because their scissor was empty.
    pub skipped: usize,
    pub vertices: usize,
    pub indices: usize,
}

/// Resources already uploaded for this frame.
pub struct PassResources<'a, B: GpuBackend> {
    pub pipeline: &'a B::Pipeline,
    pub frame_bindings: &'a B::BindGroup,
    pub vertex_buffer: &'a B::Buffer,
    pub index_buffer: &'a B::Buffer,
    pub font_binding: &'a B::BindGroup,
}

/// Records one render pass drawing `draw_data` from the shared buffers.
///
/// `extent` is the framebuffer size in backend pixels. The pass is always
/// ended, including when a command fails to resolve its texture.
pub fn record_pass<B, R>(
    recorder: &mut R,
    target: &B::Target,
    res: &PassResources<'_, B>,
    registry: &BindingRegistry<B::Texture, B::BindGroup>,
    draw_data: &DrawData,
    extent: (u32, u32),
) -> Result<FrameStats>
where
    B: GpuBackend,
    R: CommandRecorder<B>,
{
    recorder.begin_render_pass(target);
    let stats = record_commands(recorder, res, registry, draw_data, extent);
    recorder.end_render_pass();
    stats
}

fn record_commands<B, R>(
    recorder: &mut R,
    res: &PassResources<'_, B>,
    registry: &BindingRegistry<B::Texture, B::BindGroup>,
    draw_data: &DrawData,
    extent: (u32, u32),
) -> Result<FrameStats>
where
    B: GpuBackend,
    R: CommandRecorder<B>,
{
    recorder.set_pipeline(res.pipeline);
    recorder.set_vertex_buffer(res.vertex_buffer);
    recorder.set_index_buffer(res.index_buffer, INDEX_FORMAT);
    recorder.set_bind_group(0, res.frame_bindings);

    let mut stats = FrameStats {
        draw_lists: draw_data.draw_lists.len(),
        vertices: draw_data.total_vtx_count(),
        indices: draw_data.total_idx_count(),
        ..FrameStats::default()
    };

    let mut bound: Option<TextureId> = None;
    // Start of the current list's vertex / index batch in the shared buffers.
    let mut vtx_base: i32 = 0;
    let mut idx_base: u32 = 0;

    for list in &draw_data.draw_lists {
        for cmd in &list.commands {
            stats.commands += 1;

            // NULL means "whatever is bound".
            let id = if cmd.texture_id == TextureId::NULL {
                bound.ok_or(RenderError::UnregisteredBinding(TextureId::NULL))?
            } else {
                cmd.texture_id
            };

            if bound != Some(id) {
                let binding = if id == TextureId::FONT_ATLAS {
                    res.font_binding
                } else {
                    registry
                        .resolve(id)
                        .ok_or(RenderError::UnregisteredBinding(id))?
                };
                recorder.set_bind_group(1, binding);
                bound = Some(id);
            }

            // The draw covers first_index..first_index + elem_count; both ends must fit.
            let first_index = idx_base
                .checked_add(cmd.idx_offset)
                .filter(|first| first.checked_add(cmd.elem_count).is_some())
                .ok_or(RenderError::CapacityOverflow {
                    resource: "index offset",
                    requested: cmd.elem_count as usize,
                })?;

            let scissor = cmd.clip_rect.to_scissor(draw_data.framebuffer_scale, extent);
            if scissor.is_empty() {
                stats.skipped += 1;
            } else {
                recorder.set_scissor(scissor);
                recorder.draw_indexed(cmd.elem_count, first_index, vtx_base);
                stats.draw_calls += 1;
            }
        }

        vtx_base = i32::try_from(list.vtx_buffer.len())
            .ok()
            .and_then(|n| vtx_base.checked_add(n))
            .ok_or(RenderError::CapacityOverflow {
                resource: "vertex offset",
                requested: list.vtx_buffer.len(),
            })?;
        idx_base = u32::try_from(list.idx_buffer.len())
            .ok()
            .and_then(|n| idx_base.checked_add(n))
            .ok_or(RenderError::CapacityOverflow {
                resource: "index offset",
                requested: list.idx_buffer.len(),
            })?;
    }

    Ok(stats)
}
