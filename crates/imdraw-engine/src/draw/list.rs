use super::{ClipRect, DrawIdx, DrawVert, TextureId};

/// One draw call's worth of state.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawCmd {
    /// Number of indices consumed by this command.
    pub elem_count: u32,
    pub clip_rect: ClipRect,
    pub texture_id: TextureId,
    /// First index of this command within its list's index batch.
    pub idx_offset: u32,
}

/// A toolkit draw list: one vertex batch, one index batch, ordered commands.
///
/// Indices are relative to the list's own vertex batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    pub vtx_buffer: Vec<DrawVert>,
    pub idx_buffer: Vec<DrawIdx>,
    pub commands: Vec<DrawCmd>,
}

impl DrawList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all batches. Keeps allocated capacity for reuse.
    pub fn clear(&mut self) {
        self.vtx_buffer.clear();
        self.idx_buffer.clear();
        self.commands.clear();
    }

    /// Appends a command covering the next `elem_count` indices of this list.
    pub fn push_command(&mut self, elem_count: u32, clip_rect: ClipRect, texture_id: TextureId) {
        let idx_offset = self
            .commands
            .last()
            .map_or(0, |c| c.idx_offset + c.elem_count);

        self.commands.push(DrawCmd {
            elem_count,
            clip_rect,
            texture_id,
            idx_offset,
        });
    }

    #[inline]
    pub fn vtx_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vtx_buffer)
    }

    #[inline]
    pub fn idx_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.idx_buffer)
    }
}

/// Everything the toolkit produced for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawData {
    /// Draw lists in stream (back-to-front) order.
    pub draw_lists: Vec<DrawList>,
    /// Display size in toolkit space.
    pub display_size: [f32; 2],
    /// Toolkit space → backend pixels.
    pub framebuffer_scale: [f32; 2],
}

impl DrawData {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.draw_lists.is_empty()
    }

    pub fn total_vtx_count(&self) -> usize {
        self.draw_lists.iter().map(|l| l.vtx_buffer.len()).sum()
    }

    pub fn total_idx_count(&self) -> usize {
        self.draw_lists.iter().map(|l| l.idx_buffer.len()).sum()
    }

    pub fn total_cmd_count(&self) -> usize {
        self.draw_lists.iter().map(|l| l.commands.len()).sum()
    }
}
