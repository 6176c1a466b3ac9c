use bytemuck::{Pod, Zeroable};

use crate::gpu::{IndexFormat, VertexAttribute, VertexFormat, VertexLayout};

/// Index type of the toolkit's index batches.
pub type DrawIdx = u16;

/// Index buffer format matching `DrawIdx`.
pub const INDEX_FORMAT: IndexFormat = IndexFormat::for_index_size(std::mem::size_of::<DrawIdx>());

/// UI vertex as produced by the toolkit (20 bytes).
///
///  offset  0  pos  [f32; 2]   loc 0
///  offset  8  uv   [f32; 2]   loc 1
///  offset 16  col  u32        loc 2 (RGBA8, unorm)
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct DrawVert {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
    pub col: u32,
}

impl DrawVert {
    pub const SIZE: usize = std::mem::size_of::<DrawVert>();

    const ATTRS: [VertexAttribute; 3] = [
        VertexAttribute { location: 0, offset: 0, format: VertexFormat::Float32x2 },
        VertexAttribute { location: 1, offset: 8, format: VertexFormat::Float32x2 },
        VertexAttribute { location: 2, offset: 16, format: VertexFormat::Unorm8x4 },
    ];

    #[inline]
    pub const fn new(pos: [f32; 2], uv: [f32; 2], col: u32) -> Self {
        Self { pos, uv, col }
    }

    /// Packs a color so its bytes sit in memory as `r, g, b, a`.
    #[inline]
    pub const fn pack_rgba(r: u8, g: u8, b: u8, a: u8) -> u32 {
        u32::from_le_bytes([r, g, b, a])
    }

    /// Fixed input layout matching this struct.
    pub fn layout() -> VertexLayout {
        VertexLayout {
            stride: Self::SIZE as u64,
            attributes: &Self::ATTRS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_format_matches_draw_idx() {
        assert_eq!(INDEX_FORMAT.size(), std::mem::size_of::<DrawIdx>());
        assert_eq!(IndexFormat::for_index_size(2), IndexFormat::Uint16);
        assert_eq!(IndexFormat::for_index_size(4), IndexFormat::Uint32);
    }

    #[test]
    fn vertex_is_twenty_bytes() {
        assert_eq!(DrawVert::SIZE, 20);
        assert_eq!(DrawVert::layout().stride, 20);
    }

    #[test]
    fn packed_color_is_rgba_in_memory() {
        let v = DrawVert::new([0.0; 2], [0.0; 2], DrawVert::pack_rgba(1, 2, 3, 4));
        let bytes = bytemuck::bytes_of(&v);
        assert_eq!(&bytes[16..20], &[1, 2, 3, 4]);
    }

    #[test]
    fn attribute_offsets_follow_fields() {
        let offsets: Vec<u64> = DrawVert::layout().attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 8, 16]);
    }
}
