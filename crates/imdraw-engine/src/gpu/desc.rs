use super::GpuBackend;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BufferKind {
    /// CPU-written every frame, bound as vertex input.
    Vertex,
    /// CPU-written every frame, bound as index input.
    Index,
    Uniform,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BufferDesc {
    pub label: &'static str,
    pub size: u64,
    pub kind: BufferKind,
}

/// 2D RGBA8 sampled texture, written from the CPU.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TextureDesc {
    pub label: &'static str,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SamplerKind {
    PointClamp,
    LinearClamp,
}

/// The two resource layouts used by the UI pipeline.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LayoutKind {
    /// Slot 0: projection uniform (vertex) + sampler (fragment).
    FrameConstants,
    /// Slot 1: one sampled texture (fragment).
    Texture,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum VertexFormat {
    Float32x2,
    Unorm8x4,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VertexAttribute {
    pub location: u32,
    pub offset: u64,
    pub format: VertexFormat,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VertexLayout {
    pub stride: u64,
    pub attributes: &'static [VertexAttribute],
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum IndexFormat {
    Uint16,
    Uint32,
}

impl IndexFormat {
    /// Format for indices of `bytes` width; anything but 2 is treated as 32-bit.
    pub const fn for_index_size(bytes: usize) -> Self {
        match bytes {
            2 => IndexFormat::Uint16,
            _ => IndexFormat::Uint32,
        }
    }

    pub const fn size(self) -> usize {
        match self {
            IndexFormat::Uint16 => 2,
            IndexFormat::Uint32 => 4,
        }
    }
}

/// Alpha channel blending. Color always blends `SrcAlpha / OneMinusSrcAlpha`.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum BlendMode {
    /// Alpha blends like color, so destination alpha accumulates coverage.
    #[default]
    AlphaBlend,
    /// Destination alpha is discarded (`One / Zero`).
    ReplaceAlpha,
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum CullMode {
    #[default]
    None,
    Back,
}

/// Fixed UI pipeline description: triangle list, no depth test, scissor on.
pub struct PipelineDesc<'a, B: GpuBackend + ?Sized> {
    pub label: &'static str,
    /// Slot 0 and slot 1 layouts, in that order.
    pub layouts: [&'a B::Layout; 2],
    pub vertex_layout: VertexLayout,
    pub blend: BlendMode,
    pub cull: CullMode,
}
