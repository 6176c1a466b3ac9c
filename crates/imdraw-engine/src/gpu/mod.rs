//! Seam to the retained-mode graphics backend.
//!
//! `GpuBackend` covers resource creation/destruction; `CommandRecorder`
//! covers per-frame recording. The renderer core is generic over both so it
//! can be exercised without a device. `webgpu` is the wgpu implementation.

mod backend;
mod desc;
pub mod webgpu;

pub use backend::{BindingResource, CommandRecorder, GpuBackend};
pub use desc::{
    BlendMode, BufferDesc, BufferKind, CullMode, IndexFormat, LayoutKind, PipelineDesc,
    SamplerKind, TextureDesc, VertexAttribute, VertexFormat, VertexLayout,
};
