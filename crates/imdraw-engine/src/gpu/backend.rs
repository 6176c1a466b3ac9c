use std::hash::Hash;

use crate::draw::ScissorRect;
use crate::error::Result;

use super::{BufferDesc, IndexFormat, LayoutKind, PipelineDesc, SamplerKind, TextureDesc};

/// Resource bound at one slot of a bind group; slot index = position in the list.
pub enum BindingResource<'a, B: GpuBackend + ?Sized> {
    Uniform(&'a B::Buffer),
    Sampler(&'a B::Sampler),
    Texture(&'a B::Texture),
}

/// Resource factory of a graphics backend.
///
/// `destroy_*` take ownership; releasing a resource twice is impossible by
/// construction. Creation failures map to `RenderError::ResourceAllocation`.
pub trait GpuBackend {
    type Buffer;
    /// Equality and hashing must follow resource identity, since textures key
    /// the binding registry.
    type Texture: Clone + Eq + Hash;
    type Sampler;
    type Layout;
    type Pipeline;
    type BindGroup;
    /// Render target the UI pass draws into.
    type Target;

    fn create_buffer(&self, desc: &BufferDesc) -> Result<Self::Buffer>;
    fn destroy_buffer(&self, buffer: Self::Buffer);

    fn create_texture(&self, desc: &TextureDesc) -> Result<Self::Texture>;
    /// Writes the full texture from tightly packed RGBA8 rows.
    fn write_texture(&self, texture: &Self::Texture, width: u32, height: u32, pixels: &[u8]);
    fn destroy_texture(&self, texture: Self::Texture);

    fn create_sampler(&self, kind: SamplerKind) -> Result<Self::Sampler>;
    fn destroy_sampler(&self, sampler: Self::Sampler);

    fn create_layout(&self, kind: LayoutKind) -> Result<Self::Layout>;
    fn destroy_layout(&self, layout: Self::Layout);

    fn create_pipeline(&self, desc: &PipelineDesc<'_, Self>) -> Result<Self::Pipeline>;
    fn destroy_pipeline(&self, pipeline: Self::Pipeline);

    fn create_bind_group(
        &self,
        layout: &Self::Layout,
        resources: &[BindingResource<'_, Self>],
    ) -> Result<Self::BindGroup>;
    fn destroy_bind_group(&self, group: Self::BindGroup);
}

/// Command stream a frame is recorded into. The caller submits it.
pub trait CommandRecorder<B: GpuBackend> {
    fn update_buffer(&mut self, buffer: &B::Buffer, offset: u64, data: &[u8]);

    fn begin_render_pass(&mut self, target: &B::Target);
    fn set_pipeline(&mut self, pipeline: &B::Pipeline);
    fn set_vertex_buffer(&mut self, buffer: &B::Buffer);
    fn set_index_buffer(&mut self, buffer: &B::Buffer, format: IndexFormat);
    fn set_bind_group(&mut self, slot: u32, group: &B::BindGroup);
    fn set_scissor(&mut self, rect: ScissorRect);
    fn draw_indexed(&mut self, index_count: u32, first_index: u32, base_vertex: i32);
    fn end_render_pass(&mut self);
}
