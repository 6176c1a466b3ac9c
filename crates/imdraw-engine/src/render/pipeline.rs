use crate::draw::DrawVert;
use crate::error::Result;
use crate::gpu::{
    BindingResource, BufferDesc, BufferKind, GpuBackend, LayoutKind, PipelineDesc, TextureDesc,
};
use crate::toolkit::FontAtlasImage;

use super::{RendererConfig, PROJECTION_UNIFORM_SIZE};

/// Everything created once at setup and shared by every frame.
///
/// Slot 0 (`frame_bindings`) carries the projection uniform and the sampler;
/// slot 1 is rebound per draw with a texture binding built on
/// `texture_layout`.
pub struct PipelineResources<B: GpuBackend> {
    pub frame_layout: B::Layout,
    pub texture_layout: B::Layout,
    pub pipeline: B::Pipeline,
    pub sampler: B::Sampler,
    pub constant_buffer: B::Buffer,
    pub frame_bindings: B::BindGroup,
}

impl<B: GpuBackend> PipelineResources<B> {
    /// Creates every setup resource. On failure, whatever was already built is
    /// released before the error is returned.
    pub fn create(backend: &B, config: &RendererConfig) -> Result<Self> {
        let frame_layout = backend.create_layout(LayoutKind::FrameConstants)?;

        let texture_layout = match backend.create_layout(LayoutKind::Texture) {
            Ok(layout) => layout,
            Err(e) => {
                backend.destroy_layout(frame_layout);
                return Err(e);
            }
        };

        let created = backend.create_pipeline(&PipelineDesc {
            label: "imdraw ui pipeline",
            layouts: [&frame_layout, &texture_layout],
            vertex_layout: DrawVert::layout(),
            blend: config.blend,
            cull: config.cull,
        });
        let pipeline = match created {
            Ok(pipeline) => pipeline,
            Err(e) => {
                backend.destroy_layout(texture_layout);
                backend.destroy_layout(frame_layout);
                return Err(e);
            }
        };

        let sampler = match backend.create_sampler(config.sampler) {
            Ok(sampler) => sampler,
            Err(e) => {
                backend.destroy_pipeline(pipeline);
                backend.destroy_layout(texture_layout);
                backend.destroy_layout(frame_layout);
                return Err(e);
            }
        };

        let created = backend.create_buffer(&BufferDesc {
            label: "imdraw projection uniform",
            size: PROJECTION_UNIFORM_SIZE,
            kind: BufferKind::Uniform,
        });
        let constant_buffer = match created {
            Ok(buffer) => buffer,
            Err(e) => {
                backend.destroy_sampler(sampler);
                backend.destroy_pipeline(pipeline);
                backend.destroy_layout(texture_layout);
                backend.destroy_layout(frame_layout);
                return Err(e);
            }
        };

        let created = backend.create_bind_group(
            &frame_layout,
            &[
                BindingResource::Uniform(&constant_buffer),
                BindingResource::Sampler(&sampler),
            ],
        );
        let frame_bindings = match created {
            Ok(group) => group,
            Err(e) => {
                backend.destroy_buffer(constant_buffer);
                backend.destroy_sampler(sampler);
                backend.destroy_pipeline(pipeline);
                backend.destroy_layout(texture_layout);
                backend.destroy_layout(frame_layout);
                return Err(e);
            }
        };

        log::debug!(
            "pipeline ready (blend={:?}, cull={:?}, sampler={:?})",
            config.blend,
            config.cull,
            config.sampler
        );

        Ok(Self {
            frame_layout,
            texture_layout,
            pipeline,
            sampler,
            constant_buffer,
            frame_bindings,
        })
    }

    pub fn destroy(self, backend: &B) {
        backend.destroy_bind_group(self.frame_bindings);
        backend.destroy_buffer(self.constant_buffer);
        backend.destroy_sampler(self.sampler);
        backend.destroy_pipeline(self.pipeline);
        backend.destroy_layout(self.texture_layout);
        backend.destroy_layout(self.frame_layout);
    }
}

/// The font atlas on the GPU plus its slot-1 binding.
///
/// Lives outside the binding registry: it is addressed by the reserved
/// `TextureId::FONT_ATLAS`.
pub struct FontTexture<B: GpuBackend> {
    pub texture: B::Texture,
    pub binding: B::BindGroup,
    pub size: (u32, u32),
}

impl<B: GpuBackend> FontTexture<B> {
    pub fn upload(backend: &B, texture_layout: &B::Layout, image: FontAtlasImage<'_>) -> Result<Self> {
        image.validate()?;

        let texture = backend.create_texture(&TextureDesc {
            label: "imdraw font atlas",
            width: image.width,
            height: image.height,
        })?;
        backend.write_texture(&texture, image.width, image.height, image.pixels);

        let created = backend.create_bind_group(texture_layout, &[BindingResource::Texture(&texture)]);
        let binding = match created {
            Ok(binding) => binding,
            Err(e) => {
                backend.destroy_texture(texture);
                return Err(e);
            }
        };

        log::debug!("font atlas uploaded ({}x{})", image.width, image.height);
        Ok(Self {
            texture,
            binding,
            size: (image.width, image.height),
        })
    }

    pub fn destroy(self, backend: &B) {
        backend.destroy_bind_group(self.binding);
        backend.destroy_texture(self.texture);
    }
}
