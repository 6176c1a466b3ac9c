use std::num::NonZeroU64;

use crate::error::{RenderError, Result};
use crate::gpu::{
    BindingResource, BlendMode, BufferDesc, BufferKind, CullMode, GpuBackend, LayoutKind,
    PipelineDesc, SamplerKind, TextureDesc, VertexFormat,
};
use crate::render::PROJECTION_UNIFORM_SIZE;

/// Backend over a wgpu device/queue pair.
///
/// wgpu reports most allocation failures asynchronously, so requests beyond
/// the device limits are rejected up front as `ResourceAllocation` errors.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    target_format: wgpu::TextureFormat,
    limits: wgpu::Limits,
}

impl WgpuBackend {
    /// `target_format` is the format of the views later passed to `render`.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target_format: wgpu::TextureFormat,
    ) -> Self {
        Self {
            device: device.clone(),
            queue: queue.clone(),
            target_format,
            limits: device.limits(),
        }
    }

    #[inline]
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    #[inline]
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    #[inline]
    pub fn target_format(&self) -> wgpu::TextureFormat {
        self.target_format
    }

    /// Creates an RGBA8 texture suitable for `Renderer::get_or_create_binding`
    /// and uploads `pixels` into it.
    pub fn create_rgba_texture(
        &self,
        label: &'static str,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<wgpu::Texture> {
        let texture = self.create_texture(&TextureDesc { label, width, height })?;
        self.write_texture(&texture, width, height, pixels);
        Ok(texture)
    }
}

impl GpuBackend for WgpuBackend {
    type Buffer = wgpu::Buffer;
    type Texture = wgpu::Texture;
    type Sampler = wgpu::Sampler;
    type Layout = wgpu::BindGroupLayout;
    type Pipeline = wgpu::RenderPipeline;
    type BindGroup = wgpu::BindGroup;
    type Target = wgpu::TextureView;

    fn create_buffer(&self, desc: &BufferDesc) -> Result<wgpu::Buffer> {
        if desc.size == 0 || desc.size > self.limits.max_buffer_size {
            return Err(RenderError::allocation(
                desc.label,
                format!(
                    "size {} outside 1..={} bytes",
                    desc.size, self.limits.max_buffer_size
                ),
            ));
        }

        let usage = match desc.kind {
            BufferKind::Vertex => wgpu::BufferUsages::VERTEX,
            BufferKind::Index => wgpu::BufferUsages::INDEX,
            BufferKind::Uniform => wgpu::BufferUsages::UNIFORM,
        } | wgpu::BufferUsages::COPY_DST;

        Ok(self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(desc.label),
            size: desc.size,
            usage,
            mapped_at_creation: false,
        }))
    }

    fn destroy_buffer(&self, buffer: wgpu::Buffer) {
        buffer.destroy();
    }

    fn create_texture(&self, desc: &TextureDesc) -> Result<wgpu::Texture> {
        let max = self.limits.max_texture_dimension_2d;
        if desc.width == 0 || desc.height == 0 || desc.width > max || desc.height > max {
            return Err(RenderError::allocation(
                desc.label,
                format!("{}x{} outside 1..={max}", desc.width, desc.height),
            ));
        }

        Ok(self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(desc.label),
            size: wgpu::Extent3d {
                width: desc.width,
                height: desc.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        }))
    }

    fn write_texture(&self, texture: &wgpu::Texture, width: u32, height: u32, pixels: &[u8]) {
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }

    fn destroy_texture(&self, texture: wgpu::Texture) {
        texture.destroy();
    }

    fn create_sampler(&self, kind: SamplerKind) -> Result<wgpu::Sampler> {
        let filter = match kind {
            SamplerKind::PointClamp => wgpu::FilterMode::Nearest,
            SamplerKind::LinearClamp => wgpu::FilterMode::Linear,
        };

        Ok(self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("imdraw ui sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: filter,
            min_filter: filter,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        }))
    }

    fn destroy_sampler(&self, sampler: wgpu::Sampler) {
        drop(sampler);
    }

    fn create_layout(&self, kind: LayoutKind) -> Result<wgpu::BindGroupLayout> {
        let layout = match kind {
            LayoutKind::FrameConstants => {
                self.device
                    .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                        label: Some("imdraw frame bgl"),
                        entries: &[
                            wgpu::BindGroupLayoutEntry {
                                binding: 0,
                                visibility: wgpu::ShaderStages::VERTEX,
                                ty: wgpu::BindingType::Buffer {
                                    ty: wgpu::BufferBindingType::Uniform,
                                    has_dynamic_offset: false,
                                    min_binding_size: NonZeroU64::new(PROJECTION_UNIFORM_SIZE),
                                },
                                count: None,
                            },
                            wgpu::BindGroupLayoutEntry {
                                binding: 1,
                                visibility: wgpu::ShaderStages::FRAGMENT,
                                ty: wgpu::BindingType::Sampler(
                                    wgpu::SamplerBindingType::Filtering,
                                ),
                                count: None,
                            },
                        ],
                    })
            }
            LayoutKind::Texture => {
                self.device
                    .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                        label: Some("imdraw texture bgl"),
                        entries: &[wgpu::BindGroupLayoutEntry {
                            binding: 0,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Texture {
                                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                                view_dimension: wgpu::TextureViewDimension::D2,
                                multisampled: false,
                            },
                            count: None,
                        }],
                    })
            }
        };
        Ok(layout)
    }

    fn destroy_layout(&self, layout: wgpu::BindGroupLayout) {
        drop(layout);
    }

    fn create_pipeline(&self, desc: &PipelineDesc<'_, Self>) -> Result<wgpu::RenderPipeline> {
        let shader = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("imdraw ui shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("shaders/ui.wgsl").into()),
            });

        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("imdraw ui pipeline layout"),
                bind_group_layouts: &[desc.layouts[0], desc.layouts[1]],
                immediate_size: 0,
            });

        let attributes: Vec<wgpu::VertexAttribute> = desc
            .vertex_layout
            .attributes
            .iter()
            .map(|a| wgpu::VertexAttribute {
                format: match a.format {
                    VertexFormat::Float32x2 => wgpu::VertexFormat::Float32x2,
                    VertexFormat::Unorm8x4 => wgpu::VertexFormat::Unorm8x4,
                },
                offset: a.offset,
                shader_location: a.location,
            })
            .collect();

        let vertex_buffer = wgpu::VertexBufferLayout {
            array_stride: desc.vertex_layout.stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &attributes,
        };

        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(desc.label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[vertex_buffer],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.target_format,
                        blend: Some(blend_state(desc.blend)),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Cw,
                    cull_mode: match desc.cull {
                        CullMode::None => None,
                        CullMode::Back => Some(wgpu::Face::Back),
                    },
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });

        Ok(pipeline)
    }

    fn destroy_pipeline(&self, pipeline: wgpu::RenderPipeline) {
        drop(pipeline);
    }

    fn create_bind_group(
        &self,
        layout: &wgpu::BindGroupLayout,
        resources: &[BindingResource<'_, Self>],
    ) -> Result<wgpu::BindGroup> {
        let views: Vec<wgpu::TextureView> = resources
            .iter()
            .filter_map(|r| match r {
                BindingResource::Texture(t) => {
                    Some(t.create_view(&wgpu::TextureViewDescriptor::default()))
                }
                _ => None,
            })
            .collect();
        let mut views = views.iter();

        let mut entries = Vec::with_capacity(resources.len());
        for (binding, resource) in resources.iter().enumerate() {
            let resource = match resource {
                BindingResource::Uniform(buffer) => buffer.as_entire_binding(),
                BindingResource::Sampler(sampler) => wgpu::BindingResource::Sampler(*sampler),
                BindingResource::Texture(_) => match views.next() {
                    Some(view) => wgpu::BindingResource::TextureView(view),
                    None => return Err(RenderError::allocation("bind group", "missing texture view")),
                },
            };
            entries.push(wgpu::BindGroupEntry {
                binding: binding as u32,
                resource,
            });
        }

        Ok(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("imdraw bind group"),
            layout,
            entries: &entries,
        }))
    }

    fn destroy_bind_group(&self, group: wgpu::BindGroup) {
        drop(group);
    }
}

fn blend_state(mode: BlendMode) -> wgpu::BlendState {
    let color = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    };
    let alpha = match mode {
        BlendMode::AlphaBlend => color,
        BlendMode::ReplaceAlpha => wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::Zero,
            operation: wgpu::BlendOperation::Add,
        },
    };
    wgpu::BlendState { color, alpha }
}
