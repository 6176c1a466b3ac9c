use std::time::Duration;

use crate::draw::TextureId;
use crate::error::{RenderError, Result};
use crate::gpu::{BindingResource, CommandRecorder, GpuBackend};
use crate::toolkit::{FrameIo, InputEvent, UiToolkit};

use super::pipeline::{FontTexture, PipelineResources};
use super::translator::{self, FramePhase, FrameStats, PassResources};
use super::{ortho_projection, BindingRegistry, FrameBuffers, RendererConfig};

/// GPU resources owned by a live renderer. `None` once torn down.
struct GpuState<B: GpuBackend> {
    pipeline: PipelineResources<B>,
    buffers: FrameBuffers<B>,
    font: FontTexture<B>,
}

impl<B: GpuBackend> GpuState<B> {
    /// Builds everything in setup order, releasing what was built if a later
    /// step fails.
    fn create<T: UiToolkit>(backend: &B, toolkit: &mut T, config: &RendererConfig) -> Result<Self> {
        let pipeline = PipelineResources::create(backend, config)?;

        let buffers = FrameBuffers::new(backend, config.initial_vertex_bytes, config.initial_index_bytes);
        let buffers = match buffers {
            Ok(buffers) => buffers,
            Err(e) => {
                pipeline.destroy(backend);
                return Err(e);
            }
        };

        let uploaded = FontTexture::upload(backend, &pipeline.texture_layout, toolkit.font_atlas_rgba32());
        let font = match uploaded {
            Ok(font) => font,
            Err(e) => {
                buffers.destroy(backend);
                pipeline.destroy(backend);
                return Err(e);
            }
        };

        Ok(Self {
            pipeline,
            buffers,
            font,
        })
    }
}

/// Draws an immediate-mode toolkit's frames through a GPU backend.
///
/// Frame protocol: `update` once, then `render` once. Textures the UI shows
/// besides the font atlas must be registered with `get_or_create_binding`
/// before the `render` that references them.
pub struct Renderer<B: GpuBackend, T: UiToolkit> {
    backend: B,
    toolkit: T,
    config: RendererConfig,
    gpu: Option<GpuState<B>>,
    registry: BindingRegistry<B::Texture, B::BindGroup>,

    /// Framebuffer size in backend pixels.
    framebuffer_size: (u32, u32),
    scale_factor: f32,

    phase: FramePhase,
    warned_empty_scissor: bool,
}

impl<B: GpuBackend, T: UiToolkit> Renderer<B, T> {
    pub fn new(
        backend: B,
        mut toolkit: T,
        config: RendererConfig,
        framebuffer_size: (u32, u32),
        scale_factor: f32,
    ) -> Result<Self> {
        let gpu = GpuState::create(&backend, &mut toolkit, &config)?;
        toolkit.set_font_texture_id(TextureId::FONT_ATLAS);
        toolkit.clear_font_atlas_data();

        log::info!(
            "renderer ready: {}x{} @ {scale_factor}, input wiring {}",
            framebuffer_size.0,
            framebuffer_size.1,
            if config.input_wiring { "on" } else { "off" }
        );

        Ok(Self {
            backend,
            toolkit,
            config,
            gpu: Some(gpu),
            registry: BindingRegistry::new(),
            framebuffer_size,
            scale_factor: sanitize_scale(scale_factor),
            phase: FramePhase::Idle,
            warned_empty_scissor: false,
        })
    }

    /// Starts a toolkit frame. Must precede each `render`.
    ///
    /// A zero `delta` is replaced by `RendererConfig::delta_time_fallback`.
    pub fn update(&mut self, delta: Duration) -> Result<()> {
        if self.gpu.is_none() {
            return Err(RenderError::Destroyed);
        }
        if self.phase == FramePhase::FrameOpen {
            return Err(RenderError::FrameOrder("update called twice without render"));
        }

        let delta = if delta.is_zero() {
            self.config.delta_time_fallback
        } else {
            delta
        };

        let scale = self.scale_factor;
        let (w, h) = self.framebuffer_size;
        self.toolkit.new_frame(FrameIo {
            display_size: [w as f32 / scale, h as f32 / scale],
            framebuffer_scale: [scale, scale],
            delta_time: delta.as_secs_f32().max(f32::MIN_POSITIVE),
        });

        self.phase = FramePhase::FrameOpen;
        Ok(())
    }

    /// Uploads this frame's geometry and records its draws into `recorder`.
    ///
    /// A frame without draw lists records nothing and touches no buffer.
    pub fn render<R>(&mut self, recorder: &mut R, target: &B::Target) -> Result<FrameStats>
    where
        R: CommandRecorder<B>,
    {
        if self.phase != FramePhase::FrameOpen {
            return Err(RenderError::FrameOrder("render called without update"));
        }
        // Any early return below abandons the frame.
        self.phase = FramePhase::Idle;

        let gpu = self.gpu.as_mut().ok_or(RenderError::Destroyed)?;
        let draw_data = self.toolkit.render();

        if draw_data.is_empty() {
            self.phase = FramePhase::FrameClosed;
            return Ok(FrameStats::default());
        }

        gpu.buffers.reserve_for(&self.backend, draw_data)?;
        gpu.buffers.upload(recorder, draw_data);

        let projection = ortho_projection(draw_data.display_size);
        recorder.update_buffer(
            &gpu.pipeline.constant_buffer,
            0,
            bytemuck::bytes_of(&projection),
        );

        self.phase = FramePhase::Recording;
        let res = PassResources::<B> {
            pipeline: &gpu.pipeline.pipeline,
            frame_bindings: &gpu.pipeline.frame_bindings,
            vertex_buffer: gpu.buffers.vertex().raw(),
            index_buffer: gpu.buffers.index().raw(),
            font_binding: &gpu.font.binding,
        };
        let recorded = translator::record_pass(
            recorder,
            target,
            &res,
            &self.registry,
            draw_data,
            self.framebuffer_size,
        );

        let stats = match recorded {
            Ok(stats) => stats,
            Err(e) => {
                self.phase = FramePhase::Idle;
                return Err(e);
            }
        };
        self.phase = FramePhase::FrameClosed;

        if stats.skipped > 0 && !self.warned_empty_scissor {
            log::warn!("skipped {} draw command(s) with an empty clip rect", stats.skipped);
            self.warned_empty_scissor = true;
        }
        log::trace!("frame: {stats:?}");
        Ok(stats)
    }

    /// Handle for drawing `texture` inside the UI, creating its binding on first use.
    pub fn get_or_create_binding(&mut self, texture: &B::Texture) -> Result<TextureId> {
        if let Some(id) = self.registry.get(texture) {
            return Ok(id);
        }

        let gpu = self.gpu.as_ref().ok_or(RenderError::Destroyed)?;
        let backend = &self.backend;
        let layout = &gpu.pipeline.texture_layout;

        let id = self.registry.get_or_insert_with(texture, || {
            backend.create_bind_group(layout, &[BindingResource::Texture(texture)])
        })?;
        log::debug!("texture binding {id} created ({} live)", self.registry.len());
        Ok(id)
    }

    /// Releases the binding of `texture`. Its handle is never handed out again.
    ///
    /// Returns `false` if `texture` was not registered.
    pub fn remove_binding(&mut self, texture: &B::Texture) -> bool {
        let id = self.registry.get(texture);
        match self.registry.remove(texture) {
            Some(binding) => {
                self.backend.destroy_bind_group(binding);
                if let Some(id) = id {
                    log::debug!("texture binding {id} removed");
                }
                true
            }
            None => false,
        }
    }

    /// Binding registered under `id`. Reserved handles never resolve here.
    #[inline]
    pub fn resolve(&self, id: TextureId) -> Option<&B::BindGroup> {
        self.registry.resolve(id)
    }

    /// Texture registered under `id`.
    #[inline]
    pub fn texture(&self, id: TextureId) -> Option<&B::Texture> {
        self.registry.texture(id)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if self.framebuffer_size != (width, height) {
            log::debug!("framebuffer resized to {width}x{height}");
        }
        self.framebuffer_size = (width, height);
    }

    /// Updates the toolkit → backend pixel scale.
    ///
    /// The font atlas usually needs rebuilding afterwards; see
    /// `reload_font_texture`.
    pub fn set_scale_factor(&mut self, scale_factor: f32) {
        self.scale_factor = sanitize_scale(scale_factor);
    }

    /// Forwards `event` to the toolkit when input wiring is enabled.
    ///
    /// Returns whether the event was forwarded.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        if !self.config.input_wiring {
            return false;
        }
        self.toolkit.handle_input(event);
        true
    }

    /// Re-uploads the font atlas and rebuilds its binding.
    ///
    /// The new texture is created before the old one is released, so a failure
    /// leaves the previous atlas in place.
    pub fn reload_font_texture(&mut self) -> Result<()> {
        let gpu = self.gpu.as_mut().ok_or(RenderError::Destroyed)?;

        let font = FontTexture::upload(
            &self.backend,
            &gpu.pipeline.texture_layout,
            self.toolkit.font_atlas_rgba32(),
        )?;
        let old = std::mem::replace(&mut gpu.font, font);
        old.destroy(&self.backend);

        self.toolkit.set_font_texture_id(TextureId::FONT_ATLAS);
        self.toolkit.clear_font_atlas_data();
        log::debug!("font atlas reloaded ({}x{})", gpu.font.size.0, gpu.font.size.1);
        Ok(())
    }

    #[inline]
    pub fn toolkit(&self) -> &T {
        &self.toolkit
    }

    #[inline]
    pub fn toolkit_mut(&mut self) -> &mut T {
        &mut self.toolkit
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    #[inline]
    pub fn phase(&self) -> FramePhase {
        self.phase
    }

    #[inline]
    pub fn framebuffer_size(&self) -> (u32, u32) {
        self.framebuffer_size
    }

    #[inline]
    pub fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    /// Bytes currently allocated for (vertex, index) data.
    pub fn buffer_capacity(&self) -> Option<(u64, u64)> {
        self.gpu
            .as_ref()
            .map(|gpu| (gpu.buffers.vertex().capacity(), gpu.buffers.index().capacity()))
    }

    #[inline]
    pub fn binding_count(&self) -> usize {
        self.registry.len()
    }

    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.gpu.is_none()
    }

    /// Releases every GPU resource and shuts the toolkit down.
    pub fn destroy(mut self) {
        self.release();
    }

    fn release(&mut self) {
        let Some(gpu) = self.gpu.take() else {
            return;
        };

        let bindings = self.registry.len();
        for binding in self.registry.drain() {
            self.backend.destroy_bind_group(binding);
        }
        gpu.font.destroy(&self.backend);
        gpu.buffers.destroy(&self.backend);
        gpu.pipeline.destroy(&self.backend);

        self.toolkit.shutdown();
        self.phase = FramePhase::Idle;
        log::info!("renderer destroyed ({bindings} texture binding(s) released)");
    }
}

impl<B: GpuBackend, T: UiToolkit> Drop for Renderer<B, T> {
    fn drop(&mut self) {
        self.release();
    }
}

fn sanitize_scale(scale: f32) -> f32 {
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        log::warn!("invalid scale factor {scale}; using 1.0");
        1.0
    }
}
