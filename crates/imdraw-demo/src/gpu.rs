use std::sync::Arc;

use anyhow::{Context, Result};
use wgpu::SurfaceError;
use winit::dpi::PhysicalSize;
use winit::window::Window;

/// How the demo window's swapchain is configured.
#[derive(Debug, Clone)]
pub struct SurfaceOptions {
    /// Pick an sRGB format when the surface offers one.
    pub prefer_srgb: bool,

    /// Requested present mode. Falls back to FIFO, which every surface
    /// supports.
    pub present_mode: wgpu::PresentMode,

    /// Frame latency hint passed straight to the surface.
    pub frame_latency: u32,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            frame_latency: 2,
        }
    }
}

/// Device, queue and the swapchain of one window.
///
/// Holding an `Arc<Window>` makes the surface `'static`, so it can sit in the
/// same struct as the window.
pub struct WindowGpu {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
}

/// A swapchain image acquired for one redraw, with its encoder.
///
/// Present it promptly: while it is alive no further image can be acquired.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

/// What the redraw loop does after a failed acquire.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameOutcome {
    /// The surface was configured again; the next redraw should succeed.
    Reconfigured,
    /// Drop this redraw and try the next one.
    Skip,
    /// Out of memory. The demo exits.
    Fatal,
}

impl WindowGpu {
    pub async fn new(window: Arc<Window>, options: SurfaceOptions) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no GPU adapter can present to this window")?;
        log::info!("adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("imdraw-demo device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to open the GPU device")?;

        let caps = surface.get_capabilities(&adapter);
        let config = surface_config(&caps, &options, size).context("surface offers no formats")?;
        surface.configure(&device, &config);
        log::info!(
            "surface configured: {:?} {:?}, {}x{}",
            config.format,
            config.present_mode,
            size.width,
            size.height
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
        })
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// False while the window is minimized to zero size.
    pub fn is_drawable(&self) -> bool {
        self.size.width > 0 && self.size.height > 0
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Tracks the new size. The surface is only configured again once the
    /// window has a drawable area.
    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.size = size;
        if self.is_drawable() {
            self.config.width = size.width;
            self.config.height = size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    pub fn acquire(&self) -> std::result::Result<GpuFrame, SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("imdraw-demo frame encoder"),
            });
        Ok(GpuFrame {
            surface_texture,
            view,
            encoder,
        })
    }

    pub fn present(&self, frame: GpuFrame) {
        let GpuFrame {
            surface_texture,
            view,
            encoder,
        } = frame;
        self.queue.submit(std::iter::once(encoder.finish()));
        drop(view);
        surface_texture.present();
    }

    /// Applies the recovery for `err` and reports how the loop continues.
    pub fn recover(&mut self, err: SurfaceError) -> FrameOutcome {
        let outcome = outcome_of(&err);
        if outcome == FrameOutcome::Reconfigured && self.is_drawable() {
            self.surface.configure(&self.device, &self.config);
        }
        outcome
    }
}

fn outcome_of(err: &SurfaceError) -> FrameOutcome {
    match err {
        SurfaceError::Lost | SurfaceError::Outdated => FrameOutcome::Reconfigured,
        SurfaceError::OutOfMemory => FrameOutcome::Fatal,
        SurfaceError::Timeout | SurfaceError::Other => FrameOutcome::Skip,
    }
}

fn surface_config(
    caps: &wgpu::SurfaceCapabilities,
    options: &SurfaceOptions,
    size: PhysicalSize<u32>,
) -> Option<wgpu::SurfaceConfiguration> {
    let format = if options.prefer_srgb {
        caps.formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
    } else {
        caps.formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| caps.formats.first().copied())
    }?;

    let present_mode = if caps.present_modes.contains(&options.present_mode) {
        options.present_mode
    } else {
        wgpu::PresentMode::Fifo
    };

    Some(wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width: size.width,
        height: size.height,
        present_mode,
        alpha_mode: caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto),
        view_formats: vec![],
        desired_maximum_frame_latency: options.frame_latency,
    })
}
