mod gpu;
mod input;
mod overlay;

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use imdraw_engine::gpu::webgpu::{WgpuBackend, WgpuRecorder};
use imdraw_engine::logging::{init_logging, LoggingConfig};
use imdraw_engine::{Renderer, RendererConfig};

use crate::gpu::{FrameOutcome, SurfaceOptions, WindowGpu};
use crate::input::translate_input_event;
use crate::overlay::Overlay;

const CHECKER_SIZE: u32 = 64;
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.08,
    g: 0.09,
    b: 0.11,
    a: 1.0,
};

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
    let mut app = DemoApp::default();
    event_loop
        .run_app(&mut app)
        .context("winit event loop terminated with error")?;

    match app.error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct DemoState {
    window: Arc<Window>,
    gpu: WindowGpu,
    renderer: Renderer<WgpuBackend, Overlay>,
    checker: wgpu::Texture,
    last_frame: Instant,
}

#[derive(Default)]
struct DemoApp {
    state: Option<DemoState>,
    error: Option<anyhow::Error>,
}

impl DemoApp {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.shutdown();
        self.error = Some(err);
        event_loop.exit();
    }

    fn shutdown(&mut self) {
        if let Some(state) = self.state.take() {
            let DemoState { renderer, checker, .. } = state;
            renderer.destroy();
            checker.destroy();
        }
    }
}

impl DemoState {
    fn new(event_loop: &ActiveEventLoop) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("imdraw demo")
            .with_inner_size(LogicalSize::new(960.0, 600.0));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let gpu = pollster::block_on(WindowGpu::new(Arc::clone(&window), SurfaceOptions::default()))?;
        let backend = WgpuBackend::new(gpu.device(), gpu.queue(), gpu.surface_format());
        let checker = backend
            .create_rgba_texture("checkerboard", CHECKER_SIZE, CHECKER_SIZE, &checkerboard(CHECKER_SIZE))
            .context("failed to create checkerboard texture")?;

        let scale = window.scale_factor() as f32;
        let size = gpu.size();
        let mut renderer = Renderer::new(
            backend,
            Overlay::new(scale),
            RendererConfig::standalone(),
            (size.width, size.height),
            scale,
        )
        .context("failed to create UI renderer")?;

        let image = renderer
            .get_or_create_binding(&checker)
            .context("failed to register checkerboard")?;
        renderer.toolkit_mut().set_image(image);

        Ok(Self {
            window,
            gpu,
            renderer,
            checker,
            last_frame: Instant::now(),
        })
    }

    fn redraw(&mut self) -> Result<()> {
        let mut frame = match self.gpu.acquire() {
            Ok(frame) => frame,
            Err(e) => {
                return match self.gpu.recover(e) {
                    FrameOutcome::Fatal => Err(anyhow::anyhow!("surface out of memory")),
                    outcome => {
                        log::debug!("frame skipped: {outcome:?}");
                        Ok(())
                    }
                };
            }
        };

        let now = Instant::now();
        self.renderer.update(now - self.last_frame)?;
        self.last_frame = now;

        // Clear; the UI pass loads on top of this.
        drop(frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("imdraw-demo clear"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &frame.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        }));

        {
            let mut recorder = WgpuRecorder::new(self.gpu.queue(), &mut frame.encoder);
            self.renderer
                .render(&mut recorder, &frame.view)
                .context("failed to record UI frame")?;
        }

        self.gpu.present(frame);
        Ok(())
    }

    fn rescale(&mut self, scale: f64) -> Result<()> {
        let size = self.window.inner_size();
        self.gpu.resize(size);
        self.renderer.resize(size.width, size.height);
        self.renderer.set_scale_factor(scale as f32);
        self.renderer.toolkit_mut().rebuild_atlas(scale as f32);
        self.renderer
            .reload_font_texture()
            .context("failed to reload font atlas")
    }
}

impl ApplicationHandler for DemoApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        match DemoState::new(event_loop) {
            Ok(state) => {
                state.window.request_redraw();
                self.state = Some(state);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        if let Some(ev) = translate_input_event(state.window.scale_factor(), &event) {
            state.renderer.handle_input(&ev);
        }

        let result = match event {
            WindowEvent::CloseRequested => {
                self.shutdown();
                event_loop.exit();
                return;
            }
            WindowEvent::Resized(size) => {
                state.gpu.resize(size);
                state.renderer.resize(size.width, size.height);
                state.window.request_redraw();
                Ok(())
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => state.rescale(scale_factor),
            WindowEvent::RedrawRequested => {
                if state.gpu.is_drawable() {
                    state.redraw()
                } else {
                    Ok(())
                }
            }
            _ => Ok(()),
        };

        if let Err(e) = result {
            self.fail(event_loop, e);
        }
    }
}

/// Two-tone RGBA8 checkerboard with 8-pixel cells.
fn checkerboard(size: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let light = ((x / 8) + (y / 8)) % 2 == 0;
            let v = if light { 220 } else { 60 };
            pixels.extend_from_slice(&[v, v, v, 255]);
        }
    }
    pixels
}
