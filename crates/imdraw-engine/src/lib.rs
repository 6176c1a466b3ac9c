//! imdraw engine crate.
//!
//! Bridges an immediate-mode UI toolkit's per-frame draw stream to a
//! retained-mode GPU backend. The toolkit and the backend are both seams
//! (`toolkit::UiToolkit`, `gpu::GpuBackend`); wgpu is the shipped backend.

pub mod draw;
pub mod error;
pub mod gpu;
pub mod logging;
pub mod render;
pub mod toolkit;

#[cfg(test)]
mod testing;

pub use error::{RenderError, Result};
pub use render::{Renderer, RendererConfig};
