//! Renderer core.
//!
//! - `registry`: texture → binding cache handing out `TextureId`s
//! - `buffers`: growable vertex/index buffers and per-frame upload
//! - `translator`: draw stream → scissor / bind / draw-indexed commands
//! - `pipeline`: one-time pipeline, layouts, sampler and font atlas setup
//! - `renderer`: the `Renderer` facade tying them to a toolkit

mod buffers;
mod config;
mod pipeline;
mod projection;
mod registry;
mod renderer;
mod translator;

pub use buffers::{FrameBuffers, GpuBuffer};
pub use config::RendererConfig;
pub use projection::{ortho_projection, ProjectionUniform, PROJECTION_UNIFORM_SIZE};
pub use registry::BindingRegistry;
pub use renderer::Renderer;
pub use translator::{FramePhase, FrameStats};
