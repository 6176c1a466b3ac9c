use std::time::Duration;

use crate::gpu::{BlendMode, CullMode, SamplerKind};

/// Renderer configuration.
///
/// The presets cover the two ways the renderer is embedded: owning the
/// window's input (`standalone`) or drawing an overlay whose input is routed
/// elsewhere (`embedded`).
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Forward `InputEvent`s passed to `Renderer::handle_input` to the toolkit.
    pub input_wiring: bool,

    pub blend: BlendMode,
    pub cull: CullMode,
    pub sampler: SamplerKind,

    /// Vertex buffer size before the first growth, in bytes.
    pub initial_vertex_bytes: u64,
    /// Index buffer size before the first growth, in bytes.
    pub initial_index_bytes: u64,

    /// Delta time reported to the toolkit when `update` is given zero.
    pub delta_time_fallback: Duration,
}

impl RendererConfig {
    pub fn standalone() -> Self {
        Self {
            input_wiring: true,
            ..Self::default()
        }
    }

    pub fn embedded() -> Self {
        Self {
            input_wiring: false,
            ..Self::default()
        }
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            input_wiring: true,
            blend: BlendMode::AlphaBlend,
            cull: CullMode::None,
            sampler: SamplerKind::PointClamp,
            initial_vertex_bytes: 10_000,
            initial_index_bytes: 2_000,
            delta_time_fallback: Duration::from_secs_f32(1.0 / 60.0),
        }
    }
}
