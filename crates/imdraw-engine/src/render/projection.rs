use bytemuck::{Pod, Zeroable};

/// Per-frame constant buffer contents (column-major `mat4x4<f32>`).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ProjectionUniform {
    pub mvp: [[f32; 4]; 4],
}

pub const PROJECTION_UNIFORM_SIZE: u64 = std::mem::size_of::<ProjectionUniform>() as u64;

/// Orthographic projection over `[0, w] × [0, h]` with the origin top-left
/// and +Y down. Depth range `[-1, 1]` maps onto clip-space z `[0, 1]`.
pub fn ortho_projection(display_size: [f32; 2]) -> ProjectionUniform {
    let (l, r) = (0.0, display_size[0].max(1.0));
    let (t, b) = (0.0, display_size[1].max(1.0));
    let (near, far) = (-1.0f32, 1.0f32);

    ProjectionUniform {
        mvp: [
            [2.0 / (r - l), 0.0, 0.0, 0.0],
            [0.0, 2.0 / (t - b), 0.0, 0.0],
            [0.0, 0.0, 1.0 / (near - far), 0.0],
            [(l + r) / (l - r), (t + b) / (b - t), near / (near - far), 1.0],
        ],
    }
}
