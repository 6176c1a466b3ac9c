//! wgpu implementation of the backend seam.

mod backend;
mod recorder;

pub use backend::WgpuBackend;
pub use recorder::WgpuRecorder;
