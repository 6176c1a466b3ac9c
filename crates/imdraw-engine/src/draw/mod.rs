//! Draw stream types produced by the UI toolkit once per frame.
//!
//! Conventions:
//! - clip rects are in toolkit space (logical pixels, top-left origin)
//! - scissor rects are in backend pixels (clip rect × framebuffer scale)
//! - nothing here outlives the frame that produced it

mod clip;
mod list;
mod texture_id;
mod vertex;

pub use clip::{ClipRect, ScissorRect};
pub use list::{DrawCmd, DrawData, DrawList};
pub use texture_id::TextureId;
pub use vertex::{DrawIdx, DrawVert, INDEX_FORMAT};
