//! Seam to the immediate-mode UI toolkit.
//!
//! The renderer never builds UI itself. Each frame it hands the toolkit a
//! `FrameIo`, later asks for the finished `DrawData`, and once at setup (or
//! after an atlas invalidation) pulls the font atlas pixels.

mod input;

pub use input::{ButtonState, InputEvent, Modifiers, PointerButton, WheelDelta};

use crate::draw::{DrawData, TextureId};
use crate::error::{RenderError, Result};

/// Per-frame state pushed into the toolkit by `Renderer::update`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameIo {
    /// Display size in toolkit space (framebuffer size / scale).
    pub display_size: [f32; 2],
    pub framebuffer_scale: [f32; 2],
    /// Seconds since the previous frame. Always > 0.
    pub delta_time: f32,
}

/// Borrowed RGBA32 font atlas pixels.
#[derive(Debug, Copy, Clone)]
pub struct FontAtlasImage<'a> {
    pub width: u32,
    pub height: u32,
    pub bytes_per_pixel: u32,
    pub pixels: &'a [u8],
}

impl FontAtlasImage<'_> {
    /// Checks that the pixel buffer is non-empty RGBA8 of exactly `width × height`.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidFontAtlas(format!(
                "zero-sized atlas ({}x{})",
                self.width, self.height
            )));
        }
        if self.bytes_per_pixel != 4 {
            return Err(RenderError::InvalidFontAtlas(format!(
                "expected 4 bytes per pixel, got {}",
                self.bytes_per_pixel
            )));
        }

        let expected = (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|n| n.checked_mul(4));

        match expected {
            Some(len) if len == self.pixels.len() => Ok(()),
            Some(len) => Err(RenderError::InvalidFontAtlas(format!(
                "expected {len} bytes, got {}",
                self.pixels.len()
            ))),
            None => Err(RenderError::InvalidFontAtlas("atlas size overflows".into())),
        }
    }
}

/// Immediate-mode UI library driven by the renderer.
///
/// Call order per frame: `new_frame` → (application builds UI) → `render`.
pub trait UiToolkit {
    /// Starts a toolkit frame.
    fn new_frame(&mut self, io: FrameIo);

    /// Ends the toolkit frame and returns its draw stream.
    fn render(&mut self) -> &DrawData;

    /// Font atlas pixels as RGBA32.
    fn font_atlas_rgba32(&mut self) -> FontAtlasImage<'_>;

    /// Tells the toolkit which handle to emit for font atlas draws.
    fn set_font_texture_id(&mut self, id: TextureId);

    /// Releases CPU-side atlas pixels once they are on the GPU.
    fn clear_font_atlas_data(&mut self) {}

    /// Forwards a platform input event.
    fn handle_input(&mut self, event: &InputEvent) {
        let _ = event;
    }

    /// Tears down the toolkit context. Called once by renderer teardown.
    fn shutdown(&mut self) {}
}
