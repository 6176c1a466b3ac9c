/// Clip rectangle in toolkit space, stored as min/max corners.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ClipRect {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl ClipRect {
    #[inline]
    pub const fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    #[inline]
    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    #[inline]
    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Converts to a backend scissor rect.
    ///
    /// Coordinates are scaled by `scale`, truncated toward zero and clamped to
    /// `extent` (framebuffer size in backend pixels). A clip rect entirely
    /// outside the framebuffer yields an empty scissor.
    pub fn to_scissor(self, scale: [f32; 2], extent: (u32, u32)) -> ScissorRect {
        let (ext_w, ext_h) = (extent.0 as f32, extent.1 as f32);

        let x0 = (self.min_x * scale[0]).max(0.0).min(ext_w);
        let y0 = (self.min_y * scale[1]).max(0.0).min(ext_h);
        let x1 = (self.max_x * scale[0]).min(ext_w);
        let y1 = (self.max_y * scale[1]).min(ext_h);

        ScissorRect {
            x: x0 as u32,
            y: y0 as u32,
            width: (x1 - x0).max(0.0) as u32,
            height: (y1 - y0).max(0.0) as u32,
        }
    }
}

/// Scissor rectangle in backend pixels (x, y, width, height).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ScissorRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ScissorRect {
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}
