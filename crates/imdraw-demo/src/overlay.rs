use imdraw_engine::draw::{ClipRect, DrawData, DrawIdx, DrawList, DrawVert, TextureId};
use imdraw_engine::toolkit::{ButtonState, FontAtlasImage, FrameIo, InputEvent, UiToolkit};

const PANEL_MIN: [f32; 2] = [24.0, 24.0];
const PANEL_MAX: [f32; 2] = [344.0, 264.0];
const HEADER_HEIGHT: f32 = 28.0;
const IMAGE_SIZE: f32 = 128.0;

/// Logical edge length of the generated atlas at scale 1.
const ATLAS_BASE: f32 = 8.0;

/// A scripted stand-in for an immediate-mode toolkit.
///
/// Emits a panel (header, progress bar) in the first draw list and, once an
/// image handle is set, a textured quad in the second. The "font atlas" is a
/// white square sampled for every solid fill.
pub struct Overlay {
    draw_data: DrawData,
    font_id: TextureId,
    image: Option<TextureId>,

    atlas: Vec<u8>,
    atlas_size: u32,

    pointer: Option<[f32; 2]>,
    pressed: bool,
    elapsed: f32,
}

impl Overlay {
    pub fn new(scale_factor: f32) -> Self {
        let mut overlay = Self {
            draw_data: DrawData::default(),
            font_id: TextureId::NULL,
            image: None,
            atlas: Vec::new(),
            atlas_size: 0,
            pointer: None,
            pressed: false,
            elapsed: 0.0,
        };
        overlay.rebuild_atlas(scale_factor);
        overlay
    }

    /// Regenerates atlas pixels for a new display scale.
    pub fn rebuild_atlas(&mut self, scale_factor: f32) {
        let size = (ATLAS_BASE * scale_factor.max(1.0)).ceil() as u32;
        self.atlas = vec![0xff; (size * size * 4) as usize];
        self.atlas_size = size;
    }

    pub fn set_image(&mut self, id: TextureId) {
        self.image = Some(id);
    }

    fn header_hovered(&self) -> bool {
        self.pointer.is_some_and(|[x, y]| {
            x >= PANEL_MIN[0]
                && x < PANEL_MAX[0]
                && y >= PANEL_MIN[1]
                && y < PANEL_MIN[1] + HEADER_HEIGHT
        })
    }

    fn build_panel(&self, list: &mut DrawList) {
        let clip = ClipRect::new(PANEL_MIN[0], PANEL_MIN[1], PANEL_MAX[0], PANEL_MAX[1]);
        let white = [0.5, 0.5];
        let mut count = 0;

        count += push_rect(list, PANEL_MIN, PANEL_MAX, [white, white], rgba(28, 30, 36, 230));

        let header = match (self.header_hovered(), self.pressed) {
            (true, true) => rgba(90, 140, 230, 255),
            (true, false) => rgba(70, 110, 190, 255),
            _ => rgba(50, 80, 140, 255),
        };
        let header_max = [PANEL_MAX[0], PANEL_MIN[1] + HEADER_HEIGHT];
        count += push_rect(list, PANEL_MIN, header_max, [white, white], header);

        let progress = self.elapsed.fract();
        let bar_min = [PANEL_MIN[0] + 12.0, PANEL_MAX[1] - 24.0];
        let bar_max = [
            bar_min[0] + (PANEL_MAX[0] - PANEL_MIN[0] - 24.0) * progress,
            PANEL_MAX[1] - 12.0,
        ];
        count += push_rect(list, bar_min, bar_max, [white, white], rgba(120, 200, 120, 255));

        list.push_command(count, clip, self.font_id);
    }

    fn build_image(&self, list: &mut DrawList, image: TextureId) {
        let min = [PANEL_MIN[0] + 12.0, PANEL_MIN[1] + HEADER_HEIGHT + 12.0];
        let max = [min[0] + IMAGE_SIZE, min[1] + IMAGE_SIZE];
        let clip = ClipRect::new(PANEL_MIN[0], PANEL_MIN[1], PANEL_MAX[0], PANEL_MAX[1]);

        let count = push_rect(list, min, max, [[0.0, 0.0], [1.0, 1.0]], rgba(255, 255, 255, 255));
        list.push_command(count, clip, image);
    }
}

impl UiToolkit for Overlay {
    fn new_frame(&mut self, io: FrameIo) {
        self.elapsed += io.delta_time;
        self.draw_data.display_size = io.display_size;
        self.draw_data.framebuffer_scale = io.framebuffer_scale;
    }

    fn render(&mut self) -> &DrawData {
        let mut lists = std::mem::take(&mut self.draw_data.draw_lists);
        lists.resize_with(2, DrawList::new);
        lists.iter_mut().for_each(DrawList::clear);

        self.build_panel(&mut lists[0]);
        match self.image {
            Some(image) => self.build_image(&mut lists[1], image),
            None => {
                lists.truncate(1);
            }
        }

        self.draw_data.draw_lists = lists;
        &self.draw_data
    }

    fn font_atlas_rgba32(&mut self) -> FontAtlasImage<'_> {
        FontAtlasImage {
            width: self.atlas_size,
            height: self.atlas_size,
            bytes_per_pixel: 4,
            pixels: &self.atlas,
        }
    }

    fn set_font_texture_id(&mut self, id: TextureId) {
        self.font_id = id;
    }

    fn clear_font_atlas_data(&mut self) {
        self.atlas = Vec::new();
    }

    fn handle_input(&mut self, event: &InputEvent) {
        match event {
            InputEvent::PointerMoved { x, y } => self.pointer = Some([*x, *y]),
            InputEvent::PointerLeft => self.pointer = None,
            InputEvent::PointerButton { state, .. } => {
                self.pressed = *state == ButtonState::Pressed;
            }
            _ => {}
        }
    }

    fn shutdown(&mut self) {
        log::debug!("overlay shut down after {:.1}s", self.elapsed);
    }
}

#[inline]
fn rgba(r: u8, g: u8, b: u8, a: u8) -> u32 {
    DrawVert::pack_rgba(r, g, b, a)
}

/// Appends a quad; returns its index count.
fn push_rect(list: &mut DrawList, min: [f32; 2], max: [f32; 2], uv: [[f32; 2]; 2], col: u32) -> u32 {
    let base = list.vtx_buffer.len() as DrawIdx;
    let [uv0, uv1] = uv;

    list.vtx_buffer.extend_from_slice(&[
        DrawVert::new([min[0], min[1]], [uv0[0], uv0[1]], col),
        DrawVert::new([max[0], min[1]], [uv1[0], uv0[1]], col),
        DrawVert::new([max[0], max[1]], [uv1[0], uv1[1]], col),
        DrawVert::new([min[0], max[1]], [uv0[0], uv1[1]], col),
    ]);
    list.idx_buffer
        .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    6
}
