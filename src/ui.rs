//! UiFrame: a thin wrapper around a `ratatui` buffer that clamps drawing to
//! the visible area and centralizes clipping logic.
//!
//! Window display handlers draw into their own off-screen surface through a
//! `UiFrame`, and the display engine composites those surfaces into the
//! screen buffer with [`UiFrame::blit_at`]. Rectangles that drift partially
//! or fully outside the target are clipped instead of panicking inside
//! `Buffer`.
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::Widget;

/// Wrapper around a buffer that clamps drawing to the visible area.
pub struct UiFrame<'a> {
    area: Rect,
    buffer: &'a mut Buffer,
}

impl<'a> UiFrame<'a> {
    pub fn new(frame: &'a mut Frame<'_>) -> Self {
        let area = frame.area();
        let buffer = frame.buffer_mut();
        Self { area, buffer }
    }

    /// Construct a `UiFrame` directly from an area and buffer.
    pub fn from_parts(area: Rect, buffer: &'a mut Buffer) -> Self {
        Self { area, buffer }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn buffer_mut(&mut self) -> &mut Buffer {
        self.buffer
    }

    fn clip_rect(&self, rect: Rect) -> Option<Rect> {
        let clipped = rect.intersection(self.area);
        if clipped.width == 0 || clipped.height == 0 {
            None
        } else {
            Some(clipped)
        }
    }

    pub fn render_widget<W>(&mut self, widget: W, area: Rect)
    where
        W: Widget,
    {
        if let Some(clipped) = self.clip_rect(area) {
            widget.render(clipped, self.buffer);
        }
    }

    /// Copy the overlapping region of `src` onto the same coordinates.
    pub fn blit_from(&mut self, src: &Buffer, src_area: Rect) {
        let overlap = src_area.intersection(self.area);
        if overlap.width == 0 || overlap.height == 0 {
            return;
        }
        for y in overlap.y..overlap.y.saturating_add(overlap.height) {
            for x in overlap.x..overlap.x.saturating_add(overlap.width) {
                if let (Some(src_cell), Some(dst_cell)) =
                    (src.cell((x, y)), self.buffer.cell_mut((x, y)))
                {
                    *dst_cell = src_cell.clone();
                }
            }
        }
    }

    /// Copy `src` (whose area starts at its own origin) so that its top-left
    /// cell lands at the signed screen position `(dest_x, dest_y)`.
    pub fn blit_at(&mut self, src: &Buffer, dest_x: i32, dest_y: i32) {
        let frame_x0 = self.area.x as i32;
        let frame_y0 = self.area.y as i32;
        let frame_x1 = frame_x0 + self.area.width as i32;
        let frame_y1 = frame_y0 + self.area.height as i32;
        let src_area = src.area;
        for sy in 0..src_area.height as i32 {
            let dy = dest_y + sy;
            if dy < frame_y0 || dy >= frame_y1 {
                continue;
            }
            for sx in 0..src_area.width as i32 {
                let dx = dest_x + sx;
                if dx < frame_x0 || dx >= frame_x1 {
                    continue;
                }
                let src_pos = (src_area.x + sx as u16, src_area.y + sy as u16);
                if let (Some(src_cell), Some(dst_cell)) =
                    (src.cell(src_pos), self.buffer.cell_mut((dx as u16, dy as u16)))
                {
                    *dst_cell = src_cell.clone();
                }
            }
        }
    }

    /// Reset every cell of `rect` (clipped) to a blank cell.
    pub fn clear_rect(&mut self, rect: Rect) {
        let Some(clipped) = self.clip_rect(rect) else {
            return;
        };
        for y in clipped.y..clipped.y.saturating_add(clipped.height) {
            for x in clipped.x..clipped.x.saturating_add(clipped.width) {
                if let Some(cell) = self.buffer.cell_mut((x, y)) {
                    cell.reset();
                }
            }
        }
    }
}
