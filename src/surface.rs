use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use ratatui::style::Style;

use crate::ui::UiFrame;

/// Off-screen drawing area owned by one window.
///
/// Coordinates are local to the window. The display engine copies the
/// buffer onto the screen at the window's absolute offset after the
/// window's display handler ran.
#[derive(Debug, Clone)]
pub struct Surface {
    buffer: Buffer,
    cursor: Position,
    style: Style,
    cursor_visible: bool,
}

impl Surface {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            buffer: Buffer::empty(Rect::new(0, 0, width, height)),
            cursor: Position::ORIGIN,
            style: Style::default(),
            cursor_visible: false,
        }
    }

    pub fn width(&self) -> u16 {
        self.buffer.area.width
    }

    pub fn height(&self) -> u16 {
        self.buffer.area.height
    }

    pub fn area(&self) -> Rect {
        self.buffer.area
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut Buffer {
        &mut self.buffer
    }

    /// Clipping frame over the whole surface for rendering ratatui widgets.
    pub fn frame(&mut self) -> UiFrame<'_> {
        let area = self.buffer.area;
        UiFrame::from_parts(area, &mut self.buffer)
    }

    /// Move the cursor, clamped to the surface.
    pub fn move_to(&mut self, x: u16, y: u16) {
        self.cursor = Position {
            x: x.min(self.width().saturating_sub(1)),
            y: y.min(self.height().saturating_sub(1)),
        };
    }

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    /// Whether the terminal cursor should be parked on this surface's cursor
    /// when it is the last one composited.
    pub fn set_cursor_visible(&mut self, visible: bool) {
        self.cursor_visible = visible;
    }

    /// Style applied to subsequently printed characters.
    pub fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    pub fn style(&self) -> Style {
        self.style
    }

    /// Print `text` at the cursor, wrapping at the right edge.
    ///
    /// A newline clears the rest of the line and moves to the start of the
    /// next one. Output past the last line is dropped.
    pub fn print(&mut self, text: &str) {
        for ch in text.chars() {
            self.print_char(ch);
        }
    }

    pub fn print_char(&mut self, ch: char) {
        let (width, height) = (self.width(), self.height());
        if width == 0 || self.cursor.y >= height {
            return;
        }
        if ch == '\n' {
            self.clear_to_eol();
            self.advance_line();
            return;
        }
        let style = self.style;
        if let Some(cell) = self.buffer.cell_mut(self.cursor) {
            cell.set_char(ch).set_style(style);
        }
        if self.cursor.x + 1 >= width {
            self.advance_line();
        } else {
            self.cursor.x += 1;
        }
    }

    fn advance_line(&mut self) {
        if self.cursor.y + 1 < self.height() {
            self.cursor.y += 1;
            self.cursor.x = 0;
        } else {
            // Parked past the last line: further output is dropped.
            self.cursor.y = self.height();
            self.cursor.x = 0;
        }
    }

    fn clear_to_eol(&mut self) {
        let y = self.cursor.y;
        for x in self.cursor.x..self.width() {
            if let Some(cell) = self.buffer.cell_mut((x, y)) {
                cell.reset();
            }
        }
    }

    /// Blank the whole surface and home the cursor.
    pub fn clear(&mut self) {
        self.buffer.reset();
        self.cursor = Position::ORIGIN;
    }

    /// Blank everything from the start of the cursor line downwards.
    pub fn clear_from_cursor(&mut self) {
        let top = self.cursor.y.min(self.height());
        for y in top..self.height() {
            for x in 0..self.width() {
                if let Some(cell) = self.buffer.cell_mut((x, y)) {
                    cell.reset();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    fn row(surface: &Surface, y: u16) -> String {
        (0..surface.width())
            .map(|x| surface.buffer().cell((x, y)).unwrap().symbol().to_string())
            .collect()
    }

    #[test]
    fn print_advances_and_wraps() {
        let mut s = Surface::new(4, 2);
        s.print("abcdef");
        assert_eq!(row(&s, 0), "abcd");
        assert_eq!(row(&s, 1), "ef  ");
        assert_eq!(s.cursor(), Position { x: 2, y: 1 });
    }

    #[test]
    fn newline_clears_rest_of_line() {
        let mut s = Surface::new(5, 2);
        s.print("xxxxx");
        s.move_to(1, 0);
        s.print("a\nb");
        assert_eq!(row(&s, 0), "xa   ");
        assert_eq!(row(&s, 1), "b    ");
    }

    #[test]
    fn output_past_last_line_is_dropped() {
        let mut s = Surface::new(2, 1);
        s.print("abcd");
        assert_eq!(row(&s, 0), "ab");
    }

    #[test]
    fn print_uses_current_style() {
        let mut s = Surface::new(3, 1);
        s.set_style(Style::default().fg(Color::Red));
        s.print_char('r');
        assert_eq!(s.buffer().cell((0, 0)).unwrap().fg, Color::Red);
    }

    #[test]
    fn move_to_is_clamped() {
        let mut s = Surface::new(3, 2);
        s.move_to(10, 10);
        assert_eq!(s.cursor(), Position { x: 2, y: 1 });
    }

    #[test]
    fn clear_from_cursor_keeps_lines_above() {
        let mut s = Surface::new(2, 3);
        s.print("aabbcc");
        s.move_to(0, 1);
        s.clear_from_cursor();
        assert_eq!(row(&s, 0), "aa");
        assert_eq!(row(&s, 1), "  ");
        assert_eq!(row(&s, 2), "  ");
        s.clear();
        assert_eq!(row(&s, 0), "  ");
        assert_eq!(s.cursor(), Position::ORIGIN);
    }
}
