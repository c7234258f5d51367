//! FrameBuffer - 2D grid of terminal cells.
//!
//! The painter draws into a FrameBuffer every frame; the diff renderer
//! compares it with the previous one and writes only what changed.

use crate::layout::{char_width, string_width};
use crate::types::{Attr, BorderStyle, Cell, Rect, Rgba};

/// Marks the second column of a wide character.
pub const CONTINUATION: char = '\0';

#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width as usize * height as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        if self.in_bounds(x, y) {
            let idx = self.index(x, y);
            Some(&mut self.cells[idx])
        } else {
            None
        }
    }

    /// Reset every cell to a blank default cell.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    /// Resize and clear. No-op when the size is unchanged.
    pub fn resize(&mut self, width: u16, height: u16) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        *self = Self::new(width, height);
    }

    // =========================================================================
    // Drawing Primitives
    // =========================================================================

    /// Set a single cell. `bg: None` keeps the existing background.
    ///
    /// Returns true if the cell was set.
    pub fn set_cell(
        &mut self,
        x: u16,
        y: u16,
        ch: char,
        fg: Rgba,
        bg: Option<Rgba>,
        attrs: Attr,
        clip: Option<&Rect>,
    ) -> bool {
        if clip.is_some_and(|c| !c.contains(x, y)) {
            return false;
        }
        let Some(cell) = self.get_mut(x, y) else {
            return false;
        };
        cell.ch = ch;
        cell.fg = fg;
        if let Some(bg) = bg {
            cell.bg = bg;
        }
        cell.attrs = attrs;
        true
    }

    /// Fill a rectangle with blanks on a background color.
    pub fn fill_rect(&mut self, rect: Rect, bg: Rgba) {
        let x2 = rect.x.saturating_add(rect.width).min(self.width);
        let y2 = rect.y.saturating_add(rect.height).min(self.height);
        for y in rect.y..y2 {
            for x in rect.x..x2 {
                let idx = self.index(x, y);
                self.cells[idx] = Cell {
                    bg,
                    ..Cell::default()
                };
            }
        }
    }

    /// Draw text at a position.
    ///
    /// Returns the number of columns used (wide characters take two).
    pub fn draw_text(
        &mut self,
        x: u16,
        y: u16,
        text: &str,
        fg: Rgba,
        bg: Option<Rgba>,
        attrs: Attr,
        clip: Option<&Rect>,
    ) -> u16 {
        let mut col = x;
        for ch in text.chars() {
            if col >= self.width {
                break;
            }
            let w = char_width(ch);
            if w == 0 {
                continue;
            }
            if self.set_cell(col, y, ch, fg, bg, attrs, clip) && w == 2 {
                self.set_cell(col + 1, y, CONTINUATION, fg, bg, attrs, clip);
            }
            col = col.saturating_add(w);
        }
        col.saturating_sub(x)
    }

    /// Draw text centered within `width` columns starting at `x`.
    pub fn draw_text_centered(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        text: &str,
        fg: Rgba,
        bg: Option<Rgba>,
        attrs: Attr,
        clip: Option<&Rect>,
    ) -> u16 {
        let offset = width.saturating_sub(string_width(text)) / 2;
        self.draw_text(x + offset, y, text, fg, bg, attrs, clip)
    }

    /// Draw a border around a rectangle.
    pub fn draw_border(&mut self, rect: Rect, style: BorderStyle, fg: Rgba, attrs: Attr) {
        if style == BorderStyle::None || rect.width < 2 || rect.height < 2 {
            return;
        }
        let (h, v, tl, tr, br, bl) = style.chars();
        let right = rect.x + rect.width - 1;
        let bottom = rect.y + rect.height - 1;

        for x in rect.x + 1..right {
            self.set_cell(x, rect.y, h, fg, None, attrs, None);
            self.set_cell(x, bottom, h, fg, None, attrs, None);
        }
        for y in rect.y + 1..bottom {
            self.set_cell(rect.x, y, v, fg, None, attrs, None);
            self.set_cell(right, y, v, fg, None, attrs, None);
        }
        self.set_cell(rect.x, rect.y, tl, fg, None, attrs, None);
        self.set_cell(right, rect.y, tr, fg, None, attrs, None);
        self.set_cell(right, bottom, br, fg, None, attrs, None);
        self.set_cell(rect.x, bottom, bl, fg, None, attrs, None);
    }

    /// Characters of one row, continuation cells skipped (for testing).
    pub fn row_text(&self, y: u16) -> String {
        (0..self.width)
            .filter_map(|x| self.get(x, y))
            .map(|c| c.ch)
            .filter(|&c| c != CONTINUATION)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_text_clips_to_width() {
        let mut buf = FrameBuffer::new(5, 1);
        let used = buf.draw_text(2, 0, "abcdef", Rgba::WHITE, None, Attr::NONE, None);
        assert_eq!(used, 3);
        assert_eq!(buf.row_text(0), "  abc");
    }

    #[test]
    fn test_wide_char_continuation() {
        let mut buf = FrameBuffer::new(4, 1);
        buf.draw_text(0, 0, "日x", Rgba::WHITE, None, Attr::NONE, None);
        assert_eq!(buf.get(1, 0).map(|c| c.ch), Some(CONTINUATION));
        assert_eq!(buf.row_text(0), "日x ");
    }

    #[test]
    fn test_clip_rect() {
        let mut buf = FrameBuffer::new(6, 1);
        let clip = Rect::new(1, 0, 2, 1);
        buf.draw_text(0, 0, "abcd", Rgba::WHITE, None, Attr::NONE, Some(&clip));
        assert_eq!(buf.row_text(0), " bc   ");
    }

    #[test]
    fn test_border_and_fill() {
        let mut buf = FrameBuffer::new(5, 3);
        buf.fill_rect(Rect::new(0, 0, 5, 3), Rgba::BLACK);
        buf.draw_border(Rect::new(0, 0, 5, 3), BorderStyle::Rounded, Rgba::WHITE, Attr::NONE);
        assert_eq!(buf.row_text(0), "╭───╮");
        assert_eq!(buf.row_text(1), "│   │");
        assert_eq!(buf.row_text(2), "╰───╯");
        // Border keeps the fill background
        assert_eq!(buf.get(0, 0).map(|c| c.bg), Some(Rgba::BLACK));
    }

    #[test]
    fn test_resize_clears() {
        let mut buf = FrameBuffer::new(2, 2);
        buf.draw_text(0, 0, "x", Rgba::WHITE, None, Attr::NONE, None);
        buf.resize(2, 2);
        assert_eq!(buf.row_text(0), "x ");
        buf.resize(3, 1);
        assert_eq!(buf.row_text(0), "   ");
    }
}
