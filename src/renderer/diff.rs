//! Differential renderer for fullscreen mode.
//!
//! The DiffRenderer compares the current frame to the previous frame and only
//! outputs cells that have changed.
//!
//! # Algorithm
//!
//! 1. Wrap output in a synchronized update
//! 2. For each cell in the new frame:
//!    - If previous frame exists and cell is unchanged: skip
//!    - Otherwise: move (if not sequential), restyle (if changed), print
//! 3. Flush the queued commands in one write
//! 4. Store current frame as previous for next comparison

use std::io::{self, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::{Attribute, Color, Print, SetAttribute, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{
    BeginSynchronizedUpdate, Clear, ClearType, EndSynchronizedUpdate, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::queue;

use super::buffer::{FrameBuffer, CONTINUATION};
use crate::types::{Attr, Cell, Rgba};

/// Map a cell color onto the terminal's color model.
pub fn to_color(color: Rgba) -> Color {
    if color.is_terminal_default() {
        Color::Reset
    } else if color.is_ansi() {
        Color::AnsiValue(color.ansi_index())
    } else {
        Color::Rgb {
            r: color.r.clamp(0, 255) as u8,
            g: color.g.clamp(0, 255) as u8,
            b: color.b.clamp(0, 255) as u8,
        }
    }
}

fn queue_attrs<W: Write>(out: &mut W, attrs: Attr) -> io::Result<()> {
    queue!(out, SetAttribute(Attribute::Reset))?;
    let pairs = [
        (Attr::BOLD, Attribute::Bold),
        (Attr::DIM, Attribute::Dim),
        (Attr::ITALIC, Attribute::Italic),
        (Attr::UNDERLINE, Attribute::Underlined),
        (Attr::BLINK, Attribute::SlowBlink),
        (Attr::INVERSE, Attribute::Reverse),
    ];
    for (flag, attribute) in pairs {
        if attrs.contains(flag) {
            queue!(out, SetAttribute(attribute))?;
        }
    }
    Ok(())
}

/// Tracks the terminal's pen so only changed state is emitted.
#[derive(Debug, Default)]
struct Pen {
    pos: Option<(u16, u16)>,
    fg: Option<Rgba>,
    bg: Option<Rgba>,
    attrs: Attr,
}

impl Pen {
    fn draw<W: Write>(&mut self, out: &mut W, x: u16, y: u16, cell: &Cell) -> io::Result<()> {
        if cell.ch == CONTINUATION {
            self.pos = Some((x, y));
            return Ok(());
        }

        let sequential = self.pos.is_some_and(|(px, py)| py == y && px + 1 == x);
        if !sequential {
            queue!(out, MoveTo(x, y))?;
        }

        if cell.attrs != self.attrs {
            queue_attrs(out, cell.attrs)?;
            // Attribute reset also resets colors
            self.fg = None;
            self.bg = None;
            self.attrs = cell.attrs;
        }
        if self.fg != Some(cell.fg) {
            queue!(out, SetForegroundColor(to_color(cell.fg)))?;
            self.fg = Some(cell.fg);
        }
        if self.bg != Some(cell.bg) {
            queue!(out, SetBackgroundColor(to_color(cell.bg)))?;
            self.bg = Some(cell.bg);
        }

        queue!(out, Print(cell.ch))?;
        self.pos = Some((x, y));
        Ok(())
    }
}

/// Differential renderer for fullscreen mode.
#[derive(Debug, Default)]
pub struct DiffRenderer {
    previous: Option<FrameBuffer>,
}

impl DiffRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render a frame to stdout, outputting only changed cells.
    ///
    /// Returns true if any cells were changed.
    pub fn render(&mut self, buffer: &FrameBuffer) -> io::Result<bool> {
        let mut out = Vec::with_capacity(16384);
        let changed = self.render_to(&mut out, buffer)?;
        if !out.is_empty() {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&out)?;
            stdout.flush()?;
        }
        Ok(changed)
    }

    /// Render a frame into any writer.
    pub fn render_to<W: Write>(&mut self, out: &mut W, buffer: &FrameBuffer) -> io::Result<bool> {
        let comparable = self
            .previous
            .as_ref()
            .filter(|prev| prev.width() == buffer.width() && prev.height() == buffer.height());

        let mut pen = Pen::default();
        let mut has_changes = false;

        for y in 0..buffer.height() {
            for x in 0..buffer.width() {
                let Some(cell) = buffer.get(x, y) else {
                    continue;
                };
                let unchanged = comparable.and_then(|prev| prev.get(x, y)) == Some(cell);
                if unchanged {
                    continue;
                }
                if !has_changes {
                    queue!(out, BeginSynchronizedUpdate)?;
                    has_changes = true;
                }
                pen.draw(out, x, y, cell)?;
            }
        }

        if has_changes {
            queue!(out, SetAttribute(Attribute::Reset), EndSynchronizedUpdate)?;
        }
        out.flush()?;

        self.previous = Some(buffer.clone());
        Ok(has_changes)
    }

    /// Invalidate the previous frame.
    ///
    /// Next render will be a full redraw.
    pub fn invalidate(&mut self) {
        self.previous = None;
    }

    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }

    /// Enter fullscreen mode (alternate screen buffer).
    pub fn enter_fullscreen(&mut self) -> io::Result<()> {
        let mut stdout = io::stdout();
        queue!(stdout, EnterAlternateScreen, Hide, Clear(ClearType::All))?;
        stdout.flush()?;
        self.invalidate();
        Ok(())
    }

    /// Exit fullscreen mode.
    pub fn exit_fullscreen(&mut self) -> io::Result<()> {
        let mut stdout = io::stdout();
        queue!(stdout, SetAttribute(Attribute::Reset), Show, LeaveAlternateScreen)?;
        stdout.flush()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_color() {
        assert_eq!(to_color(Rgba::TERMINAL_DEFAULT), Color::Reset);
        assert_eq!(to_color(Rgba::ansi(6)), Color::AnsiValue(6));
        assert_eq!(to_color(Rgba::rgb(13, 148, 136)), Color::Rgb { r: 13, g: 148, b: 136 });
    }

    #[test]
    fn test_first_frame_draws_everything() {
        let mut renderer = DiffRenderer::new();
        let mut buf = FrameBuffer::new(3, 1);
        buf.draw_text(0, 0, "abc", Rgba::WHITE, None, Attr::NONE, None);

        let mut out = Vec::new();
        assert!(renderer.render_to(&mut out, &buf).unwrap());
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("abc"));
        assert!(renderer.has_previous());
    }

    #[test]
    fn test_unchanged_frame_writes_nothing() {
        let mut renderer = DiffRenderer::new();
        let buf = FrameBuffer::new(4, 2);
        renderer.render_to(&mut Vec::new(), &buf).unwrap();

        let mut out = Vec::new();
        assert!(!renderer.render_to(&mut out, &buf).unwrap());
        assert!(out.is_empty());
    }

    #[test]
    fn test_only_changed_cell_is_written() {
        let mut renderer = DiffRenderer::new();
        let mut buf = FrameBuffer::new(4, 1);
        buf.draw_text(0, 0, "1234", Rgba::WHITE, None, Attr::NONE, None);
        renderer.render_to(&mut Vec::new(), &buf).unwrap();

        buf.draw_text(2, 0, "•", Rgba::WHITE, None, Attr::NONE, None);
        let mut out = Vec::new();
        assert!(renderer.render_to(&mut out, &buf).unwrap());
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains('•'));
        // Jumps straight to column 3 of row 1
        assert!(text.contains("\x1b[1;3H"));
        assert!(!text.contains("\x1b[1;1H"));
    }

    #[test]
    fn test_invalidate_forces_full_redraw() {
        let mut renderer = DiffRenderer::new();
        let buf = FrameBuffer::new(2, 1);
        renderer.render_to(&mut Vec::new(), &buf).unwrap();

        renderer.invalidate();
        assert!(!renderer.has_previous());
        assert!(renderer.render_to(&mut Vec::new(), &buf).unwrap());
    }
}
