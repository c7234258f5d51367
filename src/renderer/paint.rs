//! Paint - Draw a dialog snapshot into a FrameBuffer.
//!
//! Pure drawing: takes a [`DialogView`], its [`DialogLayout`] and a theme,
//! and writes cells. No focus or signal access happens here, so the same
//! view always paints the same frame.

use crate::layout::{compute_dialog_layout, string_width, truncate_text, wrap_text, DialogLayout};
use crate::primitives::{ButtonView, CellView, DialogHandle, DialogView, FieldView};
use crate::theme::Theme;
use crate::types::{Attr, BorderStyle, Rect, Rgba};

use super::buffer::FrameBuffer;

struct Palette {
    text: Rgba,
    muted: Rgba,
    disabled: Rgba,
    error: Rgba,
    primary: Rgba,
    on_primary: Rgba,
    surface: Rgba,
    border: Rgba,
    border_focus: Rgba,
}

impl Palette {
    fn from_theme(theme: &Theme) -> Self {
        Self {
            text: theme.text.resolve(),
            muted: theme.text_muted.resolve(),
            disabled: theme.text_disabled.resolve(),
            error: theme.error.resolve(),
            primary: theme.primary.resolve(),
            on_primary: theme.on_primary.resolve(),
            surface: theme.surface.resolve(),
            border: theme.border.resolve(),
            border_focus: theme.border_focus.resolve(),
        }
    }
}

fn paint_wrapped(buf: &mut FrameBuffer, rect: Rect, text: &str, fg: Rgba, attrs: Attr) {
    for (row, line) in wrap_text(text, rect.width).iter().enumerate() {
        let y = rect.y + row as u16;
        if row as u16 >= rect.height {
            break;
        }
        buf.draw_text(rect.x, y, line, fg, None, attrs, Some(&rect));
    }
}

fn paint_field(buf: &mut FrameBuffer, rect: Rect, field: &FieldView, pal: &Palette, disabled: bool) {
    let border = if field.focused { pal.border_focus } else { pal.border };
    buf.draw_border(rect, BorderStyle::Rounded, border, Attr::NONE);

    let inner = Rect::new(rect.x + 2, rect.y + 1, rect.width.saturating_sub(4), 1);
    let fg = if disabled {
        pal.disabled
    } else if field.placeholder {
        pal.muted
    } else {
        pal.text
    };
    let shown = truncate_text(&field.text, inner.width);
    buf.draw_text(inner.x, inner.y, &shown, fg, None, Attr::NONE, Some(&inner));

    if let Some(cursor) = field.cursor {
        let offset = string_width(&field.text.chars().take(cursor).collect::<String>());
        if offset < inner.width {
            let under = field.text.chars().nth(cursor).unwrap_or(' ');
            buf.set_cell(inner.x + offset, inner.y, under, fg, None, Attr::INVERSE, Some(&inner));
        }
    }
}

fn paint_cell(buf: &mut FrameBuffer, rect: Rect, cell: &CellView, pal: &Palette, disabled: bool) {
    let (border, attrs) = if disabled {
        (pal.disabled, Attr::NONE)
    } else if cell.focused {
        (pal.border_focus, Attr::BOLD)
    } else if cell.filled {
        (pal.primary, Attr::NONE)
    } else {
        (pal.border, Attr::NONE)
    };
    buf.draw_border(rect, BorderStyle::Rounded, border, attrs);

    let fg = if disabled { pal.disabled } else { pal.text };
    let y = rect.y + rect.height / 2;
    buf.draw_text_centered(rect.x, y, rect.width, &cell.glyph, fg, None, Attr::BOLD, Some(&rect));
}

fn paint_button(buf: &mut FrameBuffer, rect: Rect, button: &ButtonView, pal: &Palette, primary: bool) {
    let label = format!("[ {} ]", button.label);
    let (fg, bg, mut attrs) = match (button.enabled, primary) {
        (false, _) => (pal.disabled, None, Attr::NONE),
        (true, true) => (pal.on_primary, Some(pal.primary), Attr::BOLD),
        (true, false) => (pal.text, None, Attr::NONE),
    };
    if button.focused {
        attrs |= Attr::UNDERLINE;
    }
    buf.draw_text(rect.x, rect.y, &label, fg, bg, attrs, Some(&rect));
}

/// Paint one open dialog with a precomputed layout.
pub fn paint_dialog(buf: &mut FrameBuffer, view: &DialogView, layout: &DialogLayout, theme: &Theme) {
    let pal = Palette::from_theme(theme);

    buf.fill_rect(layout.card, pal.surface);
    let frame = if view.disabled { pal.border } else { pal.border_focus };
    buf.draw_border(layout.card, BorderStyle::Rounded, frame, Attr::NONE);

    paint_wrapped(buf, layout.title, view.title, pal.text, Attr::BOLD);
    paint_wrapped(buf, layout.subtitle, view.subtitle, pal.muted, Attr::NONE);

    if let (Some(rect), Some(label)) = (layout.email_label, view.email_label) {
        paint_wrapped(buf, rect, label, pal.text, Attr::NONE);
    }
    if let (Some(rect), Some(field)) = (layout.email, &view.email) {
        paint_field(buf, rect, field, &pal, view.disabled);
    }
    if let (Some(rect), Some(label)) = (layout.code_label, view.code_label) {
        paint_wrapped(buf, rect, label, pal.text, Attr::NONE);
    }

    for (rect, cell) in layout.cells.iter().zip(&view.cells) {
        paint_cell(buf, *rect, cell, &pal, view.disabled);
    }

    paint_wrapped(buf, layout.helper, view.helper, pal.muted, Attr::ITALIC);

    if let (Some(rect), Some(message)) = (layout.error, &view.error) {
        paint_wrapped(buf, rect, message, pal.error, Attr::NONE);
    }

    paint_button(buf, layout.reset, &view.reset, &pal, false);
    paint_button(buf, layout.submit, &view.submit, &pal, true);
}

/// Lay out and paint a dialog if it is open. Returns false when closed or
/// when layout failed (logged).
pub fn paint_open_dialog(buf: &mut FrameBuffer, dialog: &DialogHandle, theme: &Theme) -> bool {
    let Some(view) = dialog.view() else {
        return false;
    };
    match compute_dialog_layout(&view, buf.width(), buf.height()) {
        Ok(layout) => {
            paint_dialog(buf, &view, &layout, theme);
            true
        }
        Err(err) => {
            tracing::warn!(error = %err, dialog = dialog.id(), "dialog layout failed");
            false
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
