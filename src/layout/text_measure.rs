//! Text Measurement
//!
//! Utilities for measuring text dimensions in terminal cells.
//!
//! - ASCII characters: 1 cell
//! - CJK characters: 2 cells (fullwidth)
//! - Emoji: 2 cells (most)
//! - Control characters: 0 cells

/// Width of one character in terminal cells.
pub fn char_width(c: char) -> u16 {
    if c.is_ascii() {
        return if c.is_ascii_control() { 0 } else { 1 };
    }
    let code = c as u32;
    if (0x1100..=0x115F).contains(&code)     // Hangul Jamo
        || (0x2E80..=0x9FFF).contains(&code)   // CJK
        || (0xAC00..=0xD7A3).contains(&code)   // Hangul Syllables
        || (0xF900..=0xFAFF).contains(&code)   // CJK Compatibility
        || (0xFF00..=0xFF60).contains(&code)   // Fullwidth Forms
        || (0x1F300..=0x1F9FF).contains(&code) // Emoji
    {
        2
    } else {
        1
    }
}

/// Measure the display width of a string in terminal cells.
pub fn string_width(s: &str) -> u16 {
    s.chars().fold(0u16, |w, c| w.saturating_add(char_width(c)))
}

/// Word-wrap text to a given width.
///
/// Breaks at spaces where possible; a word longer than the width is split.
/// Empty text yields no lines.
pub fn wrap_text(text: &str, width: u16) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_width = 0u16;

        for word in paragraph.split_whitespace() {
            let word_width = string_width(word);
            let sep = if line.is_empty() { 0 } else { 1 };

            if line_width + sep + word_width <= width {
                if sep == 1 {
                    line.push(' ');
                }
                line.push_str(word);
                line_width += sep + word_width;
                continue;
            }

            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                line_width = 0;
            }

            // Hard-split words that can't fit on a line of their own
            for c in word.chars() {
                let cw = char_width(c);
                if line_width + cw > width && !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                    line_width = 0;
                }
                line.push(c);
                line_width += cw;
            }
        }
        lines.push(line);
    }

    lines
}

/// Number of lines `text` occupies when wrapped to `width`.
pub fn measure_text_height(text: &str, width: u16) -> u16 {
    wrap_text(text, width).len().min(u16::MAX as usize) as u16
}

/// Truncate text to fit within a given width, ending with `…` when cut.
pub fn truncate_text(text: &str, width: u16) -> String {
    if string_width(text) <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0u16;
    for c in text.chars() {
        let cw = char_width(c);
        if used + cw > width - 1 {
            break;
        }
        out.push(c);
        used += cw;
    }
    out.push('…');
    out
}
