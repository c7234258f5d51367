//! Theme presets.
//!
//! - terminal (default - uses ANSI colors)
//! - portal (teal palette of the patient records portal)

use super::{Theme, ThemeColor};
use crate::types::Rgba;

// =============================================================================
// Terminal Theme (Default)
// =============================================================================

/// Terminal theme - uses ANSI colors to respect user's terminal theme.
pub fn terminal() -> Theme {
    Theme {
        name: "terminal".to_string(),
        description: "Uses terminal default colors".to_string(),
        primary: ThemeColor::Ansi(6),     // cyan
        on_primary: ThemeColor::Ansi(0),  // black
        success: ThemeColor::Ansi(2),
        error: ThemeColor::Ansi(1),
        text: ThemeColor::Default,
        text_muted: ThemeColor::Ansi(8),
        text_disabled: ThemeColor::Ansi(8),
        background: ThemeColor::Default,
        surface: ThemeColor::Default,
        border: ThemeColor::Ansi(7),
        border_focus: ThemeColor::Ansi(14), // bright cyan
    }
}

// =============================================================================
// Portal Theme
// =============================================================================

/// Portal - teal on slate, matching the web records portal.
pub fn portal() -> Theme {
    Theme {
        name: "portal".to_string(),
        description: "Teal records portal palette".to_string(),
        primary: ThemeColor::Rgb(Rgba::from_rgb_int(0x0d9488)),    // teal-600
        on_primary: ThemeColor::Rgb(Rgba::WHITE),
        success: ThemeColor::Rgb(Rgba::from_rgb_int(0x10b981)),
        error: ThemeColor::Rgb(Rgba::from_rgb_int(0xef4444)),
        text: ThemeColor::Rgb(Rgba::from_rgb_int(0xf1f5f9)),
        text_muted: ThemeColor::Rgb(Rgba::from_rgb_int(0x94a3b8)),
        text_disabled: ThemeColor::Rgb(Rgba::from_rgb_int(0x475569)),
        background: ThemeColor::Default,
        surface: ThemeColor::Rgb(Rgba::from_rgb_int(0x0f172a)),     // slate-900
        border: ThemeColor::Rgb(Rgba::from_rgb_int(0x334155)),
        border_focus: ThemeColor::Rgb(Rgba::from_rgb_int(0x14b8a6)), // teal-500
    }
}

// =============================================================================
// Lookup
// =============================================================================

pub const PRESET_NAMES: &[&str] = &["terminal", "portal"];

/// Get a preset by name (case-insensitive).
pub fn get_preset(name: &str) -> Option<Theme> {
    match name.to_ascii_lowercase().as_str() {
        "terminal" => Some(terminal()),
        "portal" => Some(portal()),
        _ => None,
    }
}
