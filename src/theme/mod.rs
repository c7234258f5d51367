//! Theme System for vault-pin-tui.
//!
//! Semantic colors for the PIN dialog and the setup form. A color is the
//! terminal default, an ANSI palette index, or an explicit RGB value, so a
//! theme can either follow the user's terminal scheme or pin exact colors.
//!
//! Two presets ship with the crate: `terminal` (ANSI, the default) and
//! `portal` (the teal records-portal palette).
//!
//! # Example
//!
//! ```ignore
//! use vault_pin_tui::theme::{get_preset, set_theme, active_theme};
//!
//! if let Some(portal) = get_preset("portal") {
//!     set_theme(portal);
//! }
//! let focus = active_theme().border_focus.resolve();
//! ```

use spark_signals::{signal, Signal};

use crate::types::Rgba;

pub mod presets;

pub use presets::*;

// =============================================================================
// ThemeColor - A color that can be ANSI or RGB
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeColor {
    /// Use terminal's default color.
    #[default]
    Default,
    /// ANSI palette index (0-255).
    /// - 0-7: Standard colors
    /// - 8-15: Bright colors
    Ansi(u8),
    /// Explicit RGB color.
    Rgb(Rgba),
}

impl ThemeColor {
    pub fn resolve(&self) -> Rgba {
        match self {
            Self::Default => Rgba::TERMINAL_DEFAULT,
            Self::Ansi(i) => Rgba::ansi(*i),
            Self::Rgb(c) => *c,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }
}

/// `u8` is an ANSI index.
impl From<u8> for ThemeColor {
    fn from(index: u8) -> Self {
        Self::Ansi(index)
    }
}

/// `u32` is an RGB integer (0xRRGGBB).
impl From<u32> for ThemeColor {
    fn from(rgb: u32) -> Self {
        Self::Rgb(Rgba::from_rgb_int(rgb))
    }
}

// =============================================================================
// Theme - Semantic colors
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    /// Theme name (e.g., "terminal", "portal").
    pub name: String,
    pub description: String,

    /// Brand color: submit button, focused cell border.
    pub primary: ThemeColor,
    /// Text drawn on top of `primary`.
    pub on_primary: ThemeColor,

    pub success: ThemeColor,
    pub error: ThemeColor,

    pub text: ThemeColor,
    /// Subtitle and helper text.
    pub text_muted: ThemeColor,
    pub text_disabled: ThemeColor,

    pub background: ThemeColor,
    /// Dialog card.
    pub surface: ThemeColor,

    pub border: ThemeColor,
    pub border_focus: ThemeColor,
}

impl Default for Theme {
    fn default() -> Self {
        terminal()
    }
}

// =============================================================================
// Active theme
// =============================================================================

thread_local! {
    static ACTIVE: Signal<Theme> = signal(terminal());
}

/// Theme the renderer paints with.
pub fn active_theme() -> Theme {
    ACTIVE.with(|t| t.get())
}

/// Switch theme. The next frame repaints in full.
pub fn set_theme(theme: Theme) {
    tracing::debug!(theme = %theme.name, "theme changed");
    ACTIVE.with(|t| t.set(theme));
}

/// Back to the terminal preset (for testing).
pub fn reset_theme() {
    ACTIVE.with(|t| t.set(terminal()));
}

// =============================================================================
// Tests
// =============================================================================
