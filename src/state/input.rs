//! Input Module - Event conversion and polling
//!
//! Bridges crossterm's event system with the keyboard and clipboard modules.
//! Provides event polling, conversion, and routing.
//!
//! # API
//!
//! - `convert_key_event` - Convert crossterm KeyEvent to our KeyboardEvent
//! - `poll_event` - Non-blocking event check with timeout
//! - `read_event` - Blocking event read
//! - `route_event` - Dispatch event to the focused component, then globally
//! - `enable_bracketed_paste` / `disable_bracketed_paste` - Paste delivery
//!
//! # Example
//!
//! ```ignore
//! use vault_pin_tui::state::input::{poll_event, route_event};
//! use std::time::Duration;
//!
//! loop {
//!     if let Ok(Some(event)) = poll_event(Duration::from_millis(16)) {
//!         route_event(event);
//!     }
//! }
//! ```

use crossterm::event::{
    poll, read, DisableBracketedPaste, EnableBracketedPaste, Event as CrosstermEvent,
    KeyCode, KeyEvent as CrosstermKeyEvent, KeyEventKind, KeyModifiers,
};
use crossterm::execute;
use std::io::stdout;
use std::time::Duration;

use super::clipboard;
use super::focus;
use super::keyboard::{self, KeyState, KeyboardEvent, Modifiers};

// =============================================================================
// INPUT EVENT ENUM
// =============================================================================

/// Unified event type for the runtime
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Keyboard event (key press, release, etc.)
    Key(KeyboardEvent),
    /// Bracketed paste; the whole pasted text in one event
    Paste(String),
    /// Terminal resize event (new width, height)
    Resize(u16, u16),
    /// No event or unhandled event type
    None,
}

// =============================================================================
// KEY EVENT CONVERSION
// =============================================================================

/// Convert crossterm KeyEvent to our KeyboardEvent
pub fn convert_key_event(event: CrosstermKeyEvent) -> KeyboardEvent {
    let key = match event.code {
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        // Shift+Tab arrives as BackTab on most terminals
        KeyCode::Tab | KeyCode::BackTab => "Tab".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::Esc => "Escape".to_string(),
        KeyCode::Up => "ArrowUp".to_string(),
        KeyCode::Down => "ArrowDown".to_string(),
        KeyCode::Left => "ArrowLeft".to_string(),
        KeyCode::Right => "ArrowRight".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => String::new(),
    };

    let state = match event.kind {
        KeyEventKind::Press => KeyState::Press,
        KeyEventKind::Repeat => KeyState::Repeat,
        KeyEventKind::Release => KeyState::Release,
    };

    let mut modifiers = convert_modifiers(event.modifiers);
    if event.code == KeyCode::BackTab {
        modifiers.shift = true;
    }

    KeyboardEvent {
        key,
        modifiers,
        state,
    }
}

fn convert_modifiers(mods: KeyModifiers) -> Modifiers {
    Modifiers {
        ctrl: mods.contains(KeyModifiers::CONTROL),
        alt: mods.contains(KeyModifiers::ALT),
        shift: mods.contains(KeyModifiers::SHIFT),
        meta: false, // Not exposed by crossterm
    }
}

/// Convert any crossterm event into an InputEvent.
pub fn convert_event(event: CrosstermEvent) -> InputEvent {
    match event {
        CrosstermEvent::Key(key) => InputEvent::Key(convert_key_event(key)),
        CrosstermEvent::Paste(text) => InputEvent::Paste(text),
        CrosstermEvent::Resize(w, h) => InputEvent::Resize(w, h),
        _ => InputEvent::None,
    }
}

// =============================================================================
// EVENT POLLING
// =============================================================================

/// Poll for an event with timeout.
/// Returns None if no event within timeout.
pub fn poll_event(timeout: Duration) -> std::io::Result<Option<InputEvent>> {
    if poll(timeout)? {
        Ok(Some(read_event()?))
    } else {
        Ok(None)
    }
}

/// Read the next event (blocking).
pub fn read_event() -> std::io::Result<InputEvent> {
    Ok(convert_event(read()?))
}

// =============================================================================
// EVENT ROUTING
// =============================================================================

/// Route an event to the appropriate handler.
/// Returns true if any handler consumed the event.
///
/// Keys go to the focused component first, then to the global handlers.
/// Pastes only ever reach the focused component.
pub fn route_event(event: InputEvent) -> bool {
    match event {
        InputEvent::Key(key) => {
            if !key.is_press() {
                return false;
            }
            if keyboard::dispatch_focused(focus::get_focused_index(), &key) {
                return true;
            }
            keyboard::dispatch(&key)
        }
        InputEvent::Paste(text) => {
            let consumed = clipboard::dispatch_paste(focus::get_focused_index(), &text);
            if !consumed {
                tracing::trace!(len = text.len(), "paste dropped, no handler on focused component");
            }
            consumed
        }
        // Resize is handled by the mount loop, which owns the viewport
        InputEvent::Resize(..) | InputEvent::None => false,
    }
}

// =============================================================================
// BRACKETED PASTE
// =============================================================================

/// Ask the terminal to deliver pastes as a single `Event::Paste`.
pub fn enable_bracketed_paste() -> std::io::Result<()> {
    execute!(stdout(), EnableBracketedPaste)
}

pub fn disable_bracketed_paste() -> std::io::Result<()> {
    execute!(stdout(), DisableBracketedPaste)
}

// =============================================================================
// TESTS
// =============================================================================
