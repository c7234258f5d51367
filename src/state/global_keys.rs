//! Global Keys Module - Global keyboard shortcuts
//!
//! Provides global key handlers for:
//! - Ctrl+C: Graceful shutdown
//! - Tab: Focus next component (inside the active focus trap)
//! - Shift+Tab: Focus previous component
//!
//! Pasting needs no key handler: with bracketed paste enabled the terminal
//! turns its own paste shortcut into an `Event::Paste`.
//!
//! These handlers are registered on mount and cleaned up on unmount.
//! They run after the focused component's handlers, so a component can
//! still claim any of these keys for itself.
//!
//! # Example
//!
//! ```ignore
//! use vault_pin_tui::state::global_keys;
//! use std::sync::Arc;
//! use std::sync::atomic::AtomicBool;
//!
//! let running = Arc::new(AtomicBool::new(true));
//! let handle = global_keys::setup_global_keys(running.clone());
//!
//! // Later, on cleanup:
//! handle.cleanup();
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::focus;
use super::keyboard;

// =============================================================================
// GLOBAL KEYS HANDLE
// =============================================================================

/// Cleanup handle for global key handlers
pub struct GlobalKeysHandle {
    cleanups: Vec<Box<dyn FnOnce()>>,
}

impl GlobalKeysHandle {
    /// Clean up all global key handlers
    pub fn cleanup(self) {
        for cleanup in self.cleanups {
            cleanup();
        }
    }
}

// =============================================================================
// SETUP
// =============================================================================

/// Set up global key handlers.
/// Returns a handle for cleanup.
///
/// # Handlers
///
/// - **Ctrl+C**: Sets `running` to false for graceful shutdown
/// - **Tab**: `focus::focus_next()`
/// - **Shift+Tab**: `focus::focus_previous()`
pub fn setup_global_keys(running: Arc<AtomicBool>) -> GlobalKeysHandle {
    let ctrl_c = keyboard::on(move |event| {
        if event.is_ctrl("c") {
            tracing::debug!("ctrl+c, stopping");
            running.store(false, Ordering::SeqCst);
            true
        } else {
            false
        }
    });

    let tab = keyboard::on(|event| {
        if event.key != "Tab" || event.modifiers.ctrl || event.modifiers.alt {
            return false;
        }
        if event.modifiers.shift {
            focus::focus_previous();
        } else {
            focus::focus_next();
        }
        true
    });

    GlobalKeysHandle {
        cleanups: vec![Box::new(ctrl_c), Box::new(tab)],
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{allocate_index, interaction, reset_registry};
    use crate::state::keyboard::{KeyboardEvent, Modifiers};

    fn setup() {
        reset_registry();
        focus::reset_focus_state();
        keyboard::reset_keyboard_state();
    }

    fn focusable(tab_index: i32) -> usize {
        let index = allocate_index(None);
        interaction::set_focusable(index, true);
        interaction::set_tab_index(index, tab_index);
        index
    }

    #[test]
    fn test_ctrl_c_sets_running_false() {
        setup();

        let running = Arc::new(AtomicBool::new(true));
        let handle = setup_global_keys(running.clone());

        keyboard::dispatch(&KeyboardEvent::new("c"));
        assert!(running.load(Ordering::SeqCst));

        keyboard::dispatch(&KeyboardEvent::with_modifiers("c", Modifiers::ctrl()));
        assert!(!running.load(Ordering::SeqCst));

        handle.cleanup();
    }

    #[test]
    fn test_cleanup_removes_handlers() {
        setup();

        let running = Arc::new(AtomicBool::new(true));
        let handle = setup_global_keys(running.clone());
        handle.cleanup();

        keyboard::dispatch(&KeyboardEvent::with_modifiers("c", Modifiers::ctrl()));
        assert!(running.load(Ordering::SeqCst));
    }

    #[test]
    fn test_tab_and_shift_tab_cycle() {
        setup();

        let a = focusable(1);
        let b = focusable(2);
        focus::focus(a);

        let handle = setup_global_keys(Arc::new(AtomicBool::new(true)));

        keyboard::dispatch(&KeyboardEvent::new("Tab"));
        assert_eq!(focus::get_focused_index(), b as i32);

        // Wraps around
        keyboard::dispatch(&KeyboardEvent::new("Tab"));
        assert_eq!(focus::get_focused_index(), a as i32);

        keyboard::dispatch(&KeyboardEvent::with_modifiers("Tab", Modifiers::shift()));
        assert_eq!(focus::get_focused_index(), b as i32);

        handle.cleanup();
    }

    #[test]
    fn test_tab_with_ctrl_not_consumed() {
        setup();

        let a = focusable(0);
        focusable(1);
        focus::focus(a);
        let handle = setup_global_keys(Arc::new(AtomicBool::new(true)));

        assert!(!keyboard::dispatch(&KeyboardEvent::with_modifiers("Tab", Modifiers::ctrl())));
        assert_eq!(focus::get_focused_index(), a as i32);

        handle.cleanup();
    }
}
