//! Keyboard Module - Key events and the handler registry
//!
//! Does NOT own stdin (that is the input module).
//! Does NOT decide priority between focused and global handlers (that is
//! `input::route_event`).
//!
//! # API
//!
//! - `on(handler)` - Dialog shortcuts and global keys (Enter, Escape, Ctrl+R, Tab)
//! - `on_focused(i, fn)` - Digits and Backspace for the focused cell or field
//! - `dispatch` / `dispatch_focused` - Deliver a press to either set
//!
//! Handlers are cloned out of the registry before they run, so a handler may
//! itself register or remove handlers (closing a dialog from its Escape
//! handler unmounts the dialog's cells).
//!
//! # Example
//!
//! ```ignore
//! use vault_pin_tui::state::keyboard;
//!
//! let cleanup = keyboard::on_focused(cell_index, |event| {
//!     if let Some(d) = event.digit() {
//!         println!("digit {d}");
//!         return true;
//!     }
//!     false
//! });
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

// =============================================================================
// TYPES
// =============================================================================

/// Keyboard modifier state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn ctrl() -> Self {
        Self { ctrl: true, ..Self::default() }
    }

    pub fn shift() -> Self {
        Self { shift: true, ..Self::default() }
    }

    /// True when any of ctrl/alt/meta is held (shift alone still types).
    pub fn has_command(&self) -> bool {
        self.ctrl || self.alt || self.meta
    }
}

/// Key event state (press, repeat, release)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyState {
    #[default]
    Press,
    Repeat,
    Release,
}

/// Keyboard event
#[derive(Clone, Debug, PartialEq)]
pub struct KeyboardEvent {
    /// The key that was pressed (e.g., "7", "Backspace", "Enter", "Tab")
    pub key: String,
    pub modifiers: Modifiers,
    pub state: KeyState,
}

impl KeyboardEvent {
    /// Create a simple key press event
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::default(),
            state: KeyState::Press,
        }
    }

    /// Create a key press with modifiers
    pub fn with_modifiers(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
            state: KeyState::Press,
        }
    }

    pub fn is_press(&self) -> bool {
        self.state == KeyState::Press
    }

    /// The typed character, if this is a single printable character without
    /// command modifiers.
    pub fn typed_char(&self) -> Option<char> {
        if self.modifiers.has_command() {
            return None;
        }
        let mut chars = self.key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_control() => Some(c),
            _ => None,
        }
    }

    /// The typed decimal digit, if any.
    pub fn digit(&self) -> Option<char> {
        self.typed_char().filter(|c| c.is_ascii_digit())
    }

    /// Check for a ctrl+<key> chord (case-insensitive on the key).
    pub fn is_ctrl(&self, key: &str) -> bool {
        self.modifiers.ctrl && self.key.eq_ignore_ascii_case(key)
    }
}

/// Handler for keyboard events. Return true to consume the event.
pub type KeyHandler = Rc<dyn Fn(&KeyboardEvent) -> bool>;

// =============================================================================
// HANDLER REGISTRY
// =============================================================================

struct HandlerRegistry {
    global_handlers: Vec<(usize, KeyHandler)>,
    focused_handlers: HashMap<usize, Vec<(usize, KeyHandler)>>,
    next_id: usize,
}

impl HandlerRegistry {
    fn new() -> Self {
        Self {
            global_handlers: Vec::new(),
            focused_handlers: HashMap::new(),
            next_id: 0,
        }
    }

    fn next_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

thread_local! {
    static REGISTRY: RefCell<HandlerRegistry> = RefCell::new(HandlerRegistry::new());
}

// =============================================================================
// EVENT DISPATCH
// =============================================================================

/// Dispatch a press to the global handlers, in registration order.
/// Returns true if any handler consumed the event.
pub fn dispatch(event: &KeyboardEvent) -> bool {
    if !event.is_press() {
        return false;
    }

    let handlers: Vec<KeyHandler> = REGISTRY.with(|reg| {
        reg.borrow()
            .global_handlers
            .iter()
            .map(|(_, h)| h.clone())
            .collect()
    });

    handlers.into_iter().any(|handler| handler(event))
}

/// Dispatch to handlers of the focused component.
/// Returns true if consumed.
pub fn dispatch_focused(focused_index: i32, event: &KeyboardEvent) -> bool {
    if focused_index < 0 || !event.is_press() {
        return false;
    }

    let handlers: Vec<KeyHandler> = REGISTRY.with(|reg| {
        reg.borrow()
            .focused_handlers
            .get(&(focused_index as usize))
            .map(|hs| hs.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default()
    });

    handlers.into_iter().any(|handler| handler(event))
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Subscribe to all keyboard events.
/// Returns cleanup function.
pub fn on<F>(handler: F) -> impl FnOnce()
where
    F: Fn(&KeyboardEvent) -> bool + 'static,
{
    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id();
        reg.global_handlers.push((id, Rc::new(handler)));
        id
    });

    move || {
        REGISTRY.with(|reg| {
            reg.borrow_mut()
                .global_handlers
                .retain(|(handler_id, _)| *handler_id != id);
        });
    }
}

/// Subscribe to events while a specific component has focus.
/// Returns cleanup function.
pub fn on_focused<F>(index: usize, handler: F) -> impl FnOnce()
where
    F: Fn(&KeyboardEvent) -> bool + 'static,
{
    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id();
        reg.focused_handlers
            .entry(index)
            .or_default()
            .push((id, Rc::new(handler)));
        id
    });

    move || {
        REGISTRY.with(|reg| {
            let mut reg = reg.borrow_mut();
            if let Some(handlers) = reg.focused_handlers.get_mut(&index) {
                handlers.retain(|(handler_id, _)| *handler_id != id);
                if handlers.is_empty() {
                    reg.focused_handlers.remove(&index);
                }
            }
        });
    }
}

/// Clean up all focused handlers for a component index.
pub fn cleanup_index(index: usize) {
    REGISTRY.with(|reg| {
        reg.borrow_mut().focused_handlers.remove(&index);
    });
}

/// Reset keyboard state (for testing)
pub fn reset_keyboard_state() {
    REGISTRY.with(|reg| {
        *reg.borrow_mut() = HandlerRegistry::new();
    });
}

// =============================================================================
// TESTS
// =============================================================================
