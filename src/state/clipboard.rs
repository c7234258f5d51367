//! Clipboard Module - Routing of pasted text.
//!
//! The terminal delivers clipboard content as a bracketed paste
//! (`Event::Paste`), which [`dispatch_paste`] hands to the paste handler
//! registered for the focused component. A component without a paste
//! handler never sees the text, so a paste on anything other than the
//! first code cell is dropped.
//!
//! # Example
//!
//! ```ignore
//! use vault_pin_tui::state::clipboard;
//!
//! let cleanup = clipboard::on_paste(first_cell, |text| {
//!     println!("pasted {text}");
//!     true
//! });
//!
//! clipboard::dispatch_paste(first_cell as i32, "123456");
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Paste handler. Return true to consume the paste.
pub type PasteHandler = Rc<dyn Fn(&str) -> bool>;

thread_local! {
    static PASTE_HANDLERS: RefCell<HashMap<usize, Vec<(usize, PasteHandler)>>> = RefCell::new(HashMap::new());
    static NEXT_HANDLER_ID: RefCell<usize> = const { RefCell::new(0) };
}

// =============================================================================
// Paste Handlers
// =============================================================================

/// Register a paste handler for a component.
/// Returns cleanup function.
pub fn on_paste<F>(index: usize, handler: F) -> impl FnOnce()
where
    F: Fn(&str) -> bool + 'static,
{
    let id = NEXT_HANDLER_ID.with(|next| {
        let mut next = next.borrow_mut();
        let id = *next;
        *next += 1;
        id
    });
    PASTE_HANDLERS.with(|reg| {
        reg.borrow_mut()
            .entry(index)
            .or_default()
            .push((id, Rc::new(handler)));
    });

    move || {
        PASTE_HANDLERS.with(|reg| {
            let mut reg = reg.borrow_mut();
            if let Some(list) = reg.get_mut(&index) {
                list.retain(|(handler_id, _)| *handler_id != id);
                if list.is_empty() {
                    reg.remove(&index);
                }
            }
        });
    }
}

/// Deliver pasted text to the focused component.
/// Returns true if a handler consumed it.
pub fn dispatch_paste(focused_index: i32, text: &str) -> bool {
    if focused_index < 0 {
        return false;
    }
    let handlers: Vec<PasteHandler> = PASTE_HANDLERS.with(|reg| {
        reg.borrow()
            .get(&(focused_index as usize))
            .map(|list| list.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default()
    });
    handlers.into_iter().any(|handler| handler(text))
}

/// Remove all paste handlers for a component index.
pub fn cleanup_index(index: usize) {
    PASTE_HANDLERS.with(|reg| {
        reg.borrow_mut().remove(&index);
    });
}

/// Reset handlers (for testing).
pub fn reset_clipboard_state() {
    PASTE_HANDLERS.with(|reg| reg.borrow_mut().clear());
}

// =============================================================================
// Tests
// =============================================================================
