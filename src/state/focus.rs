//! Focus System - Keyboard navigation and focus state
//!
//! Manages focus state and navigation:
//! - `focused_index` signal (currently focused component)
//! - Focus cycling (Tab/Shift+Tab)
//! - Focus trapping for modal dialogs
//! - Focus history for restoration when a dialog closes
//!
//! At most one component is focused at a time; `-1` means none.
//!
//! # Example
//!
//! ```ignore
//! use vault_pin_tui::state::focus;
//!
//! focus::save_focus_to_history();
//! focus::push_focus_trap(dialog_index);
//! focus::focus(first_cell);
//!
//! // ...dialog closes
//! focus::pop_focus_trap();
//! focus::restore_focus_from_history();
//! ```

use std::cell::RefCell;

use spark_signals::{signal, Signal};

use crate::engine::interaction;
use crate::engine::{get_allocated_indices, get_id, is_descendant_of};

// =============================================================================
// FOCUSED INDEX SIGNAL
// =============================================================================

thread_local! {
    static FOCUSED_INDEX: Signal<i32> = signal(-1);
}

/// Get the currently focused component index (-1 if none)
pub fn get_focused_index() -> i32 {
    FOCUSED_INDEX.with(|s| s.get())
}

/// Check if specific component is focused
pub fn is_focused(index: usize) -> bool {
    get_focused_index() == index as i32
}

fn set_focused(new_index: i32) {
    if get_focused_index() != new_index {
        FOCUSED_INDEX.with(|s| s.set(new_index));
    }
}

// =============================================================================
// FOCUS TRAP (for modal dialogs)
// =============================================================================

thread_local! {
    static FOCUS_TRAP_STACK: RefCell<Vec<usize>> = RefCell::new(Vec::new());
}

/// Push a focus trap - focus will be contained within this component's children
pub fn push_focus_trap(container_index: usize) {
    FOCUS_TRAP_STACK.with(|stack| stack.borrow_mut().push(container_index));
}

/// Pop the current focus trap
pub fn pop_focus_trap() -> Option<usize> {
    FOCUS_TRAP_STACK.with(|stack| stack.borrow_mut().pop())
}

/// Remove a specific trap wherever it sits in the stack.
pub fn remove_focus_trap(container_index: usize) {
    FOCUS_TRAP_STACK.with(|stack| {
        stack.borrow_mut().retain(|&i| i != container_index);
    });
}

pub fn is_focus_trapped() -> bool {
    FOCUS_TRAP_STACK.with(|stack| !stack.borrow().is_empty())
}

/// Get the current focus trap container
pub fn get_focus_trap_container() -> Option<usize> {
    FOCUS_TRAP_STACK.with(|stack| stack.borrow().last().copied())
}

// =============================================================================
// FOCUS HISTORY (for restoration)
// =============================================================================

#[derive(Clone)]
struct FocusHistoryEntry {
    index: usize,
    id: Option<String>,
}

thread_local! {
    static FOCUS_HISTORY: RefCell<Vec<FocusHistoryEntry>> = RefCell::new(Vec::new());
}

const MAX_HISTORY: usize = 10;

/// Save current focus to history
pub fn save_focus_to_history() {
    let current = get_focused_index();
    if current >= 0 {
        let index = current as usize;
        let id = get_id(index);
        FOCUS_HISTORY.with(|history| {
            let mut history = history.borrow_mut();
            history.push(FocusHistoryEntry { index, id });
            if history.len() > MAX_HISTORY {
                history.remove(0);
            }
        });
    }
}

/// Restore focus from history.
///
/// Skips entries whose index was recycled for a different component or
/// that can no longer take focus.
pub fn restore_focus_from_history() -> bool {
    loop {
        let entry = FOCUS_HISTORY.with(|history| history.borrow_mut().pop());
        let Some(entry) = entry else { return false };

        if get_id(entry.index) != entry.id {
            continue;
        }
        if interaction::can_focus(entry.index) {
            set_focused(entry.index as i32);
            return true;
        }
    }
}

// =============================================================================
// FOCUSABLE QUERIES
// =============================================================================

/// Get all focusable component indices, sorted by tab index.
///
/// When a focus trap is active only descendants of the trap container
/// are returned.
pub fn get_focusable_indices() -> Vec<usize> {
    let trap = get_focus_trap_container();
    let mut result: Vec<usize> = get_allocated_indices()
        .into_iter()
        .filter(|&i| interaction::can_focus(i))
        .filter(|&i| trap.is_none_or(|container| is_descendant_of(i, container)))
        .collect();

    // Same tab index keeps allocation order (sort is stable)
    result.sort_by_key(|&i| interaction::get_tab_index(i));
    result
}

// =============================================================================
// FOCUS NAVIGATION
// =============================================================================

fn find_next_focusable(from_index: i32, direction: i32) -> i32 {
    let focusables = get_focusable_indices();
    if focusables.is_empty() {
        return -1;
    }

    let current_pos = if from_index >= 0 {
        focusables.iter().position(|&i| i == from_index as usize)
    } else {
        None
    };

    match current_pos {
        None => {
            if direction == 1 {
                focusables[0] as i32
            } else {
                focusables[focusables.len() - 1] as i32
            }
        }
        Some(pos) => {
            let len = focusables.len() as i32;
            let next_pos = ((pos as i32 + direction) % len + len) % len;
            focusables[next_pos as usize] as i32
        }
    }
}

/// Move focus to next focusable component
pub fn focus_next() -> bool {
    let current = get_focused_index();
    let next = find_next_focusable(current, 1);
    if next != -1 && next != current {
        set_focused(next);
        return true;
    }
    false
}

/// Move focus to previous focusable component
pub fn focus_previous() -> bool {
    let current = get_focused_index();
    let prev = find_next_focusable(current, -1);
    if prev != -1 && prev != current {
        set_focused(prev);
        return true;
    }
    false
}

/// Focus a specific component by index.
///
/// Returns false if the component can't take focus.
pub fn focus(index: usize) -> bool {
    if !interaction::can_focus(index) {
        return false;
    }
    set_focused(index as i32);
    true
}

/// Clear focus (no component focused)
pub fn blur() {
    set_focused(-1);
}

// =============================================================================
// RESET (for testing)
// =============================================================================

/// Reset all focus state (for testing)
pub fn reset_focus_state() {
    FOCUSED_INDEX.with(|s| s.set(-1));
    FOCUS_TRAP_STACK.with(|stack| stack.borrow_mut().clear());
    FOCUS_HISTORY.with(|history| history.borrow_mut().clear());
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{allocate_index, pop_parent_context, push_parent_context, reset_registry};

    fn setup() {
        reset_registry();
        reset_focus_state();
    }

    fn focusable(tab_index: i32) -> usize {
        let index = allocate_index(None);
        interaction::set_focusable(index, true);
        interaction::set_tab_index(index, tab_index);
        index
    }

    #[test]
    fn test_initial_state() {
        setup();
        assert_eq!(get_focused_index(), -1);
    }

    #[test]
    fn test_focus_single_component() {
        setup();
        let cell = focusable(0);

        assert!(focus(cell));
        assert!(is_focused(cell));

        blur();
        assert_eq!(get_focused_index(), -1);
    }

    #[test]
    fn test_focus_non_focusable_or_disabled() {
        setup();
        let plain = allocate_index(None);
        assert!(!focus(plain));

        let cell = focusable(0);
        interaction::set_disabled(cell, true);
        assert!(!focus(cell));
        assert_eq!(get_focused_index(), -1);
    }

    #[test]
    fn test_focus_next_previous_wraps() {
        setup();
        let a = focusable(1);
        let b = focusable(2);
        let c = focusable(3);

        // Nothing focused: next starts at the front, previous at the back
        assert!(focus_previous());
        assert_eq!(get_focused_index(), c as i32);
        blur();
        assert!(focus_next());
        assert_eq!(get_focused_index(), a as i32);
        assert!(focus_next());
        assert_eq!(get_focused_index(), b as i32);
        assert!(focus_next());
        assert_eq!(get_focused_index(), c as i32);
        assert!(focus_next());
        assert_eq!(get_focused_index(), a as i32);
        assert!(focus_previous());
        assert_eq!(get_focused_index(), c as i32);
    }

    #[test]
    fn test_focus_trap_limits_cycling() {
        setup();
        let outside = focusable(0);
        let dialog = allocate_index(Some("dialog"));
        push_parent_context(dialog);
        let first = focusable(0);
        let second = focusable(1);
        pop_parent_context();

        push_focus_trap(dialog);
        assert_eq!(get_focusable_indices(), vec![first, second]);

        focus(second);
        focus_next();
        assert_eq!(get_focused_index(), first as i32);

        assert_eq!(pop_focus_trap(), Some(dialog));
        assert!(get_focusable_indices().contains(&outside));
    }

    #[test]
    fn test_history_restores_previous_focus() {
        setup();
        let launcher = focusable(0);
        let cell = focusable(1);

        focus(launcher);
        save_focus_to_history();
        focus(cell);

        assert!(restore_focus_from_history());
        assert_eq!(get_focused_index(), launcher as i32);
        assert!(!restore_focus_from_history());
    }

    #[test]
    fn test_tab_index_ordering() {
        setup();
        let a = focusable(30);
        let b = focusable(10);
        let c = focusable(20);

        assert_eq!(get_focusable_indices(), vec![b, c, a]);
    }
}
