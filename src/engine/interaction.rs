//! Interaction Arrays - per-component flags indexed by component index.
//!
//! - componentType: what kind of component lives at the index
//! - parentIndex: owning container (dialog) for focus trapping
//! - focusable / disabled: focus eligibility
//! - tabIndex: Tab order (lower first, ties keep allocation order)
//! - cursorPosition: caret offset in characters for text fields

use std::cell::RefCell;

use crate::types::ComponentType;

// =============================================================================
// Arrays
// =============================================================================

thread_local! {
    static COMPONENT_TYPE: RefCell<Vec<ComponentType>> = RefCell::new(Vec::new());
    static PARENT_INDEX: RefCell<Vec<Option<usize>>> = RefCell::new(Vec::new());
    static FOCUSABLE: RefCell<Vec<bool>> = RefCell::new(Vec::new());
    static DISABLED: RefCell<Vec<bool>> = RefCell::new(Vec::new());
    static TAB_INDEX: RefCell<Vec<i32>> = RefCell::new(Vec::new());
    static CURSOR_POSITION: RefCell<Vec<usize>> = RefCell::new(Vec::new());
}

fn grow<T: Clone>(arr: &RefCell<Vec<T>>, index: usize, default: T) {
    let mut arr = arr.borrow_mut();
    if arr.len() <= index {
        arr.resize(index + 1, default);
    }
}

fn read<T: Clone>(arr: &RefCell<Vec<T>>, index: usize, default: T) -> T {
    arr.borrow().get(index).cloned().unwrap_or(default)
}

fn write<T: Clone>(arr: &RefCell<Vec<T>>, index: usize, value: T, default: T) {
    grow(arr, index, default);
    arr.borrow_mut()[index] = value;
}

// =============================================================================
// Capacity Management
// =============================================================================

/// Ensure arrays have capacity for the given index.
pub fn ensure_capacity(index: usize) {
    COMPONENT_TYPE.with(|arr| grow(arr, index, ComponentType::None));
    PARENT_INDEX.with(|arr| grow(arr, index, None));
    FOCUSABLE.with(|arr| grow(arr, index, false));
    DISABLED.with(|arr| grow(arr, index, false));
    TAB_INDEX.with(|arr| grow(arr, index, 0));
    CURSOR_POSITION.with(|arr| grow(arr, index, 0));
}

/// Restore defaults at index.
pub fn clear_at_index(index: usize) {
    COMPONENT_TYPE.with(|arr| write(arr, index, ComponentType::None, ComponentType::None));
    PARENT_INDEX.with(|arr| write(arr, index, None, None));
    FOCUSABLE.with(|arr| write(arr, index, false, false));
    DISABLED.with(|arr| write(arr, index, false, false));
    TAB_INDEX.with(|arr| write(arr, index, 0, 0));
    CURSOR_POSITION.with(|arr| write(arr, index, 0, 0));
}

/// Drop all array storage.
pub fn reset() {
    COMPONENT_TYPE.with(|arr| arr.borrow_mut().clear());
    PARENT_INDEX.with(|arr| arr.borrow_mut().clear());
    FOCUSABLE.with(|arr| arr.borrow_mut().clear());
    DISABLED.with(|arr| arr.borrow_mut().clear());
    TAB_INDEX.with(|arr| arr.borrow_mut().clear());
    CURSOR_POSITION.with(|arr| arr.borrow_mut().clear());
}

// =============================================================================
// Accessors
// =============================================================================

pub fn get_component_type(index: usize) -> ComponentType {
    COMPONENT_TYPE.with(|arr| read(arr, index, ComponentType::None))
}

pub fn set_component_type(index: usize, value: ComponentType) {
    COMPONENT_TYPE.with(|arr| write(arr, index, value, ComponentType::None));
}

pub fn get_parent_index(index: usize) -> Option<usize> {
    PARENT_INDEX.with(|arr| read(arr, index, None))
}

pub fn set_parent_index(index: usize, value: Option<usize>) {
    PARENT_INDEX.with(|arr| write(arr, index, value, None));
}

pub fn get_focusable(index: usize) -> bool {
    FOCUSABLE.with(|arr| read(arr, index, false))
}

pub fn set_focusable(index: usize, value: bool) {
    FOCUSABLE.with(|arr| write(arr, index, value, false));
}

/// Disabled components keep their place in Tab order but can't take focus.
pub fn get_disabled(index: usize) -> bool {
    DISABLED.with(|arr| read(arr, index, false))
}

pub fn set_disabled(index: usize, value: bool) {
    DISABLED.with(|arr| write(arr, index, value, false));
}

pub fn get_tab_index(index: usize) -> i32 {
    TAB_INDEX.with(|arr| read(arr, index, 0))
}

pub fn set_tab_index(index: usize, value: i32) {
    TAB_INDEX.with(|arr| write(arr, index, value, 0));
}

pub fn get_cursor_position(index: usize) -> usize {
    CURSOR_POSITION.with(|arr| read(arr, index, 0))
}

pub fn set_cursor_position(index: usize, value: usize) {
    CURSOR_POSITION.with(|arr| write(arr, index, value, 0));
}

/// Whether the component can currently receive focus.
pub fn can_focus(index: usize) -> bool {
    get_focusable(index) && !get_disabled(index)
}
