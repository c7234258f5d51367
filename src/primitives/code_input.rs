//! Code Input Primitive - Segmented single-digit cells acting as one code.
//!
//! N focusable cells, each holding `""` or one ASCII digit. The cell array is
//! always exactly N long; completeness is derived, never stored.
//!
//! Editing happens in [`CodeCells`], which never touches focus. Each
//! operation returns the cell that should be focused next as a
//! [`FocusRequest`]; the mounted component maps it to the cell's component
//! index and hands it to the focus system.
//!
//! # Keys (on a focused cell)
//!
//! - digit: replaces the cell, focus moves right (not past the last cell)
//! - Backspace on a filled cell: clears it, focus stays
//! - Backspace on an empty cell: focus moves left
//! - other printable keys: rejected
//!
//! Pastes are only accepted on the first cell and always fill from cell 0.
//!
//! # Example
//!
//! ```ignore
//! use vault_pin_tui::primitives::{code_input, CodeInputProps};
//! use spark_signals::signal;
//!
//! let cells = signal(vec![String::new(); 6]);
//! let cleanup = code_input(CodeInputProps {
//!     id: Some("vault-pin".into()),
//!     ..CodeInputProps::new(cells.clone())
//! });
//!
//! // ...user types 1 2 3 4 5 6
//! assert!(is_complete(&cells.get()));
//! ```

use std::rc::Rc;

use spark_signals::Signal;

use crate::engine::{
    allocate_index, get_id, get_index, interaction, pop_parent_context, push_parent_context,
    release_index,
};
use crate::state::{clipboard, focus, keyboard};
use crate::types::ComponentType;

use super::types::{Cleanup, CodeChangeCallback, CodeInputProps, PropValue};

/// Default mask for hidden cells.
pub const DEFAULT_MASK_CHAR: char = '•';

// =============================================================================
// Pure Queries
// =============================================================================

/// Ask the focus system to focus cell `k` of the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusRequest(pub usize);

/// Every cell holds a digit.
pub fn is_complete(cells: &[String]) -> bool {
    !cells.is_empty() && cells.iter().all(|c| !c.is_empty())
}

/// No cell holds a digit.
pub fn is_blank(cells: &[String]) -> bool {
    cells.iter().all(|c| c.is_empty())
}

/// Cells concatenated in order.
pub fn joined_code(cells: &[String]) -> String {
    cells.concat()
}

fn is_single_digit(raw: &str) -> bool {
    let mut chars = raw.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_digit())
}

// =============================================================================
// CodeCells
// =============================================================================

/// The cell array and its editing rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeCells {
    cells: Vec<String>,
}

impl CodeCells {
    /// `length` empty cells (at least one).
    pub fn new(length: usize) -> Self {
        Self {
            cells: vec![String::new(); length.max(1)],
        }
    }

    pub fn from_cells(cells: Vec<String>) -> Self {
        if cells.is_empty() {
            return Self::new(1);
        }
        Self { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        is_blank(&self.cells)
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<String> {
        self.cells
    }

    pub fn is_complete(&self) -> bool {
        is_complete(&self.cells)
    }

    pub fn joined_code(&self) -> String {
        joined_code(&self.cells)
    }

    /// Set one cell to `""` or a single digit.
    ///
    /// Anything else is rejected without touching the cells. A non-empty
    /// value moves focus to the next cell unless this is the last one.
    pub fn change(&mut self, index: usize, raw: &str) -> Option<FocusRequest> {
        if index >= self.cells.len() {
            return None;
        }
        if !raw.is_empty() && !is_single_digit(raw) {
            tracing::trace!(index, "rejected non-digit cell input");
            return None;
        }

        self.cells[index] = raw.to_string();

        if !raw.is_empty() && index + 1 < self.cells.len() {
            Some(FocusRequest(index + 1))
        } else {
            None
        }
    }

    /// Navigation keys. Only Backspace on an empty cell does anything:
    /// focus moves to the previous cell.
    pub fn key_down(&self, index: usize, key: &str) -> Option<FocusRequest> {
        if key != "Backspace" || index == 0 || index >= self.cells.len() {
            return None;
        }
        if self.cells[index].is_empty() {
            Some(FocusRequest(index - 1))
        } else {
            None
        }
    }

    /// Distribute pasted digits from cell 0.
    ///
    /// At most N characters are taken. An empty or non-numeric paste changes
    /// nothing. Cells past the pasted length keep their values.
    pub fn paste(&mut self, text: &str) -> Option<FocusRequest> {
        let n = self.cells.len();
        let digits: Vec<char> = text.chars().take(n).collect();
        if digits.is_empty() || !digits.iter().all(|c| c.is_ascii_digit()) {
            tracing::trace!("rejected non-numeric paste");
            return None;
        }

        for (cell, digit) in self.cells.iter_mut().zip(&digits) {
            *cell = digit.to_string();
        }

        Some(FocusRequest(digits.len().min(n - 1)))
    }

    /// Clear every cell, optionally asking for focus on cell 0.
    pub fn reset(&mut self, refocus: bool) -> Option<FocusRequest> {
        for cell in &mut self.cells {
            cell.clear();
        }
        refocus.then_some(FocusRequest(0))
    }
}

// =============================================================================
// Component
// =============================================================================

/// Component ID of cell `k` of the code input `base_id`.
pub fn cell_id(base_id: &str, k: usize) -> String {
    format!("{base_id}-cell-{k}")
}

/// Component indices of the mounted cells of `base_id`, in cell order.
pub fn find_cells(base_id: &str) -> Vec<usize> {
    (0..)
        .map(|k| get_index(&cell_id(base_id, k)))
        .take_while(Option::is_some)
        .flatten()
        .collect()
}

/// What a cell shows: a space when empty, the mask when hidden.
pub fn cell_glyph(value: &str, masked: bool, mask_char: char) -> String {
    if value.is_empty() {
        " ".to_string()
    } else if masked {
        mask_char.to_string()
    } else {
        value.to_string()
    }
}

/// Shared pieces every cell handler needs.
#[derive(Clone)]
struct CellBinding {
    value: Signal<Vec<String>>,
    cells: Rc<Vec<usize>>,
    disabled: PropValue<bool>,
    on_change: Option<CodeChangeCallback>,
}

impl CellBinding {
    /// Run an edit against the current cells, publish any change, then
    /// carry out the focus request.
    fn apply(&self, edit: impl FnOnce(&mut CodeCells) -> Option<FocusRequest>) {
        let before = self.value.get();
        let mut code = CodeCells::from_cells(before.clone());
        let request = edit(&mut code);
        let after = code.into_cells();

        if after != before {
            self.value.set(after.clone());
            if let Some(ref cb) = self.on_change {
                cb(&after);
            }
        }

        if let Some(FocusRequest(k)) = request {
            if let Some(&index) = self.cells.get(k) {
                focus::focus(index);
            }
        }
    }

    fn is_disabled(&self) -> bool {
        self.disabled.get()
    }
}

/// Create a segmented code input.
///
/// Allocates a container plus one focusable cell per digit under the current
/// parent context. Returns a cleanup that unmounts all of them.
pub fn code_input(props: CodeInputProps) -> Cleanup {
    let length = props.length.max(1);

    // 1. CONTAINER
    let container = allocate_index(props.id.as_deref());
    interaction::set_component_type(container, ComponentType::CodeInput);
    let base_id = get_id(container).unwrap_or_default();

    if props.value.get().len() != length {
        props.value.set(vec![String::new(); length]);
    }

    // 2. CELLS
    push_parent_context(container);
    let cells: Vec<usize> = (0..length)
        .map(|k| {
            let index = allocate_index(Some(&cell_id(&base_id, k)));
            interaction::set_component_type(index, ComponentType::CodeCell);
            interaction::set_focusable(index, true);
            interaction::set_tab_index(index, props.tab_index + k as i32);
            index
        })
        .collect();
    pop_parent_context();

    let disabled = props.disabled.get();
    for &index in &cells {
        interaction::set_disabled(index, disabled);
    }

    let binding = CellBinding {
        value: props.value.clone(),
        cells: Rc::new(cells),
        disabled: props.disabled.clone(),
        on_change: props.on_change.clone(),
    };

    // ==========================================================================
    // KEYBOARD HANDLERS
    // ==========================================================================

    let mut cleanups: Vec<Box<dyn FnOnce()>> = Vec::with_capacity(length + 1);

    for (k, &index) in binding.cells.iter().enumerate() {
        let binding = binding.clone();
        let cleanup = keyboard::on_focused(index, move |event| {
            if binding.is_disabled() {
                return false;
            }

            if event.key == "Backspace" && !event.modifiers.has_command() {
                let filled = binding
                    .value
                    .get()
                    .get(k)
                    .is_some_and(|cell| !cell.is_empty());
                if filled {
                    binding.apply(|code| code.change(k, ""));
                } else {
                    binding.apply(|code| code.key_down(k, "Backspace"));
                }
                return true;
            }

            // A digit typed on a filled cell replaces it and moves on,
            // rather than being dropped for lack of room
            match event.typed_char() {
                Some(c) => {
                    binding.apply(|code| code.change(k, &c.to_string()));
                    true
                }
                None => false,
            }
        });
        cleanups.push(Box::new(cleanup));
    }

    // ==========================================================================
    // PASTE - first cell only
    // ==========================================================================

    if let Some(&first) = binding.cells.first() {
        let binding = binding.clone();
        let cleanup = clipboard::on_paste(first, move |text| {
            if binding.is_disabled() {
                return false;
            }
            // Digits never reach the log
            tracing::debug!(len = text.chars().count(), "code paste");
            binding.apply(|code| code.paste(text));
            true
        });
        cleanups.push(Box::new(cleanup));
    }

    // ==========================================================================
    // CLEANUP
    // ==========================================================================

    let cells = binding.cells.clone();
    Box::new(move || {
        for cleanup in cleanups {
            cleanup();
        }
        for &index in cells.iter() {
            keyboard::cleanup_index(index);
            clipboard::cleanup_index(index);
        }
        // Releases the cells with it
        release_index(container);
    })
}

// =============================================================================
// Tests
// =============================================================================
