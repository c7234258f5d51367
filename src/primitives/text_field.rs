//! Text Field Primitive - Single-line text entry (patient email).
//!
//! # Features
//!
//! - Two-way value binding via Signal
//! - Cursor navigation (arrows, home, end)
//! - Text editing (backspace, delete)
//! - Bracketed paste inserts at the cursor
//! - Placeholder text
//!
//! Enter, Escape and Tab are left for the owning dialog.
//!
//! # Example
//!
//! ```ignore
//! use vault_pin_tui::primitives::{text_field, TextFieldProps};
//! use spark_signals::signal;
//!
//! let email = signal(String::new());
//! let cleanup = text_field(TextFieldProps {
//!     placeholder: Some("patient@example.com".into()),
//!     ..TextFieldProps::new(email.clone())
//! });
//! ```

use crate::engine::{allocate_index, interaction, release_index};
use crate::state::{clipboard, keyboard};
use crate::types::ComponentType;

use super::types::{Cleanup, TextFieldProps};

// =============================================================================
// Editing Helpers
// =============================================================================

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte offset of the `pos`-th character.
fn byte_offset(text: &str, pos: usize) -> usize {
    text.char_indices()
        .nth(pos)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Insert `insert` at character position `pos`, honoring `max_length`.
/// Returns the new value and cursor.
fn insert_at(text: &str, pos: usize, insert: &str, max_length: usize) -> (String, usize) {
    let mut insert: String = insert.chars().filter(|c| !c.is_control()).collect();
    if max_length > 0 {
        let room = max_length.saturating_sub(char_len(text));
        insert = insert.chars().take(room).collect();
    }

    let at = byte_offset(text, pos);
    let mut value = String::with_capacity(text.len() + insert.len());
    value.push_str(&text[..at]);
    value.push_str(&insert);
    value.push_str(&text[at..]);
    (value, pos + char_len(&insert))
}

/// Remove the character at position `pos`.
fn remove_at(text: &str, pos: usize) -> String {
    let start = byte_offset(text, pos);
    let end = byte_offset(text, pos + 1);
    let mut value = text.to_string();
    value.replace_range(start..end, "");
    value
}

// =============================================================================
// Component
// =============================================================================

/// Create a single-line text field.
pub fn text_field(props: TextFieldProps) -> Cleanup {
    let index = allocate_index(props.id.as_deref());
    interaction::set_component_type(index, ComponentType::TextField);
    interaction::set_focusable(index, true);
    interaction::set_tab_index(index, props.tab_index);
    interaction::set_disabled(index, props.disabled.get());
    interaction::set_cursor_position(index, char_len(&props.value.get()));

    let value = props.value.clone();
    let disabled = props.disabled.clone();
    let max_length = props.max_length;
    let on_change = props.on_change.clone();

    // Commit a new value and cursor
    let commit = {
        let value = value.clone();
        move |new_value: String, cursor: usize| {
            interaction::set_cursor_position(index, cursor);
            if new_value != value.get() {
                value.set(new_value.clone());
                if let Some(ref cb) = on_change {
                    cb(&new_value);
                }
            }
        }
    };

    // ==========================================================================
    // KEYBOARD HANDLERS
    // ==========================================================================

    let key_value = value.clone();
    let key_disabled = disabled.clone();
    let key_commit = commit.clone();
    let key_cleanup = keyboard::on_focused(index, move |event| {
        if key_disabled.get() {
            return false;
        }

        let val = key_value.get();
        let len = char_len(&val);
        // Clamp in case the value was changed from outside
        let pos = interaction::get_cursor_position(index).min(len);

        if event.modifiers.ctrl && !event.modifiers.alt {
            return match event.key.as_str() {
                "u" | "U" => {
                    key_commit(String::new(), 0);
                    true
                }
                "a" | "A" => {
                    interaction::set_cursor_position(index, 0);
                    true
                }
                "e" | "E" => {
                    interaction::set_cursor_position(index, len);
                    true
                }
                _ => false,
            };
        }

        match event.key.as_str() {
            "ArrowLeft" => {
                interaction::set_cursor_position(index, pos.saturating_sub(1));
                true
            }
            "ArrowRight" => {
                interaction::set_cursor_position(index, (pos + 1).min(len));
                true
            }
            "Home" => {
                interaction::set_cursor_position(index, 0);
                true
            }
            "End" => {
                interaction::set_cursor_position(index, len);
                true
            }
            "Backspace" => {
                if pos > 0 {
                    key_commit(remove_at(&val, pos - 1), pos - 1);
                }
                true
            }
            "Delete" => {
                if pos < len {
                    key_commit(remove_at(&val, pos), pos);
                }
                true
            }
            _ => match event.typed_char() {
                Some(c) => {
                    let (new_val, cursor) = insert_at(&val, pos, &c.to_string(), max_length);
                    key_commit(new_val, cursor);
                    true
                }
                None => false,
            },
        }
    });

    // ==========================================================================
    // PASTE
    // ==========================================================================

    let paste_value = value.clone();
    let paste_cleanup = clipboard::on_paste(index, move |text| {
        if disabled.get() {
            return false;
        }
        let val = paste_value.get();
        let pos = interaction::get_cursor_position(index).min(char_len(&val));
        let (new_val, cursor) = insert_at(&val, pos, text, max_length);
        commit(new_val, cursor);
        true
    });

    // ==========================================================================
    // CLEANUP
    // ==========================================================================

    Box::new(move || {
        key_cleanup();
        paste_cleanup();
        keyboard::cleanup_index(index);
        clipboard::cleanup_index(index);
        release_index(index);
    })
}

/// Text to display, with the cursor's character offset.
///
/// Returns the placeholder (and `None` for the cursor) while the value is
/// empty and a placeholder is set.
pub fn display_text(value: &str, placeholder: Option<&str>, cursor: usize) -> (String, Option<usize>) {
    match placeholder {
        Some(ph) if value.is_empty() => (ph.to_string(), None),
        _ => (value.to_string(), Some(cursor.min(char_len(value)))),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{get_index, reset_registry};
    use crate::state::focus;
    use crate::state::input::{route_event, InputEvent};
    use crate::state::keyboard::{KeyboardEvent, Modifiers};
    use spark_signals::signal;

    fn setup() {
        reset_registry();
        focus::reset_focus_state();
        keyboard::reset_keyboard_state();
        clipboard::reset_clipboard_state();
    }

    fn type_str(text: &str) {
        for c in text.chars() {
            route_event(InputEvent::Key(KeyboardEvent::new(c.to_string())));
        }
    }

    fn press(key: &str) {
        route_event(InputEvent::Key(KeyboardEvent::new(key)));
    }

    fn mount(value: &spark_signals::Signal<String>) -> (Cleanup, usize) {
        let cleanup = text_field(TextFieldProps {
            id: Some("email".into()),
            ..TextFieldProps::new(value.clone())
        });
        let index = get_index("email").unwrap();
        focus::focus(index);
        (cleanup, index)
    }

    #[test]
    fn test_helpers() {
        assert_eq!(insert_at("ac", 1, "b", 0), ("abc".to_string(), 2));
        assert_eq!(insert_at("abc", 3, "def", 4), ("abcd".to_string(), 4));
        assert_eq!(insert_at("é", 1, "x\n", 0), ("éx".to_string(), 2));
        assert_eq!(remove_at("héllo", 1), "hllo");
        assert_eq!(remove_at("abc", 9), "abc");
    }

    #[test]
    fn test_typing_and_backspace() {
        setup();
        let value = signal(String::new());
        let (_cleanup, index) = mount(&value);

        assert_eq!(interaction::get_component_type(index), ComponentType::TextField);

        type_str("dr@clinic.in");
        assert_eq!(value.get(), "dr@clinic.in");

        press("Backspace");
        press("Backspace");
        assert_eq!(value.get(), "dr@clinic.");
        assert_eq!(interaction::get_cursor_position(index), 10);
    }

    #[test]
    fn test_cursor_navigation_edits_in_place() {
        setup();
        let value = signal(String::new());
        let (_cleanup, index) = mount(&value);

        type_str("ac");
        press("ArrowLeft");
        type_str("b");
        assert_eq!(value.get(), "abc");

        press("Home");
        press("Delete");
        assert_eq!(value.get(), "bc");
        assert_eq!(interaction::get_cursor_position(index), 0);

        press("End");
        assert_eq!(interaction::get_cursor_position(index), 2);
    }

    #[test]
    fn test_ctrl_u_clears() {
        setup();
        let value = signal("someone@x.org".to_string());
        let (_cleanup, _) = mount(&value);

        route_event(InputEvent::Key(KeyboardEvent::with_modifiers("u", Modifiers::ctrl())));
        assert_eq!(value.get(), "");
    }

    #[test]
    fn test_enter_and_escape_not_consumed() {
        setup();
        let value = signal(String::new());
        let (_cleanup, _) = mount(&value);

        assert!(!route_event(InputEvent::Key(KeyboardEvent::new("Enter"))));
        assert!(!route_event(InputEvent::Key(KeyboardEvent::new("Escape"))));
    }

    #[test]
    fn test_paste_drops_line_breaks_only() {
        setup();
        let value = signal(String::new());
        let (_cleanup, _) = mount(&value);

        assert!(route_event(InputEvent::Paste(" patient@example.com\r\n".into())));
        assert_eq!(value.get(), " patient@example.com");
    }

    #[test]
    fn test_disabled_ignores_input() {
        setup();
        let value = signal(String::new());
        let cleanup = text_field(TextFieldProps {
            id: Some("email".into()),
            disabled: true.into(),
            ..TextFieldProps::new(value.clone())
        });
        let index = get_index("email").unwrap();

        // Can't take focus, and handlers ignore direct dispatch
        assert!(!focus::focus(index));
        assert!(!keyboard::dispatch_focused(index as i32, &KeyboardEvent::new("a")));
        assert_eq!(value.get(), "");

        cleanup();
        assert_eq!(get_index("email"), None);
    }

    #[test]
    fn test_display_text() {
        assert_eq!(
            display_text("", Some("patient@example.com"), 0),
            ("patient@example.com".to_string(), None)
        );
        assert_eq!(display_text("ab", Some("x"), 9), ("ab".to_string(), Some(2)));
        assert_eq!(display_text("", None, 0), (String::new(), Some(0)));
    }
}
