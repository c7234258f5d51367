//! Primitives - Components for entering a vault PIN.
//!
//! - [`code_input`] - Row of single-digit cells (PIN / MPIN)
//! - [`text_field`] - Single-line text entry (patient email)
//! - [`dialog`] - Modal that owns the fields and the async submit
//! - [`pin_setup`] - Create, update and remove a vault PIN
//!
//! # Architecture
//!
//! Components are indices into parallel arrays. Each component:
//! 1. Allocates an index from the registry
//! 2. Sets its interaction flags (focusable, tab index, disabled)
//! 3. Registers keyboard and paste handlers for that index
//! 4. Returns a cleanup function
//!
//! Values live in signals owned by the caller, so the caller always sees
//! the current cells without asking the component.

pub mod code_input;
pub mod dialog;
pub mod pin_setup;
pub mod text_field;
mod types;

pub use code_input::{code_input, is_blank, is_complete, joined_code, CodeCells, FocusRequest};
pub use dialog::{
    code_dialog, ButtonView, CellView, DialogHandle, DialogPhase, DialogView, FieldView,
    EMAIL_PLACEHOLDER,
};
pub use pin_setup::{PinField, PinSetupForm, PinStatus, SetupMode, VaultPinApi};
pub use text_field::text_field;
pub use types::*;
