//! # vault-pin-tui
//!
//! Segmented PIN / MPIN entry for the terminal, built on
//! [spark-signals](https://github.com/RLabs-Inc/spark-signals).
//!
//! ## Architecture
//!
//! Components are indices into parallel arrays rather than objects. Values
//! live in signals owned by the caller; focus, keyboard and paste handling
//! are thread-local registries keyed by component index.
//!
//! ```text
//! crossterm event ─▶ route_event ─▶ focused handler ─▶ Signal<Vec<String>>
//!                                                         │
//! DialogHandle::view ─▶ compute_dialog_layout ─▶ paint ─▶ DiffRenderer
//! ```
//!
//! ## Modules
//!
//! - [`primitives`] - Code input, text field, PIN dialog, PIN setup form
//! - [`state`] - Focus, keyboard, clipboard, input routing, global keys
//! - [`engine`] - Component registry and interaction arrays
//! - [`layout`] - Taffy dialog geometry and text measurement
//! - [`renderer`] - Frame buffer, painter, diff renderer
//! - [`pipeline`] - Mount, frame loop, local task pool
//! - [`session`] - Caller session passed to submit callbacks
//! - [`theme`] - Semantic colors and presets

pub mod engine;
pub mod error;
pub mod layout;
pub mod pipeline;
pub mod primitives;
pub mod renderer;
pub mod session;
pub mod state;
pub mod theme;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use error::{LayoutError, PinSetupError, SubmitError};

pub use session::{DoctorInfo, Role, SessionContext};

pub use engine::{allocate_index, get_index, release_index, reset_registry};

pub use layout::{compute_dialog_layout, DialogLayout};

pub use renderer::{paint_dialog, paint_open_dialog, DiffRenderer, FrameBuffer};

pub use pipeline::{mount, run, tick, unmount, MountHandle};

pub use primitives::{
    code_dialog, code_input, text_field, CodeDialogProps, CodeInputProps, DialogHandle,
    DialogPhase, DialogVariant, PinField, PinSetupForm, PinStatus, PropValue, SetupMode,
    SubmitOutcome, SubmitPayload, SubmitRequest, TextFieldProps, VaultPinApi,
};

pub use state::{
    blur, focus, focus_next, focus_previous, get_focused_index, reset_focus_state,
    reset_keyboard_state, KeyboardEvent, Modifiers,
};

pub use theme::{active_theme, get_preset, set_theme, Theme, ThemeColor};
