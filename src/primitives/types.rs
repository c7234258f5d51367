//! Primitive types - Props, callbacks and cleanup.
//!
//! These types define the interface for component props.
//! Props support static values, signals, and getters for reactivity.

use std::rc::Rc;

use futures::future::LocalBoxFuture;
use spark_signals::Signal;

use crate::error::SubmitError;
use crate::session::SessionContext;

// =============================================================================
// Cleanup Function
// =============================================================================

/// Cleanup function returned by components.
///
/// Call this to unmount the component and release resources.
pub type Cleanup = Box<dyn FnOnce()>;

// =============================================================================
// Callback Types
// =============================================================================

/// Code value change callback (receives the full cell array).
pub type CodeChangeCallback = Rc<dyn Fn(&[String])>;

/// Text value change callback.
pub type TextChangeCallback = Rc<dyn Fn(&str)>;

/// Dialog closed callback.
pub type CloseCallback = Rc<dyn Fn()>;

/// Future returned by the verification collaborator.
pub type SubmitFuture = LocalBoxFuture<'static, Result<(), SubmitError>>;

/// Async verification collaborator. Called once per accepted submit.
pub type SubmitCallback = Rc<dyn Fn(SubmitRequest) -> SubmitFuture>;

/// Called when a keyboard-initiated submit settles.
pub type SettledCallback = Rc<dyn Fn(&SubmitOutcome)>;

// =============================================================================
// Prop Value - Reactive property wrapper
// =============================================================================

/// A property value that can be static, a signal, or a getter.
#[derive(Clone)]
pub enum PropValue<T: Clone + PartialEq + 'static> {
    /// Static value (not reactive).
    Static(T),
    /// Reactive signal, read on every access.
    Signal(Signal<T>),
    /// Getter function (called each time value is needed).
    Getter(Rc<dyn Fn() -> T>),
}

impl<T: Clone + PartialEq + 'static> PropValue<T> {
    /// Get the current value (for immediate reads).
    pub fn get(&self) -> T {
        match self {
            PropValue::Static(v) => v.clone(),
            PropValue::Signal(s) => s.get(),
            PropValue::Getter(f) => f(),
        }
    }
}

impl<T: Clone + PartialEq + Default + 'static> Default for PropValue<T> {
    fn default() -> Self {
        PropValue::Static(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> From<T> for PropValue<T> {
    fn from(value: T) -> Self {
        PropValue::Static(value)
    }
}

impl<T: Clone + PartialEq + 'static> From<Signal<T>> for PropValue<T> {
    fn from(signal: Signal<T>) -> Self {
        PropValue::Signal(signal)
    }
}

// =============================================================================
// Code Input Props
// =============================================================================

/// Properties for the segmented code input.
///
/// The cell array is two-way bound through `value`; the component keeps its
/// length at `length` and only ever writes `""` or a single ASCII digit.
///
/// # Example
///
/// ```ignore
/// use vault_pin_tui::primitives::{code_input, CodeInputProps};
/// use spark_signals::signal;
///
/// let cells = signal(vec![String::new(); 6]);
/// let cleanup = code_input(CodeInputProps {
///     masked: true,
///     ..CodeInputProps::new(cells.clone())
/// });
/// ```
pub struct CodeInputProps {
    /// Component ID. Cells get `<id>-cell-<k>`.
    pub id: Option<String>,

    /// Two-way bound cell values.
    pub value: Signal<Vec<String>>,

    /// Number of cells (default: 6, minimum 1).
    pub length: usize,

    /// Render cells with `mask_char` instead of the digit.
    pub masked: bool,

    /// Mask character (default: '•').
    pub mask_char: Option<char>,

    /// While true the cells ignore input and can't take focus.
    pub disabled: PropValue<bool>,

    /// Tab index of the first cell; cell k gets `tab_index + k`.
    pub tab_index: i32,

    /// Called after every accepted change or paste.
    pub on_change: Option<CodeChangeCallback>,
}

impl CodeInputProps {
    pub fn new(value: Signal<Vec<String>>) -> Self {
        Self {
            id: None,
            value,
            length: 6,
            masked: false,
            mask_char: None,
            disabled: PropValue::Static(false),
            tab_index: 0,
            on_change: None,
        }
    }
}

// =============================================================================
// Text Field Props
// =============================================================================

/// Properties for the single-line text field (email).
pub struct TextFieldProps {
    pub id: Option<String>,

    /// Two-way bound value.
    pub value: Signal<String>,

    /// Shown dimmed while the value is empty.
    pub placeholder: Option<String>,

    pub disabled: PropValue<bool>,

    pub tab_index: i32,

    /// Maximum number of characters (0 = unlimited).
    pub max_length: usize,

    pub on_change: Option<TextChangeCallback>,
}

impl TextFieldProps {
    pub fn new(value: Signal<String>) -> Self {
        Self {
            id: None,
            value,
            placeholder: None,
            disabled: PropValue::Static(false),
            tab_index: 0,
            max_length: 0,
            on_change: None,
        }
    }
}

// =============================================================================
// Dialog Types
// =============================================================================

/// Which host dialog to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogVariant {
    /// Vault PIN only.
    #[default]
    VaultPin,
    /// Patient email plus masked MPIN.
    PatientAccess,
}

impl DialogVariant {
    pub fn title(&self) -> &'static str {
        match self {
            DialogVariant::VaultPin => "Enter Patient PIN",
            DialogVariant::PatientAccess => "Access Patient Records",
        }
    }

    pub fn subtitle(&self) -> &'static str {
        match self {
            DialogVariant::VaultPin => "Enter the 6-digit PIN to access patient medical records",
            DialogVariant::PatientAccess => "Enter patient's email and 6-digit MPIN",
        }
    }

    pub fn helper_text(&self) -> &'static str {
        match self {
            DialogVariant::VaultPin => "The PIN is setup by the patient.",
            DialogVariant::PatientAccess => {
                "The MPIN is set by the patient during registration. You can only access records of patients mapped to you."
            }
        }
    }

    /// Label above the code cells, if any.
    pub fn code_label(&self) -> Option<&'static str> {
        match self {
            DialogVariant::VaultPin => None,
            DialogVariant::PatientAccess => Some("Patient MPIN"),
        }
    }

    pub fn submit_label(&self) -> &'static str {
        "Access Records"
    }

    /// Submit label while a submit is in flight.
    pub fn busy_label(&self) -> &'static str {
        "Verifying..."
    }

    pub fn requires_email(&self) -> bool {
        matches!(self, DialogVariant::PatientAccess)
    }

    /// The MPIN cells are masked; the vault PIN shows its digits.
    pub fn masks_code(&self) -> bool {
        matches!(self, DialogVariant::PatientAccess)
    }

    /// Whether a reset moves focus back to the first cell.
    pub fn refocus_on_reset(&self) -> bool {
        matches!(self, DialogVariant::VaultPin)
    }
}

/// What the dialog hands to the verification collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitPayload {
    Pin { code: String },
    PatientAccess { email: String, code: String },
}

impl SubmitPayload {
    pub fn code(&self) -> &str {
        match self {
            SubmitPayload::Pin { code } => code,
            SubmitPayload::PatientAccess { code, .. } => code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub payload: SubmitPayload,
    pub session: SessionContext,
}

/// Result of a `submit()` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The collaborator accepted the code.
    Accepted,
    /// The collaborator rejected the code; fields are retained.
    Rejected(SubmitError),
    /// Preconditions not met; the collaborator was not called.
    Skipped,
}

/// Properties for the host dialog.
pub struct CodeDialogProps {
    pub id: Option<String>,

    pub variant: DialogVariant,

    /// Number of code cells (default: 6).
    pub code_length: usize,

    pub on_submit: SubmitCallback,

    /// Called whenever the dialog transitions to closed.
    pub on_close: Option<CloseCallback>,

    /// Called when a submit started from the keyboard settles.
    pub on_settled: Option<SettledCallback>,

    /// Host-driven busy flag; disables the dialog while true.
    pub loading: Option<PropValue<bool>>,

    pub session: SessionContext,
}

impl CodeDialogProps {
    pub fn new(variant: DialogVariant, on_submit: SubmitCallback) -> Self {
        Self {
            id: None,
            variant,
            code_length: 6,
            on_submit,
            on_close: None,
            on_settled: None,
            loading: None,
            session: SessionContext::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spark_signals::signal;

    #[test]
    fn test_prop_value_reads_current() {
        let s = signal(false);
        let prop: PropValue<bool> = s.clone().into();
        assert!(!prop.get());
        s.set(true);
        assert!(prop.get());

        let getter = PropValue::Getter(Rc::new(|| 7u8));
        assert_eq!(getter.get(), 7);
    }

    #[test]
    fn test_variant_labels() {
        assert_eq!(DialogVariant::VaultPin.title(), "Enter Patient PIN");
        assert_eq!(DialogVariant::PatientAccess.title(), "Access Patient Records");
        assert!(DialogVariant::PatientAccess.requires_email());
        assert!(!DialogVariant::VaultPin.masks_code());
        assert!(DialogVariant::VaultPin.refocus_on_reset());
        assert!(!DialogVariant::PatientAccess.refocus_on_reset());
    }
}
