//! Errors - Failures surfaced to the host application.
//!
//! Malformed keystrokes and pastes are never errors; they are dropped where
//! they arrive. What remains is what a caller can act on: the verification
//! collaborator rejecting a code, and client-side PIN setup validation.

use thiserror::Error;

/// Failure reported by the external verification collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("invalid PIN or MPIN")]
    InvalidCredentials,

    #[error("access to this patient's records was denied")]
    AccessDenied,

    #[error("network error: {0}")]
    Network(String),

    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },
}

impl SubmitError {
    /// Text to show the user after a failed access attempt.
    ///
    /// Only a server-provided message is passed through; everything else
    /// collapses to the generic failure text.
    pub fn user_message(&self) -> String {
        match self {
            SubmitError::Server { message, .. } if !message.is_empty() => message.clone(),
            _ => "Failed to access medical records".to_string(),
        }
    }
}

/// Vault PIN setup failures, carrying the exact text shown to the patient.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PinSetupError {
    #[error("PIN must be exactly 6 digits")]
    InvalidPin,

    #[error("PINs do not match")]
    Mismatch,

    #[error("New PIN must be exactly 6 digits")]
    InvalidNewPin,

    #[error("New PINs do not match")]
    NewPinMismatch,

    #[error("Current PIN is required")]
    CurrentPinRequired,

    #[error("Invalid PIN format")]
    InvalidPinFormat,

    #[error("a PIN change is already in progress")]
    Busy,

    #[error(transparent)]
    Api(#[from] SubmitError),
}

/// Layout computation failure.
#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("layout engine error: {0}")]
    Taffy(#[from] taffy::TaffyError),
}
