//! Pin Setup - Create, update and remove a patient's vault PIN.
//!
//! Headless form state: the host renders it and forwards edits. Fields only
//! ever hold up to six digits; anything else typed or pasted is stripped.
//! Validation runs in a fixed order and reports the first failure with the
//! text shown to the patient.
//!
//! # Example
//!
//! ```ignore
//! use vault_pin_tui::primitives::pin_setup::{PinField, PinSetupForm};
//!
//! let form = PinSetupForm::new();
//! form.start_create();
//! form.set_field(PinField::Pin, "123456");
//! form.set_field(PinField::Confirm, "123456");
//! form.submit(&api).await?;
//! ```

use std::rc::Rc;

use futures::future::LocalBoxFuture;
use serde::Deserialize;
use spark_signals::{signal, Signal};

use crate::error::{PinSetupError, SubmitError};

/// Vault PINs are exactly this many digits.
pub const PIN_LENGTH: usize = 6;

// =============================================================================
// Collaborator
// =============================================================================

/// Current vault PIN state as reported by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinStatus {
    pub has_pin_set: bool,
    #[serde(default)]
    pub pin_created_at: Option<String>,
    #[serde(default)]
    pub pin_last_updated: Option<String>,
}

/// Backend that stores the patient's vault PIN.
pub trait VaultPinApi {
    fn check_status(&self) -> LocalBoxFuture<'static, Result<PinStatus, SubmitError>>;

    fn setup_pin(&self, pin: &str, confirm: &str) -> LocalBoxFuture<'static, Result<(), SubmitError>>;

    fn update_pin(
        &self,
        old_pin: &str,
        new_pin: &str,
        confirm: &str,
    ) -> LocalBoxFuture<'static, Result<(), SubmitError>>;

    fn remove_pin(&self, pin: &str) -> LocalBoxFuture<'static, Result<(), SubmitError>>;
}

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupMode {
    Create,
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinField {
    /// Existing PIN (update only).
    Current,
    Pin,
    Confirm,
}

/// A validated change, ready for the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinChange {
    Create { pin: String, confirm: String },
    Update { current: String, pin: String, confirm: String },
}

/// Keep digits only, at most six.
pub fn filter_pin_input(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).take(PIN_LENGTH).collect()
}

fn is_valid_pin(pin: &str) -> bool {
    pin.len() == PIN_LENGTH && pin.chars().all(|c| c.is_ascii_digit())
}

// =============================================================================
// Form
// =============================================================================

#[derive(Clone)]
pub struct PinSetupForm {
    mode: Signal<Option<SetupMode>>,
    current: Signal<String>,
    pin: Signal<String>,
    confirm: Signal<String>,
    submitting: Signal<bool>,
    status: Signal<PinStatus>,
}

impl Default for PinSetupForm {
    fn default() -> Self {
        Self::new()
    }
}

impl PinSetupForm {
    pub fn new() -> Self {
        Self {
            mode: signal(None),
            current: signal(String::new()),
            pin: signal(String::new()),
            confirm: signal(String::new()),
            submitting: signal(false),
            status: signal(PinStatus::default()),
        }
    }

    pub fn mode(&self) -> Option<SetupMode> {
        self.mode.get()
    }

    pub fn status(&self) -> PinStatus {
        self.status.get()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.get()
    }

    pub fn field(&self, field: PinField) -> String {
        self.signal_for(field).get()
    }

    fn signal_for(&self, field: PinField) -> &Signal<String> {
        match field {
            PinField::Current => &self.current,
            PinField::Pin => &self.pin,
            PinField::Confirm => &self.confirm,
        }
    }

    fn clear_fields(&self) {
        self.current.set(String::new());
        self.pin.set(String::new());
        self.confirm.set(String::new());
    }

    pub fn start_create(&self) {
        if !self.is_submitting() {
            self.clear_fields();
            self.mode.set(Some(SetupMode::Create));
        }
    }

    pub fn start_update(&self) {
        if !self.is_submitting() {
            self.clear_fields();
            self.mode.set(Some(SetupMode::Update));
        }
    }

    /// Leave the form. Ignored while a change is in flight.
    pub fn cancel(&self) {
        if !self.is_submitting() {
            self.clear_fields();
            self.mode.set(None);
        }
    }

    /// Store a field edit, stripped to at most six digits.
    pub fn set_field(&self, field: PinField, raw: &str) {
        if self.is_submitting() {
            return;
        }
        self.signal_for(field).set(filter_pin_input(raw));
    }

    /// Every field the current mode shows holds six characters.
    pub fn can_submit(&self) -> bool {
        if self.is_submitting() {
            return false;
        }
        let full = |s: &Signal<String>| s.get().len() == PIN_LENGTH;
        match self.mode() {
            Some(SetupMode::Create) => full(&self.pin) && full(&self.confirm),
            Some(SetupMode::Update) => full(&self.current) && full(&self.pin) && full(&self.confirm),
            None => false,
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match (self.mode(), self.is_submitting()) {
            (Some(SetupMode::Update), true) => "Updating...",
            (Some(SetupMode::Update), false) => "Update PIN",
            (_, true) => "Creating...",
            (_, false) => "Create PIN",
        }
    }

    /// Check the fields in the order the patient sees the messages.
    pub fn validate(&self) -> Result<PinChange, PinSetupError> {
        let pin = self.pin.get();
        let confirm = self.confirm.get();

        match self.mode() {
            Some(SetupMode::Update) => {
                if !is_valid_pin(&pin) {
                    return Err(PinSetupError::InvalidNewPin);
                }
                if pin != confirm {
                    return Err(PinSetupError::NewPinMismatch);
                }
                let current = self.current.get();
                if current.is_empty() {
                    return Err(PinSetupError::CurrentPinRequired);
                }
                Ok(PinChange::Update { current, pin, confirm })
            }
            _ => {
                if !is_valid_pin(&pin) {
                    return Err(PinSetupError::InvalidPin);
                }
                if pin != confirm {
                    return Err(PinSetupError::Mismatch);
                }
                Ok(PinChange::Create { pin, confirm })
            }
        }
    }

    /// Validate and send the change.
    ///
    /// On success the fields clear and the form closes. On failure the
    /// fields are kept for another try.
    pub async fn submit(&self, api: &dyn VaultPinApi) -> Result<(), PinSetupError> {
        if self.is_submitting() {
            return Err(PinSetupError::Busy);
        }
        let change = self.validate()?;

        self.submitting.set(true);
        let result = match &change {
            PinChange::Create { pin, confirm } => {
                tracing::info!("creating vault PIN");
                api.setup_pin(pin, confirm).await
            }
            PinChange::Update { current, pin, confirm } => {
                tracing::info!("updating vault PIN");
                api.update_pin(current, pin, confirm).await
            }
        };
        self.submitting.set(false);

        match result {
            Ok(()) => {
                self.clear_fields();
                self.mode.set(None);
                self.status.set(PinStatus {
                    has_pin_set: true,
                    ..self.status.get()
                });
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "vault PIN change failed");
                Err(err.into())
            }
        }
    }

    /// Disable vault access. An empty PIN means the patient backed out:
    /// nothing is sent and `Ok(false)` is returned.
    pub async fn remove(&self, api: &dyn VaultPinApi, pin: &str) -> Result<bool, PinSetupError> {
        if pin.is_empty() {
            return Ok(false);
        }
        if !is_valid_pin(pin) {
            return Err(PinSetupError::InvalidPinFormat);
        }

        tracing::info!("removing vault PIN");
        match api.remove_pin(pin).await {
            Ok(()) => {
                self.status.set(PinStatus::default());
                Ok(true)
            }
            Err(err) => {
                tracing::warn!(error = %err, "vault PIN removal failed");
                Err(err.into())
            }
        }
    }

    /// Reload the status from the backend. A failure keeps the last known
    /// status.
    pub async fn refresh_status(&self, api: &dyn VaultPinApi) -> PinStatus {
        match api.check_status().await {
            Ok(status) => {
                self.status.set(status);
            }
            Err(err) => tracing::warn!(error = %err, "vault PIN status check failed"),
        }
        self.status.get()
    }
}

/// Share one API client between several forms.
impl<T: VaultPinApi + ?Sized> VaultPinApi for Rc<T> {
    fn check_status(&self) -> LocalBoxFuture<'static, Result<PinStatus, SubmitError>> {
        (**self).check_status()
    }

    fn setup_pin(&self, pin: &str, confirm: &str) -> LocalBoxFuture<'static, Result<(), SubmitError>> {
        (**self).setup_pin(pin, confirm)
    }

    fn update_pin(
        &self,
        old_pin: &str,
        new_pin: &str,
        confirm: &str,
    ) -> LocalBoxFuture<'static, Result<(), SubmitError>> {
        (**self).update_pin(old_pin, new_pin, confirm)
    }

    fn remove_pin(&self, pin: &str) -> LocalBoxFuture<'static, Result<(), SubmitError>> {
        (**self).remove_pin(pin)
    }
}

// =============================================================================
// Tests
// =============================================================================
