//! Dialog Primitive - Modal host for the segmented code input.
//!
//! The dialog owns the submit lifecycle of a code:
//!
//! ```text
//! Closed ──open()──▶ Editing ──submit()──▶ Submitting
//!   ▲                 │  ▲                    │
//!   └────close()──────┘  └──── settles ───────┘
//! ```
//!
//! - Opening clears every field, saves the previous focus, pushes a focus
//!   trap and focuses the first field.
//! - While Submitting (or while the host's `loading` flag is set) every
//!   input and reset are disabled and a second submit is skipped.
//! - Closing during a submit abandons it: when the future settles it
//!   leaves the dialog alone. Each open bumps a generation counter to tell
//!   stale results apart.
//!
//! # Keys
//!
//! - Enter: submit (reset when the reset button is focused)
//! - Escape: close
//! - Ctrl+R: reset
//! - Tab / Shift+Tab: cycle inside the dialog (global keys)
//!
//! # Example
//!
//! ```ignore
//! use vault_pin_tui::primitives::{code_dialog, CodeDialogProps, DialogVariant};
//! use futures::FutureExt;
//! use std::rc::Rc;
//!
//! let dialog = code_dialog(CodeDialogProps::new(
//!     DialogVariant::VaultPin,
//!     Rc::new(|request| api.verify_vault_pin(request).boxed_local()),
//! ));
//!
//! dialog.open();
//! // ...user types six digits
//! match dialog.submit().await {
//!     SubmitOutcome::Accepted => dialog.close(),
//!     SubmitOutcome::Rejected(err) => toast(err.user_message()),
//!     SubmitOutcome::Skipped => {}
//! }
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use futures::future::{self, FutureExt, LocalBoxFuture};
use spark_signals::{signal, Signal};

use crate::engine::{
    allocate_index, get_allocated_indices, get_index, interaction, is_descendant_of,
    pop_parent_context, push_parent_context, release_index,
};
use crate::pipeline::tasks;
use crate::session::SessionContext;
use crate::state::{focus, keyboard};
use crate::types::ComponentType;

use super::code_input::{
    cell_glyph, code_input, find_cells, is_blank, is_complete, joined_code, CodeCells,
    FocusRequest, DEFAULT_MASK_CHAR,
};
use super::text_field::{display_text, text_field};
use super::types::{
    Cleanup, CloseCallback, CodeDialogProps, CodeInputProps, DialogVariant, PropValue,
    SettledCallback, SubmitCallback, SubmitOutcome, SubmitPayload, SubmitRequest, TextFieldProps,
};

/// Placeholder of the patient email field.
pub const EMAIL_PLACEHOLDER: &str = "patient@example.com";

thread_local! {
    static NEXT_DIALOG_ID: Cell<usize> = const { Cell::new(0) };
}

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogPhase {
    #[default]
    Closed,
    Editing,
    Submitting,
}

struct Mounted {
    index: usize,
    cleanups: Vec<Cleanup>,
}

struct DialogState {
    id: String,
    variant: DialogVariant,
    code_length: usize,
    on_submit: SubmitCallback,
    on_close: Option<CloseCallback>,
    on_settled: Option<SettledCallback>,
    loading: Option<PropValue<bool>>,
    session: RefCell<SessionContext>,

    phase: Signal<DialogPhase>,
    generation: Cell<u64>,
    cells: Signal<Vec<String>>,
    email: Signal<String>,
    last_error: Signal<Option<String>>,
    mounted: RefCell<Option<Mounted>>,
}

impl DialogState {
    fn is_disabled(&self) -> bool {
        self.phase.get() == DialogPhase::Submitting
            || self.loading.as_ref().is_some_and(|l| l.get())
    }

    fn index(&self) -> Option<usize> {
        self.mounted.borrow().as_ref().map(|m| m.index)
    }

    fn code_id(&self) -> String {
        format!("{}-code", self.id)
    }

    fn email_id(&self) -> String {
        format!("{}-email", self.id)
    }

    fn reset_id(&self) -> String {
        format!("{}-reset", self.id)
    }

    fn submit_id(&self) -> String {
        format!("{}-submit", self.id)
    }
}

/// Handle to a host dialog. Cheap to clone; all clones share one dialog.
#[derive(Clone)]
pub struct DialogHandle {
    inner: Rc<DialogState>,
}

/// Create a host dialog (initially closed).
pub fn code_dialog(props: CodeDialogProps) -> DialogHandle {
    let id = props.id.unwrap_or_else(|| {
        NEXT_DIALOG_ID.with(|next| {
            let n = next.get();
            next.set(n + 1);
            format!("dialog-{n}")
        })
    });
    let code_length = props.code_length.max(1);

    DialogHandle {
        inner: Rc::new(DialogState {
            id,
            variant: props.variant,
            code_length,
            on_submit: props.on_submit,
            on_close: props.on_close,
            on_settled: props.on_settled,
            loading: props.loading,
            session: RefCell::new(props.session),
            phase: signal(DialogPhase::Closed),
            generation: Cell::new(0),
            cells: signal(vec![String::new(); code_length]),
            email: signal(String::new()),
            last_error: signal(None),
            mounted: RefCell::new(None),
        }),
    }
}

// =============================================================================
// Queries
// =============================================================================

impl DialogHandle {
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn variant(&self) -> DialogVariant {
        self.inner.variant
    }

    pub fn phase(&self) -> DialogPhase {
        self.inner.phase.get()
    }

    pub fn is_open(&self) -> bool {
        self.phase() != DialogPhase::Closed
    }

    /// Component index of the dialog container while open.
    pub fn index(&self) -> Option<usize> {
        self.inner.index()
    }

    /// Submitting, or the host says it is busy.
    pub fn is_disabled(&self) -> bool {
        self.inner.is_disabled()
    }

    pub fn code(&self) -> Vec<String> {
        self.inner.cells.get()
    }

    pub fn joined_code(&self) -> String {
        joined_code(&self.inner.cells.get())
    }

    pub fn email(&self) -> String {
        self.inner.email.get()
    }

    /// User-facing text of the last rejected submit, until the next open,
    /// reset or submit.
    pub fn last_error(&self) -> Option<String> {
        self.inner.last_error.get()
    }

    /// Component indices of the mounted code cells.
    pub fn cell_indices(&self) -> Vec<usize> {
        find_cells(&self.inner.code_id())
    }

    pub fn email_index(&self) -> Option<usize> {
        get_index(&self.inner.email_id())
    }

    pub fn reset_button_index(&self) -> Option<usize> {
        get_index(&self.inner.reset_id())
    }

    pub fn submit_button_index(&self) -> Option<usize> {
        get_index(&self.inner.submit_id())
    }

    fn email_present(&self) -> bool {
        !self.inner.variant.requires_email() || !self.inner.email.get().is_empty()
    }

    /// Submit is possible right now.
    pub fn can_submit(&self) -> bool {
        self.phase() == DialogPhase::Editing
            && !self.is_disabled()
            && is_complete(&self.inner.cells.get())
            && self.email_present()
    }

    /// Something has been entered and the dialog is not busy.
    pub fn can_reset(&self) -> bool {
        if self.phase() != DialogPhase::Editing || self.is_disabled() {
            return false;
        }
        !is_blank(&self.inner.cells.get())
            || (self.inner.variant.requires_email() && !self.inner.email.get().is_empty())
    }

    pub fn session(&self) -> SessionContext {
        self.inner.session.borrow().clone()
    }

    /// Replace the session attached to future submits.
    pub fn set_session(&self, session: SessionContext) {
        *self.inner.session.borrow_mut() = session;
    }
}

// =============================================================================
// Open / Close
// =============================================================================

impl DialogHandle {
    /// Open the dialog with empty fields. No-op when already open.
    pub fn open(&self) {
        let state = &self.inner;
        if state.phase.get() != DialogPhase::Closed {
            return;
        }

        state.generation.set(state.generation.get() + 1);
        state.cells.set(vec![String::new(); state.code_length]);
        state.email.set(String::new());
        state.last_error.set(None);
        state.phase.set(DialogPhase::Editing);

        focus::save_focus_to_history();
        let mounted = self.mount_components();
        let index = mounted.index;
        *state.mounted.borrow_mut() = Some(mounted);

        focus::push_focus_trap(index);
        self.sync_interaction();

        let first = match state.variant {
            DialogVariant::PatientAccess => self.email_index(),
            DialogVariant::VaultPin => self.cell_indices().first().copied(),
        };
        if let Some(first) = first {
            focus::focus(first);
        }

        tracing::info!(dialog = %state.id, variant = ?state.variant, "dialog opened");
    }

    /// Close the dialog. An in-flight submit is abandoned.
    pub fn close(&self) {
        let state = &self.inner;
        let previous = state.phase.get();
        if previous == DialogPhase::Closed {
            return;
        }

        state.phase.set(DialogPhase::Closed);

        let mounted = state.mounted.borrow_mut().take();
        if let Some(mounted) = mounted {
            focus::remove_focus_trap(mounted.index);
            for cleanup in mounted.cleanups {
                cleanup();
            }
            release_index(mounted.index);
        }
        if !focus::restore_focus_from_history() {
            focus::blur();
        }

        if previous == DialogPhase::Submitting {
            tracing::info!(dialog = %state.id, "dialog closed during submit, result will be ignored");
        } else {
            tracing::info!(dialog = %state.id, "dialog closed");
        }

        if let Some(ref on_close) = state.on_close {
            on_close();
        }
    }

    fn mount_components(&self) -> Mounted {
        let state = &self.inner;
        let weak = Rc::downgrade(&self.inner);

        let index = allocate_index(Some(&state.id));
        interaction::set_component_type(index, ComponentType::Dialog);

        let disabled: PropValue<bool> = {
            let weak = weak.clone();
            PropValue::Getter(Rc::new(move || weak.upgrade().is_some_and(|s| s.is_disabled())))
        };

        let mut cleanups: Vec<Cleanup> = Vec::new();
        push_parent_context(index);

        // Tab order: email, cells, reset, submit
        let mut tab = 0;
        if state.variant.requires_email() {
            cleanups.push(text_field(TextFieldProps {
                id: Some(state.email_id()),
                placeholder: Some(EMAIL_PLACEHOLDER.to_string()),
                disabled: disabled.clone(),
                tab_index: tab,
                ..TextFieldProps::new(state.email.clone())
            }));
            tab += 1;
        }

        cleanups.push(code_input(CodeInputProps {
            id: Some(state.code_id()),
            length: state.code_length,
            masked: state.variant.masks_code(),
            disabled,
            tab_index: tab,
            ..CodeInputProps::new(state.cells.clone())
        }));
        tab += state.code_length as i32;

        let reset = button(&state.reset_id(), tab);
        let submit = button(&state.submit_id(), tab + 1);
        pop_parent_context();

        // ==========================================================================
        // BUTTON HANDLERS
        // ==========================================================================

        let reset_weak = weak.clone();
        let reset_cleanup = keyboard::on_focused(reset, move |event| {
            if !is_activation(&event.key) || event.modifiers.has_command() {
                return false;
            }
            if let Some(dialog) = upgrade(&reset_weak) {
                if dialog.can_reset() {
                    dialog.reset_fields();
                }
            }
            true
        });
        cleanups.push(Box::new(reset_cleanup));

        let submit_weak = weak.clone();
        let submit_cleanup = keyboard::on_focused(submit, move |event| {
            if !is_activation(&event.key) || event.modifiers.has_command() {
                return false;
            }
            if let Some(dialog) = upgrade(&submit_weak) {
                dialog.submit_in_background();
            }
            true
        });
        cleanups.push(Box::new(submit_cleanup));

        // ==========================================================================
        // DIALOG KEYS - only while this dialog holds the top focus trap
        // ==========================================================================

        let keys_cleanup = keyboard::on(move |event| {
            if focus::get_focus_trap_container() != Some(index) {
                return false;
            }
            let Some(dialog) = upgrade(&weak) else {
                return false;
            };

            if event.is_ctrl("r") {
                if dialog.can_reset() {
                    dialog.reset_fields();
                }
                return true;
            }
            if event.modifiers.has_command() {
                return false;
            }

            match event.key.as_str() {
                "Enter" => {
                    dialog.submit_in_background();
                    true
                }
                "Escape" => {
                    dialog.close();
                    true
                }
                _ => false,
            }
        });
        cleanups.push(Box::new(keys_cleanup));

        for button_index in [reset, submit] {
            cleanups.push(Box::new(move || keyboard::cleanup_index(button_index)));
        }

        Mounted { index, cleanups }
    }

    /// Mirror the disabled state into the interaction arrays so disabled
    /// fields drop out of Tab order.
    fn sync_interaction(&self) {
        let Some(root) = self.index() else { return };
        let disabled = self.is_disabled();
        for i in get_allocated_indices() {
            if i != root && is_descendant_of(i, root) && interaction::get_focusable(i) {
                interaction::set_disabled(i, disabled);
            }
        }
    }
}

fn upgrade(weak: &Weak<DialogState>) -> Option<DialogHandle> {
    weak.upgrade().map(|inner| DialogHandle { inner })
}

fn is_activation(key: &str) -> bool {
    key == "Enter" || key == " "
}

fn button(id: &str, tab_index: i32) -> usize {
    let index = allocate_index(Some(id));
    interaction::set_component_type(index, ComponentType::Button);
    interaction::set_focusable(index, true);
    interaction::set_tab_index(index, tab_index);
    index
}

// =============================================================================
// Reset / Submit
// =============================================================================

impl DialogHandle {
    /// Clear the code (and email). Ignored while disabled.
    ///
    /// The vault PIN dialog moves focus back to the first cell; the patient
    /// access dialog leaves focus where it is.
    pub fn reset_fields(&self) -> bool {
        let state = &self.inner;
        if state.phase.get() != DialogPhase::Editing || self.is_disabled() {
            return false;
        }

        let mut code = CodeCells::new(state.code_length);
        let request = code.reset(state.variant.refocus_on_reset());
        state.cells.set(code.into_cells());
        if state.variant.requires_email() {
            state.email.set(String::new());
        }
        state.last_error.set(None);

        if let Some(FocusRequest(k)) = request {
            if let Some(&cell) = self.cell_indices().get(k) {
                focus::focus(cell);
            }
        }
        tracing::debug!(dialog = %state.id, "fields reset");
        true
    }

    /// Hand the code to the verification collaborator.
    ///
    /// Skipped (collaborator not called) unless the dialog is editing, not
    /// disabled and every required field is filled. Otherwise the dialog is
    /// Submitting from the moment this returns until the future settles.
    pub fn submit(&self) -> LocalBoxFuture<'static, SubmitOutcome> {
        let state = &self.inner;
        if !self.can_submit() {
            tracing::debug!(dialog = %state.id, phase = ?state.phase.get(), "submit skipped");
            return future::ready(SubmitOutcome::Skipped).boxed_local();
        }

        let code = joined_code(&state.cells.get());
        let payload = match state.variant {
            DialogVariant::VaultPin => SubmitPayload::Pin { code },
            DialogVariant::PatientAccess => SubmitPayload::PatientAccess {
                email: state.email.get(),
                code,
            },
        };
        let request = SubmitRequest {
            payload,
            session: state.session.borrow().clone(),
        };

        let generation = state.generation.get();
        state.last_error.set(None);
        state.phase.set(DialogPhase::Submitting);
        self.sync_interaction();
        tracing::info!(dialog = %state.id, variant = ?state.variant, "submitting code");

        let pending = (state.on_submit)(request);
        let dialog = self.clone();

        async move {
            let result = pending.await;
            let state = &dialog.inner;
            let current =
                state.generation.get() == generation && state.phase.get() == DialogPhase::Submitting;

            if current {
                state.phase.set(DialogPhase::Editing);
                dialog.sync_interaction();
            } else {
                tracing::debug!(dialog = %state.id, "stale submit settled, dialog untouched");
            }

            match result {
                Ok(()) => {
                    tracing::info!(dialog = %state.id, "code accepted");
                    SubmitOutcome::Accepted
                }
                Err(err) => {
                    tracing::warn!(dialog = %state.id, error = %err, "code rejected");
                    if current {
                        state.last_error.set(Some(err.user_message()));
                    }
                    SubmitOutcome::Rejected(err)
                }
            }
        }
        .boxed_local()
    }

    /// Submit on the local task pool, reporting the outcome to `on_settled`.
    /// Returns false when the submit was skipped.
    pub fn submit_in_background(&self) -> bool {
        if !self.can_submit() {
            return false;
        }
        let pending = self.submit();
        let on_settled = self.inner.on_settled.clone();
        tasks::spawn(async move {
            let outcome = pending.await;
            if let Some(cb) = on_settled {
                cb(&outcome);
            }
        })
    }
}

// =============================================================================
// View
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    pub text: String,
    /// True while the placeholder is shown.
    pub placeholder: bool,
    /// Caret offset in characters, when the field is focused.
    pub cursor: Option<usize>,
    pub focused: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellView {
    pub glyph: String,
    pub filled: bool,
    pub focused: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonView {
    pub label: &'static str,
    pub enabled: bool,
    pub focused: bool,
}

/// Snapshot of everything the renderer draws for an open dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogView {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub helper: &'static str,
    pub email_label: Option<&'static str>,
    pub email: Option<FieldView>,
    pub code_label: Option<&'static str>,
    pub cells: Vec<CellView>,
    pub reset: ButtonView,
    pub submit: ButtonView,
    pub error: Option<String>,
    pub disabled: bool,
}

impl DialogHandle {
    /// Snapshot for rendering. `None` while closed.
    ///
    /// Also re-syncs the disabled flags, which picks up changes of the
    /// host's `loading` flag.
    pub fn view(&self) -> Option<DialogView> {
        if !self.is_open() {
            return None;
        }
        self.sync_interaction();

        let state = &self.inner;
        let variant = state.variant;
        let focused = focus::get_focused_index();
        let is_focused = |index: Option<usize>| index.is_some_and(|i| i as i32 == focused);

        let email = self.email_index().map(|index| {
            let value = state.email.get();
            let (text, cursor) = display_text(
                &value,
                Some(EMAIL_PLACEHOLDER),
                interaction::get_cursor_position(index),
            );
            let field_focused = is_focused(Some(index));
            FieldView {
                text,
                placeholder: value.is_empty(),
                cursor: cursor.filter(|_| field_focused),
                focused: field_focused,
            }
        });

        let cells = state.cells.get();
        let cell_views = self
            .cell_indices()
            .into_iter()
            .zip(cells.iter())
            .map(|(index, value)| CellView {
                glyph: cell_glyph(value, variant.masks_code(), DEFAULT_MASK_CHAR),
                filled: !value.is_empty(),
                focused: is_focused(Some(index)),
            })
            .collect();

        let submitting = state.phase.get() == DialogPhase::Submitting;

        Some(DialogView {
            title: variant.title(),
            subtitle: variant.subtitle(),
            helper: variant.helper_text(),
            email_label: variant.requires_email().then_some("Patient Email"),
            email,
            code_label: variant.code_label(),
            cells: cell_views,
            reset: ButtonView {
                label: "Reset",
                enabled: self.can_reset(),
                focused: is_focused(self.reset_button_index()),
            },
            submit: ButtonView {
                label: if submitting { variant.busy_label() } else { variant.submit_label() },
                enabled: self.can_submit(),
                focused: is_focused(self.submit_button_index()),
            },
            error: state.last_error.get(),
            disabled: self.is_disabled(),
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{get_allocated_count, reset_registry};
    use crate::error::SubmitError;
    use crate::state::clipboard;
    use crate::state::input::{route_event, InputEvent};
    use crate::state::keyboard::{KeyboardEvent, Modifiers};
    use futures::channel::oneshot;
    use futures::executor::LocalPool;
    use futures::task::LocalSpawnExt;

    fn setup() {
        reset_registry();
        focus::reset_focus_state();
        keyboard::reset_keyboard_state();
        clipboard::reset_clipboard_state();
        tasks::reset_tasks();
    }

    type Calls = Rc<RefCell<Vec<SubmitRequest>>>;

    /// Dialog whose collaborator resolves immediately with `result`.
    fn dialog_resolving(variant: DialogVariant, result: Result<(), SubmitError>) -> (DialogHandle, Calls) {
        let calls: Calls = Rc::new(RefCell::new(Vec::new()));
        let calls_clone = calls.clone();
        let dialog = code_dialog(CodeDialogProps::new(
            variant,
            Rc::new(move |request| {
                calls_clone.borrow_mut().push(request);
                future::ready(result.clone()).boxed_local()
            }),
        ));
        (dialog, calls)
    }

    fn type_digits(digits: &str) {
        for d in digits.chars() {
            route_event(InputEvent::Key(KeyboardEvent::new(d.to_string())));
        }
    }

    fn run<T: 'static>(pool: &mut LocalPool, fut: LocalBoxFuture<'static, T>) -> Rc<RefCell<Option<T>>> {
        let slot = Rc::new(RefCell::new(None));
        let slot_clone = slot.clone();
        pool.spawner()
            .spawn_local(async move {
                *slot_clone.borrow_mut() = Some(fut.await);
            })
            .unwrap();
        pool.run_until_stalled();
        slot
    }

    #[test]
    fn test_open_mounts_and_focuses_first_cell() {
        setup();
        let (dialog, _) = dialog_resolving(DialogVariant::VaultPin, Ok(()));

        assert_eq!(dialog.phase(), DialogPhase::Closed);
        assert!(dialog.view().is_none());

        dialog.open();
        assert_eq!(dialog.phase(), DialogPhase::Editing);
        let cells = dialog.cell_indices();
        assert_eq!(cells.len(), 6);
        assert_eq!(focus::get_focused_index(), cells[0] as i32);
        assert_eq!(focus::get_focus_trap_container(), dialog.index());
        assert!(dialog.email_index().is_none());

        // Cells, then reset and submit
        let mut expected = cells.clone();
        expected.push(dialog.reset_button_index().unwrap());
        expected.push(dialog.submit_button_index().unwrap());
        assert_eq!(focus::get_focusable_indices(), expected);
    }

    #[test]
    fn test_patient_access_focuses_email() {
        setup();
        let (dialog, _) = dialog_resolving(DialogVariant::PatientAccess, Ok(()));
        dialog.open();

        let email = dialog.email_index().unwrap();
        assert_eq!(focus::get_focused_index(), email as i32);
        assert_eq!(focus::get_focusable_indices()[0], email);
    }

    #[test]
    fn test_close_restores_focus_and_unmounts() {
        setup();

        // Something focused outside the dialog
        let outside = allocate_index(Some("outside"));
        interaction::set_focusable(outside, true);
        focus::focus(outside);

        let closes = Rc::new(Cell::new(0));
        let closes_clone = closes.clone();
        let dialog = code_dialog(CodeDialogProps {
            on_close: Some(Rc::new(move || closes_clone.set(closes_clone.get() + 1))),
            ..CodeDialogProps::new(
                DialogVariant::VaultPin,
                Rc::new(|_| future::ready(Ok(())).boxed_local()),
            )
        });

        dialog.open();
        assert_ne!(focus::get_focused_index(), outside as i32);

        route_event(InputEvent::Key(KeyboardEvent::new("Escape")));
        assert_eq!(dialog.phase(), DialogPhase::Closed);
        assert_eq!(focus::get_focused_index(), outside as i32);
        assert!(!focus::is_focus_trapped());
        assert_eq!(get_allocated_count(), 1);
        assert_eq!(closes.get(), 1);

        // Closing twice does nothing
        dialog.close();
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_submit_skipped_when_incomplete() {
        setup();
        let (dialog, calls) = dialog_resolving(DialogVariant::VaultPin, Ok(()));
        let mut pool = LocalPool::new();

        // Closed
        let outcome = run(&mut pool, dialog.submit());
        assert_eq!(*outcome.borrow(), Some(SubmitOutcome::Skipped));

        dialog.open();
        type_digits("12345");
        assert!(!dialog.can_submit());
        let outcome = run(&mut pool, dialog.submit());
        assert_eq!(*outcome.borrow(), Some(SubmitOutcome::Skipped));
        assert!(calls.borrow().is_empty());
        assert_eq!(dialog.phase(), DialogPhase::Editing);
    }

    #[test]
    fn test_submit_accepted() {
        setup();
        let (dialog, calls) = dialog_resolving(DialogVariant::VaultPin, Ok(()));
        let mut pool = LocalPool::new();

        dialog.open();
        type_digits("123456");
        assert!(dialog.can_submit());

        let outcome = run(&mut pool, dialog.submit());
        assert_eq!(*outcome.borrow(), Some(SubmitOutcome::Accepted));
        assert_eq!(
            calls.borrow()[0].payload,
            SubmitPayload::Pin { code: "123456".into() }
        );
        // The host decides when to close
        assert_eq!(dialog.phase(), DialogPhase::Editing);
    }

    #[test]
    fn test_pending_submit_disables_dialog() {
        setup();

        let (tx, rx) = oneshot::channel::<Result<(), SubmitError>>();
        let rx = RefCell::new(Some(rx));
        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();
        let dialog = code_dialog(CodeDialogProps::new(
            DialogVariant::VaultPin,
            Rc::new(move |_| {
                calls_clone.set(calls_clone.get() + 1);
                let rx = rx.borrow_mut().take();
                async move {
                    match rx {
                        Some(rx) => rx.await.unwrap_or(Err(SubmitError::Network("dropped".into()))),
                        None => Err(SubmitError::Network("no channel".into())),
                    }
                }
                .boxed_local()
            }),
        ));
        let mut pool = LocalPool::new();

        dialog.open();
        type_digits("123456");
        let outcome = run(&mut pool, dialog.submit());

        assert!(outcome.borrow().is_none());
        assert_eq!(dialog.phase(), DialogPhase::Submitting);
        assert!(dialog.is_disabled());
        assert!(!dialog.can_reset());
        let view = dialog.view().unwrap();
        assert_eq!(view.submit.label, "Verifying...");
        assert!(view.disabled);
        for &cell in &dialog.cell_indices() {
            assert!(!interaction::can_focus(cell));
        }

        // Second submit is a no-op
        let second = run(&mut pool, dialog.submit());
        assert_eq!(*second.borrow(), Some(SubmitOutcome::Skipped));
        assert_eq!(calls.get(), 1);

        // Keystrokes are ignored while submitting
        route_event(InputEvent::Key(KeyboardEvent::new("Backspace")));
        assert_eq!(dialog.joined_code(), "123456");

        tx.send(Err(SubmitError::InvalidCredentials)).unwrap();
        pool.run_until_stalled();

        assert_eq!(
            *outcome.borrow(),
            Some(SubmitOutcome::Rejected(SubmitError::InvalidCredentials))
        );
        assert_eq!(dialog.phase(), DialogPhase::Editing);
        assert!(!dialog.is_disabled());
        assert_eq!(dialog.joined_code(), "123456");
        assert_eq!(dialog.last_error().as_deref(), Some("Failed to access medical records"));
        assert!(interaction::can_focus(dialog.cell_indices()[0]));
    }

    #[test]
    fn test_close_during_submit_abandons_result() {
        setup();

        let (tx, rx) = oneshot::channel::<Result<(), SubmitError>>();
        let rx = RefCell::new(Some(rx));
        let dialog = code_dialog(CodeDialogProps::new(
            DialogVariant::VaultPin,
            Rc::new(move |_| {
                let rx = rx.borrow_mut().take();
                async move {
                    match rx {
                        Some(rx) => rx.await.unwrap_or(Ok(())),
                        None => Ok(()),
                    }
                }
                .boxed_local()
            }),
        ));
        let mut pool = LocalPool::new();

        dialog.open();
        type_digits("654321");
        let outcome = run(&mut pool, dialog.submit());
        assert_eq!(dialog.phase(), DialogPhase::Submitting);

        // Close is allowed mid-submit; reopen starts fresh
        dialog.close();
        dialog.open();
        assert_eq!(dialog.phase(), DialogPhase::Editing);
        assert_eq!(dialog.joined_code(), "");

        tx.send(Err(SubmitError::AccessDenied)).unwrap();
        pool.run_until_stalled();

        assert_eq!(
            *outcome.borrow(),
            Some(SubmitOutcome::Rejected(SubmitError::AccessDenied))
        );
        assert_eq!(dialog.phase(), DialogPhase::Editing);
        assert_eq!(dialog.last_error(), None);
    }

    #[test]
    fn test_loading_prop_blocks_everything() {
        setup();

        let loading = signal(true);
        let called = Rc::new(Cell::new(false));
        let called_clone = called.clone();
        let dialog = code_dialog(CodeDialogProps {
            loading: Some(loading.clone().into()),
            ..CodeDialogProps::new(
                DialogVariant::VaultPin,
                Rc::new(move |_| {
                    called_clone.set(true);
                    future::ready(Ok(())).boxed_local()
                }),
            )
        });

        dialog.open();
        let first = dialog.cell_indices()[0];
        // Disabled cells can't take focus
        assert_ne!(focus::get_focused_index(), first as i32);

        // Direct dispatch is still ignored
        assert!(!keyboard::dispatch_focused(first as i32, &KeyboardEvent::new("1")));
        assert!(dialog.is_disabled());

        loading.set(false);
        dialog.view();
        assert!(focus::focus(first));
        type_digits("111111");
        loading.set(true);

        let mut pool = LocalPool::new();
        let outcome = run(&mut pool, dialog.submit());
        assert_eq!(*outcome.borrow(), Some(SubmitOutcome::Skipped));
        assert!(!called.get());
        assert!(!dialog.reset_fields());
        assert_eq!(dialog.joined_code(), "111111");
    }

    #[test]
    fn test_patient_access_requires_email() {
        setup();
        let (dialog, calls) = dialog_resolving(DialogVariant::PatientAccess, Ok(()));
        let mut pool = LocalPool::new();

        dialog.open();
        // Tab from email into the first cell
        focus::focus(dialog.cell_indices()[0]);
        type_digits("123456");
        assert!(!dialog.can_submit());
        // The code alone makes reset available
        assert!(dialog.can_reset());

        focus::focus(dialog.email_index().unwrap());
        for c in "p@x.io".chars() {
            route_event(InputEvent::Key(KeyboardEvent::new(c.to_string())));
        }
        assert!(dialog.can_submit());

        let outcome = run(&mut pool, dialog.submit());
        assert_eq!(*outcome.borrow(), Some(SubmitOutcome::Accepted));
        assert_eq!(
            calls.borrow()[0].payload,
            SubmitPayload::PatientAccess {
                email: "p@x.io".into(),
                code: "123456".into()
            }
        );
    }

    #[test]
    fn test_reset_affordance_and_focus() {
        setup();
        let (dialog, _) = dialog_resolving(DialogVariant::VaultPin, Ok(()));
        dialog.open();
        let cells = dialog.cell_indices();

        assert!(!dialog.can_reset());
        type_digits("12");
        assert!(dialog.can_reset());

        route_event(InputEvent::Key(KeyboardEvent::with_modifiers("r", Modifiers::ctrl())));
        assert_eq!(dialog.joined_code(), "");
        assert_eq!(focus::get_focused_index(), cells[0] as i32);
    }

    #[test]
    fn test_patient_access_reset_keeps_focus() {
        setup();
        let (dialog, _) = dialog_resolving(DialogVariant::PatientAccess, Ok(()));
        dialog.open();
        let email = dialog.email_index().unwrap();
        route_event(InputEvent::Key(KeyboardEvent::new("a")));

        assert!(dialog.reset_fields());
        assert_eq!(dialog.email(), "");
        assert_eq!(focus::get_focused_index(), email as i32);
    }

    #[test]
    fn test_reopen_clears_fields() {
        setup();
        let (dialog, _) = dialog_resolving(DialogVariant::PatientAccess, Ok(()));
        dialog.open();
        route_event(InputEvent::Key(KeyboardEvent::new("a")));
        focus::focus(dialog.cell_indices()[0]);
        type_digits("99");

        dialog.close();
        dialog.open();
        assert_eq!(dialog.email(), "");
        assert_eq!(dialog.code(), vec![String::new(); 6]);
    }

    #[test]
    fn test_enter_submits_in_background() {
        setup();

        let outcomes = Rc::new(RefCell::new(Vec::new()));
        let outcomes_clone = outcomes.clone();
        let dialog = code_dialog(CodeDialogProps {
            on_settled: Some(Rc::new(move |o: &SubmitOutcome| outcomes_clone.borrow_mut().push(o.clone()))),
            ..CodeDialogProps::new(
                DialogVariant::VaultPin,
                Rc::new(|_| future::ready(Ok(())).boxed_local()),
            )
        });

        dialog.open();
        // Incomplete: Enter is swallowed by the dialog but nothing is spawned
        assert!(route_event(InputEvent::Key(KeyboardEvent::new("Enter"))));
        assert_eq!(tasks::pending_tasks(), 0);

        route_event(InputEvent::Paste("123456".into()));
        assert!(route_event(InputEvent::Key(KeyboardEvent::new("Enter"))));
        assert_eq!(dialog.phase(), DialogPhase::Submitting);

        tasks::run_until_stalled();
        assert_eq!(*outcomes.borrow(), vec![SubmitOutcome::Accepted]);
        assert_eq!(dialog.phase(), DialogPhase::Editing);
    }

    #[test]
    fn test_reset_button_activation() {
        setup();
        let (dialog, _) = dialog_resolving(DialogVariant::VaultPin, Ok(()));
        dialog.open();
        type_digits("123456");

        let reset = dialog.reset_button_index().unwrap();
        focus::focus(reset);
        assert!(route_event(InputEvent::Key(KeyboardEvent::new("Enter"))));
        assert_eq!(dialog.joined_code(), "");
        assert_eq!(dialog.phase(), DialogPhase::Editing);
        assert_eq!(focus::get_focused_index(), dialog.cell_indices()[0] as i32);
    }

    #[test]
    fn test_session_travels_with_request() {
        setup();
        let (dialog, calls) = dialog_resolving(DialogVariant::VaultPin, Ok(()));
        dialog.set_session(SessionContext::default().with_token("t0k"));
        let mut pool = LocalPool::new();

        dialog.open();
        type_digits("000000");
        run(&mut pool, dialog.submit());
        assert_eq!(calls.borrow()[0].session.token.as_deref(), Some("t0k"));
    }

    #[test]
    fn test_view_masks_patient_mpin() {
        setup();
        let (dialog, _) = dialog_resolving(DialogVariant::PatientAccess, Ok(()));
        dialog.open();
        focus::focus(dialog.cell_indices()[0]);
        type_digits("42");

        let view = dialog.view().unwrap();
        assert_eq!(view.cells[0].glyph, "•");
        assert_eq!(view.cells[2].glyph, " ");
        assert!(view.cells[2].focused);
        assert_eq!(view.email.unwrap().text, EMAIL_PLACEHOLDER);
        assert_eq!(view.submit.label, "Access Records");
        assert!(!view.submit.enabled);
        assert!(view.reset.enabled);
    }
}
