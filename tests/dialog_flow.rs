//! End-to-end dialog scenarios driven through input routing, the local task
//! pool and the painter, the way the mount loop drives them.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use futures::FutureExt;
use futures::channel::oneshot;
use spark_signals::signal;
use vault_pin_tui::layout::compute_dialog_layout;
use vault_pin_tui::pipeline::tasks;
use vault_pin_tui::primitives::{
    CodeDialogProps, DialogHandle, DialogPhase, DialogVariant, SubmitOutcome, SubmitPayload,
    SubmitRequest, code_dialog,
};
use vault_pin_tui::renderer::{FrameBuffer, paint_dialog};
use vault_pin_tui::state::input::{InputEvent, route_event};
use vault_pin_tui::state::keyboard::{KeyboardEvent, Modifiers};
use vault_pin_tui::state::{clipboard, focus, global_keys, keyboard};
use vault_pin_tui::theme::terminal;
use vault_pin_tui::{Role, SessionContext, SubmitError, reset_registry};

type Replies = Rc<RefCell<Vec<oneshot::Sender<Result<(), SubmitError>>>>>;
type Requests = Rc<RefCell<Vec<SubmitRequest>>>;
type Outcomes = Rc<RefCell<Vec<SubmitOutcome>>>;

fn setup() {
    reset_registry();
    focus::reset_focus_state();
    keyboard::reset_keyboard_state();
    clipboard::reset_clipboard_state();
    tasks::reset_tasks();
}

struct Harness {
    dialog: DialogHandle,
    requests: Requests,
    replies: Replies,
    outcomes: Outcomes,
}

impl Harness {
    /// Dialog whose collaborator stays pending until `reply` is called.
    fn new(variant: DialogVariant, customize: impl FnOnce(CodeDialogProps) -> CodeDialogProps) -> Self {
        let requests: Requests = Rc::default();
        let replies: Replies = Rc::default();
        let outcomes: Outcomes = Rc::default();

        let (req, rep, out) = (requests.clone(), replies.clone(), outcomes.clone());
        let props = CodeDialogProps {
            on_settled: Some(Rc::new(move |outcome: &SubmitOutcome| {
                out.borrow_mut().push(outcome.clone())
            })),
            ..CodeDialogProps::new(
                variant,
                Rc::new(move |request: SubmitRequest| {
                    req.borrow_mut().push(request);
                    let (tx, rx) = oneshot::channel();
                    rep.borrow_mut().push(tx);
                    rx.map(|r| r.unwrap_or_else(|_| Err(SubmitError::Network("dropped".into()))))
                        .boxed_local()
                }),
            )
        };

        Self {
            dialog: code_dialog(customize(props)),
            requests,
            replies,
            outcomes,
        }
    }

    fn reply(&self, result: Result<(), SubmitError>) {
        let tx = self.replies.borrow_mut().remove(0);
        tx.send(result).unwrap();
        tasks::run_until_stalled();
    }
}

fn key(k: &str) -> bool {
    route_event(InputEvent::Key(KeyboardEvent::new(k)))
}

fn type_text(text: &str) {
    for c in text.chars() {
        key(&c.to_string());
    }
}

fn screen(buf: &FrameBuffer) -> String {
    (0..buf.height()).map(|y| buf.row_text(y)).collect::<Vec<_>>().join("\n")
}

#[test]
fn vault_pin_typed_and_submitted_with_enter() {
    setup();
    let h = Harness::new(DialogVariant::VaultPin, |p| p);
    h.dialog.open();

    type_text("482913");
    assert_eq!(h.dialog.joined_code(), "482913");
    assert!(h.dialog.can_submit());

    assert!(key("Enter"));
    // Spawned but not yet polled
    assert_eq!(tasks::pending_tasks(), 1);
    assert_eq!(h.dialog.phase(), DialogPhase::Submitting);
    assert!(h.dialog.is_disabled());

    tasks::run_until_stalled();
    assert_eq!(h.requests.borrow().len(), 1);
    assert_eq!(
        h.requests.borrow()[0].payload,
        SubmitPayload::Pin {
            code: "482913".into()
        }
    );

    let view = h.dialog.view().unwrap();
    assert_eq!(view.submit.label, "Verifying...");
    assert!(!view.submit.enabled);
    assert!(!view.reset.enabled);

    // Typing while in flight changes nothing
    key("Backspace");
    assert_eq!(h.dialog.joined_code(), "482913");

    h.reply(Ok(()));
    assert_eq!(*h.outcomes.borrow(), vec![SubmitOutcome::Accepted]);
    assert_eq!(h.dialog.phase(), DialogPhase::Editing);
    assert_eq!(tasks::pending_tasks(), 0);
}

#[test]
fn rejection_keeps_code_and_shows_message() {
    setup();
    let h = Harness::new(DialogVariant::VaultPin, |p| p);
    h.dialog.open();
    type_text("111111");
    key("Enter");
    tasks::run_until_stalled();

    h.reply(Err(SubmitError::Server {
        status: 401,
        message: "Invalid PIN".into(),
    }));

    assert_eq!(h.dialog.phase(), DialogPhase::Editing);
    assert_eq!(h.dialog.joined_code(), "111111");
    assert_eq!(h.dialog.last_error().as_deref(), Some("Invalid PIN"));
    assert!(matches!(h.outcomes.borrow()[0], SubmitOutcome::Rejected(SubmitError::Server { status: 401, .. })));

    // A second Enter retries the same code
    key("Enter");
    tasks::run_until_stalled();
    assert_eq!(h.requests.borrow().len(), 2);
    assert_eq!(h.dialog.last_error(), None);
}

#[test]
fn patient_access_email_then_pasted_mpin() {
    setup();
    let session = SessionContext::from_json(r#"{"_id": "doc-9"}"#)
        .unwrap()
        .with_token("tok")
        .with_role(Role::Doctor);
    let h = Harness::new(DialogVariant::PatientAccess, |p| CodeDialogProps { session, ..p });
    let keys = global_keys::setup_global_keys(Arc::new(AtomicBool::new(true)));
    h.dialog.open();

    type_text("asha@example.com");
    assert_eq!(h.dialog.email(), "asha@example.com");

    // Tab to the first cell, then paste the MPIN
    key("Tab");
    assert_eq!(focus::get_focused_index(), h.dialog.cell_indices()[0] as i32);
    assert!(route_event(InputEvent::Paste("907152".into())));
    assert_eq!(h.dialog.joined_code(), "907152");
    assert_eq!(focus::get_focused_index(), h.dialog.cell_indices()[5] as i32);

    key("Enter");
    tasks::run_until_stalled();
    let request = h.requests.borrow()[0].clone();
    assert_eq!(
        request.payload,
        SubmitPayload::PatientAccess {
            email: "asha@example.com".into(),
            code: "907152".into()
        }
    );
    assert_eq!(request.session.bearer_header().as_deref(), Some("Bearer tok"));
    assert_eq!(request.session.role, Role::Doctor);

    keys.cleanup();
}

#[test]
fn paste_ignored_unless_first_cell_focused() {
    setup();
    let h = Harness::new(DialogVariant::VaultPin, |p| p);
    h.dialog.open();

    type_text("1");
    // Focus moved to cell 1
    assert!(!route_event(InputEvent::Paste("999999".into())));
    assert_eq!(h.dialog.joined_code(), "1");

    // Back on the first cell the paste replaces everything from cell 0
    focus::focus(h.dialog.cell_indices()[0]);
    assert!(route_event(InputEvent::Paste("246810".into())));
    assert_eq!(h.dialog.joined_code(), "246810");
}

#[test]
fn close_during_submit_abandons_result() {
    setup();
    let h = Harness::new(DialogVariant::VaultPin, |p| p);
    h.dialog.open();
    type_text("123456");
    key("Enter");
    tasks::run_until_stalled();
    assert_eq!(h.dialog.phase(), DialogPhase::Submitting);

    assert!(key("Escape"));
    assert_eq!(h.dialog.phase(), DialogPhase::Closed);
    assert!(!focus::is_focus_trapped());

    h.reply(Err(SubmitError::InvalidCredentials));
    assert_eq!(h.dialog.phase(), DialogPhase::Closed);
    assert_eq!(h.dialog.last_error(), None);

    // Reopening starts clean
    h.dialog.open();
    assert_eq!(h.dialog.joined_code(), "");
    assert_eq!(h.dialog.phase(), DialogPhase::Editing);
}

#[test]
fn host_loading_flag_disables_everything() {
    setup();
    let loading = signal(false);
    let flag = loading.clone();
    let h = Harness::new(DialogVariant::VaultPin, move |p| CodeDialogProps {
        loading: Some(flag.into()),
        ..p
    });
    h.dialog.open();
    type_text("12345");

    loading.set(true);
    assert!(h.dialog.view().unwrap().disabled);
    type_text("6");
    assert_eq!(h.dialog.joined_code(), "12345");
    key("Enter");
    assert_eq!(tasks::pending_tasks(), 0);

    loading.set(false);
    h.dialog.view();
    focus::focus(h.dialog.cell_indices()[5]);
    type_text("6");
    assert!(h.dialog.can_submit());
}

#[test]
fn ctrl_r_resets_and_tab_stays_trapped() {
    setup();
    let keys = global_keys::setup_global_keys(Arc::new(AtomicBool::new(true)));
    let h = Harness::new(DialogVariant::VaultPin, |p| p);
    h.dialog.open();
    type_text("12");

    route_event(InputEvent::Key(KeyboardEvent::with_modifiers("r", Modifiers::ctrl())));
    assert_eq!(h.dialog.joined_code(), "");
    assert_eq!(focus::get_focused_index(), h.dialog.cell_indices()[0] as i32);

    // 6 cells + reset + submit, then wrap back to the first cell
    for _ in 0..8 {
        key("Tab");
    }
    assert_eq!(focus::get_focused_index(), h.dialog.cell_indices()[0] as i32);
    keys.cleanup();
}

fn paint(dialog: &DialogHandle) -> String {
    let view = dialog.view().unwrap();
    let layout = compute_dialog_layout(&view, 80, 24).unwrap();
    let mut buf = FrameBuffer::new(80, 24);
    paint_dialog(&mut buf, &view, &layout, &terminal());
    screen(&buf)
}

#[test]
fn painted_frame_masks_mpin_but_not_vault_pin() {
    setup();
    let h = Harness::new(DialogVariant::PatientAccess, |p| p);
    h.dialog.open();
    focus::focus(h.dialog.cell_indices()[0]);
    type_text("734");

    let text = paint(&h.dialog);
    assert!(text.contains("Access Patient Records"));
    assert_eq!(text.matches('•').count(), 3);
    assert!(!text.contains('7'));
    h.dialog.close();

    let h = Harness::new(DialogVariant::VaultPin, |p| p);
    h.dialog.open();
    type_text("734");

    let text = paint(&h.dialog);
    assert!(text.contains("Enter Patient PIN"));
    assert_eq!(text.matches('•').count(), 0);
    assert!(text.contains('7') && text.contains('3') && text.contains('4'));
}

#[test]
fn whitespace_email_counts_as_entered() {
    setup();
    let h = Harness::new(DialogVariant::PatientAccess, |p| p);
    h.dialog.open();

    type_text("  ");
    assert_eq!(h.dialog.email(), "  ");
    focus::focus(h.dialog.cell_indices()[0]);
    assert!(route_event(InputEvent::Paste("123456".into())));

    assert!(h.dialog.can_reset());
    assert!(h.dialog.can_submit());

    key("Enter");
    tasks::run_until_stalled();
    assert_eq!(
        h.requests.borrow()[0].payload,
        SubmitPayload::PatientAccess {
            email: "  ".into(),
            code: "123456".into()
        }
    );
}
