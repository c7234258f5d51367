//! Vault Access Demo - PIN dialog against a simulated records backend.
//!
//! - Type six digits (or paste them), Enter to submit, Escape to quit
//! - `123456` is accepted, anything else is rejected
//! - `--mpin` shows the doctor's patient-access variant with an email field
//! - `--theme portal` switches to the teal palette
//!
//! Run with: cargo run --example vault_access -- --mpin --theme portal
//!
//! Logs go to stderr only when RUST_LOG is set:
//! `RUST_LOG=vault_pin_tui=debug cargo run --example vault_access 2> vault.log`

use std::cell::RefCell;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use futures::channel::oneshot;
use futures::FutureExt;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vault_pin_tui::{
    active_theme, code_dialog, get_preset, mount, set_theme, tick, Attr, CodeDialogProps,
    DialogVariant, Role, SessionContext, SubmitError, SubmitOutcome, SubmitPayload, SubmitRequest,
};
use vault_pin_tui::renderer::paint_open_dialog;

const ACCEPTED_CODE: &str = "123456";

fn init_logging() {
    if std::env::var_os("RUST_LOG").is_none() {
        return;
    }
    let filter = EnvFilter::from_default_env();
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Stand-in for the records API: answers after a short delay.
fn verify(payload: SubmitPayload) -> oneshot::Receiver<Result<(), SubmitError>> {
    let (tx, rx) = oneshot::channel();
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(800));
        let reply = if payload.code() == ACCEPTED_CODE {
            Ok(())
        } else {
            Err(SubmitError::Server {
                status: 401,
                message: "Invalid PIN".into(),
            })
        };
        let _ = tx.send(reply);
    });
    rx
}

fn main() -> std::io::Result<()> {
    init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let variant = if args.iter().any(|a| a == "--mpin") {
        DialogVariant::PatientAccess
    } else {
        DialogVariant::VaultPin
    };
    if let Some(name) = args.windows(2).find(|w| w[0] == "--theme").map(|w| w[1].as_str()) {
        match get_preset(name) {
            Some(theme) => set_theme(theme),
            None => eprintln!("unknown theme {name:?}, using terminal"),
        }
    }

    let session = SessionContext::from_json(r#"{"_id": "doc-17", "phone": "+910000000000"}"#)
        .unwrap_or_default()
        .with_token("demo-token")
        .with_role(if variant.requires_email() { Role::Doctor } else { Role::Patient });

    let status = Rc::new(RefCell::new(String::from("Enter, Escape to quit")));
    let on_settled = {
        let status = status.clone();
        Rc::new(move |outcome: &SubmitOutcome| {
            *status.borrow_mut() = match outcome {
                SubmitOutcome::Accepted => "Access granted".to_string(),
                SubmitOutcome::Rejected(err) => err.user_message(),
                SubmitOutcome::Skipped => return,
            };
        })
    };

    let dialog = code_dialog(CodeDialogProps {
        id: Some("vault".into()),
        on_settled: Some(on_settled),
        session,
        ..CodeDialogProps::new(
            variant,
            Rc::new(|request: SubmitRequest| {
                verify(request.payload)
                    .map(|reply| {
                        reply.unwrap_or_else(|_| Err(SubmitError::Network("backend went away".into())))
                    })
                    .boxed_local()
            }),
        )
    });
    dialog.open();

    let scene = {
        let dialog = dialog.clone();
        let status = status.clone();
        move |buf: &mut vault_pin_tui::FrameBuffer| {
            let theme = active_theme();
            paint_open_dialog(buf, &dialog, &theme);
            let y = buf.height().saturating_sub(1);
            buf.draw_text(1, y, &status.borrow(), theme.text_muted.resolve(), None, Attr::NONE, None);
        }
    };

    let handle = mount(scene)?;
    while tick(&handle)? {
        if !dialog.is_open() || status.borrow().as_str() == "Access granted" {
            handle.stop();
        }
    }
    handle.unmount();

    println!("{}", status.borrow());
    Ok(())
}
