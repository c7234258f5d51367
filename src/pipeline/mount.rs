//! Mount API - Terminal lifecycle and the frame loop.
//!
//! Mounting puts the terminal in raw mode on the alternate screen with
//! bracketed paste enabled, and installs the global keys. Each tick then:
//!
//! 1. Polls one input event (16ms timeout) and routes it
//! 2. Drives in-flight submit futures until they stall
//! 3. Repaints the scene and writes the diff
//!
//! # Example
//!
//! ```ignore
//! use vault_pin_tui::pipeline::mount;
//! use vault_pin_tui::renderer::paint_open_dialog;
//!
//! let scene = dialog.clone();
//! let handle = mount::mount(move |buf| {
//!     paint_open_dialog(buf, &scene, &active_theme());
//! })?;
//!
//! // Option 1: Run blocking event loop
//! mount::run(&handle)?;
//!
//! // Option 2: Tick manually in your own loop
//! while mount::tick(&handle)? {
//!     if !dialog.is_open() { handle.stop(); }
//! }
//!
//! handle.unmount();
//! ```

use std::cell::{Cell, RefCell};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::terminal;

use crate::renderer::{DiffRenderer, FrameBuffer};
use crate::state::input::{self, InputEvent};
use crate::state::global_keys;

use super::tasks;

/// Draws one frame into a cleared buffer.
pub type Scene = Box<dyn Fn(&mut FrameBuffer)>;

// =============================================================================
// Mount Handle
// =============================================================================

/// Handle returned by mount() that allows unmounting.
pub struct MountHandle {
    running: Arc<AtomicBool>,
    global_keys: Option<global_keys::GlobalKeysHandle>,
    scene: Scene,
    buffer: RefCell<FrameBuffer>,
    renderer: RefCell<DiffRenderer>,
    terminal_active: Cell<bool>,
}

impl MountHandle {
    /// Stop the loop, remove global keys and restore the terminal.
    pub fn unmount(mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.global_keys.take() {
            handle.cleanup();
        }
        self.restore_terminal();
        tracing::info!("unmounted");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop the application (sets running to false).
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    fn resize(&self, width: u16, height: u16) {
        tracing::debug!(width, height, "terminal resized");
        self.buffer.borrow_mut().resize(width, height);
        self.renderer.borrow_mut().invalidate();
    }

    /// Repaint the scene and write what changed.
    pub fn render(&self) -> io::Result<bool> {
        let mut buffer = self.buffer.borrow_mut();
        compose(&*self.scene, &mut buffer);
        self.renderer.borrow_mut().render(&buffer)
    }

    fn restore_terminal(&self) {
        if !self.terminal_active.replace(false) {
            return;
        }
        if let Err(err) = input::disable_bracketed_paste() {
            tracing::warn!(error = %err, "failed to disable bracketed paste");
        }
        if let Err(err) = self.renderer.borrow_mut().exit_fullscreen() {
            tracing::warn!(error = %err, "failed to leave alternate screen");
        }
        if let Err(err) = terminal::disable_raw_mode() {
            tracing::warn!(error = %err, "failed to disable raw mode");
        }
    }
}

impl Drop for MountHandle {
    fn drop(&mut self) {
        // Best effort when unmount() was never called
        if let Some(handle) = self.global_keys.take() {
            handle.cleanup();
        }
        self.restore_terminal();
    }
}

/// Clear `buffer` and let the scene draw into it.
pub fn compose(scene: &dyn Fn(&mut FrameBuffer), buffer: &mut FrameBuffer) {
    buffer.clear();
    scene(buffer);
}

// =============================================================================
// Mount Function
// =============================================================================

/// Mount a scene on the terminal.
///
/// This sets up:
/// 1. Raw mode, alternate screen and bracketed paste
/// 2. Global key handlers (Ctrl+C, Tab/Shift+Tab)
/// 3. A frame buffer sized to the terminal
pub fn mount<F>(scene: F) -> io::Result<MountHandle>
where
    F: Fn(&mut FrameBuffer) + 'static,
{
    let (width, height) = terminal::size()?;

    terminal::enable_raw_mode()?;
    let mut handle = MountHandle {
        running: Arc::new(AtomicBool::new(true)),
        global_keys: None,
        scene: Box::new(scene),
        buffer: RefCell::new(FrameBuffer::new(width, height)),
        renderer: RefCell::new(DiffRenderer::new()),
        terminal_active: Cell::new(true),
    };

    // From here on a failure drops the handle, which restores the terminal
    handle.renderer.borrow_mut().enter_fullscreen()?;
    input::enable_bracketed_paste()?;

    handle.global_keys = Some(global_keys::setup_global_keys(handle.running.clone()));

    tracing::info!(width, height, "mounted");
    handle.render()?;
    Ok(handle)
}

/// Unmount and clean up.
pub fn unmount(handle: MountHandle) {
    handle.unmount();
}

// =============================================================================
// Event Loop
// =============================================================================

/// Run the loop once.
///
/// * `Ok(true)` - Continue running
/// * `Ok(false)` - Stop requested (Ctrl+C pressed or `handle.stop()` called)
/// * `Err(e)` - I/O error while polling or drawing
pub fn tick(handle: &MountHandle) -> io::Result<bool> {
    if !handle.is_running() {
        return Ok(false);
    }

    // Poll with short timeout (~60fps)
    match input::poll_event(Duration::from_millis(16))? {
        Some(InputEvent::Resize(width, height)) => handle.resize(width, height),
        Some(event) => {
            input::route_event(event);
        }
        None => {}
    }

    tasks::run_until_stalled();
    handle.render()?;

    Ok(handle.is_running())
}

/// Run the event loop until Ctrl+C or `handle.stop()`.
pub fn run(handle: &MountHandle) -> io::Result<()> {
    while tick(handle)? {}
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
