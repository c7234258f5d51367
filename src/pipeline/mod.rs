//! Pipeline - Frame loop and local task execution.
//!
//! ```text
//! input ──route──▶ handlers ──▶ signals
//!                                 │
//! tasks (submit futures) ─────────┤
//!                                 ▼
//!                 scene ──paint──▶ FrameBuffer ──diff──▶ terminal
//! ```

pub mod mount;
pub mod tasks;

pub use mount::{mount, run, tick, unmount, MountHandle, Scene};
