//! Renderer - Frame buffer, dialog painter and terminal output.
//!
//! ```text
//! DialogView + DialogLayout + Theme ──paint──▶ FrameBuffer ──diff──▶ terminal
//! ```

mod buffer;
mod diff;
mod paint;

pub use buffer::{FrameBuffer, CONTINUATION};
pub use diff::{to_color, DiffRenderer};
pub use paint::{paint_dialog, paint_open_dialog};
