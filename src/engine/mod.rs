//! Engine - Component registry and interaction arrays.
//!
//! Components are NOT objects. They are indices into parallel arrays:
//!
//! ```text
//! Index 0: Dialog   (parent=None, focusable=false)
//! Index 1: TextField (parent=0,   focusable=true, tab=0)
//! Index 2: CodeCell  (parent=0,   focusable=true, tab=1)
//! ...
//! ```
//!
//! The focus system reads these arrays to decide what can take focus and in
//! which order; primitives write them when they mount.

mod registry;
pub mod interaction;

pub use registry::*;
