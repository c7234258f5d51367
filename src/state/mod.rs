//! State Module - Runtime state management systems
//!
//! This module contains the state systems that power interactivity:
//!
//! - **Focus** - Tab cycling, focus trap, history
//! - **Keyboard** - Event types, dispatch, handler registry
//! - **Clipboard** - Per-component paste handlers
//! - **Input** - crossterm event conversion, polling and routing
//! - **Global keys** - Ctrl+C, Tab/Shift+Tab

pub mod clipboard;
pub mod focus;
pub mod global_keys;
pub mod input;
pub mod keyboard;

pub use focus::*;
pub use keyboard::*;
