//! Command implementations for godot-formatter
//!
//! Each command is implemented in its own module.

pub mod config;
pub mod format;
pub mod lint;
