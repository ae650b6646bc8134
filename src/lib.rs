//! godot-formatter - GDScript formatting and linting through gdscript-formatter
//!
//! Drives the external `gdscript-formatter` binary over stdin/stdout: builds
//! the command line from the resolved settings, runs the process and turns
//! its output into whole-document text edits or per-document diagnostics.

pub mod app;
pub mod cli;
pub mod error;
pub mod infra;
pub mod models;
pub mod services;

pub use error::{FormatterError, FormatterResult};
