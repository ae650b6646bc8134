//! Data models for godot-formatter
//!
//! Contains core type definitions used throughout the pipeline.

pub mod config;
pub mod diagnostic;
pub mod document;
pub mod edit;

// Re-export commonly used types
pub use config::Configuration;
pub use diagnostic::{Diagnostic, DiagnosticSeverity};
pub use document::{Document, DocumentId};
pub use edit::{Position, Range, TextEdit};
