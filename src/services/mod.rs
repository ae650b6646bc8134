//! Service layer for godot-formatter

pub mod config;
pub mod formatter;
pub mod linter;
pub mod registry;
pub mod settings;
pub mod sink;

#[cfg(test)]
pub(crate) mod testing;

pub use config::TomlSettings;
pub use formatter::FormatService;
pub use linter::{LintOutcome, LintService};
pub use registry::{DiagnosticRegistry, RequestToken};
pub use settings::{MemorySettings, SettingsChange, SettingsResolver, SettingsSource};
pub use sink::{EditSurface, FileEditSurface, ResultSink};
