//! Response types for CLI output
//!
//! All types implement Serialize for consistent JSON output.

use serde::Serialize;

use crate::models::diagnostic::Diagnostic;
use crate::models::edit::TextEdit;

/// Diagnostic output with 1-based display positions
#[derive(Debug, Serialize)]
pub struct DiagnosticOutput {
    pub severity: String,
    pub message: String,
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    pub end_column: u32,
    pub code: String,
    pub source: String,
}

impl From<&Diagnostic> for DiagnosticOutput {
    fn from(d: &Diagnostic) -> Self {
        Self {
            severity: d.severity.to_string(),
            message: d.message.clone(),
            line: d.display_line(),
            column: d.display_column(),
            end_line: d.display_end_line(),
            end_column: d.display_end_column(),
            code: d.code.clone(),
            source: d.source.clone(),
        }
    }
}

/// Lint result for a single file
#[derive(Debug, Serialize)]
pub struct FileDiagnostics {
    pub file: String,
    pub count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<DiagnosticOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response for lint command
#[derive(Debug, Serialize)]
pub struct LintResponse {
    pub files: Vec<FileDiagnostics>,
    pub total: usize,
    pub failed: usize,
}

/// Edit output with 1-based display positions
#[derive(Debug, Serialize)]
pub struct EditOutput {
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
    pub new_text: String,
}

impl From<&TextEdit> for EditOutput {
    fn from(edit: &TextEdit) -> Self {
        let (start_line, start_column) = edit.range.start.to_display();
        let (end_line, end_column) = edit.range.end.to_display();
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
            new_text: edit.new_text.clone(),
        }
    }
}

/// Response for format command
#[derive(Debug, Serialize)]
pub struct FormatResponse {
    pub file: String,
    pub changed: bool,
    pub written: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit: Option<EditOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
