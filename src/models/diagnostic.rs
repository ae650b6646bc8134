//! Diagnostic model for lint findings

use serde::{Deserialize, Serialize};

use super::edit::Range;

/// Source tag attached to every diagnostic produced by the linter
pub const DIAGNOSTIC_SOURCE: &str = "gdscript-formatter";

/// A positioned lint finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub range: Range,
    pub severity: DiagnosticSeverity,
    /// Rendered message, prefixed with the rule id tag
    pub message: String,
    /// Rule id reported by the linter
    pub code: String,
    pub source: String,
}

impl Diagnostic {
    pub fn new(range: Range, severity: DiagnosticSeverity, rule_id: &str, message: &str) -> Self {
        Self {
            range,
            severity,
            message: format!("[{}] {}", rule_id, message),
            code: rule_id.to_string(),
            source: DIAGNOSTIC_SOURCE.to_string(),
        }
    }

    /// Zero-based line the finding refers to
    pub fn line(&self) -> u32 {
        self.range.start.line
    }

    pub fn display_line(&self) -> u32 {
        self.range.start.line + 1
    }

    pub fn display_column(&self) -> u32 {
        self.range.start.character + 1
    }

    pub fn display_end_line(&self) -> u32 {
        self.range.end.line + 1
    }

    pub fn display_end_column(&self) -> u32 {
        self.range.end.character + 1
    }
}

/// Severity levels reported by the linter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

impl DiagnosticSeverity {
    /// Parse the exact token used in linter output
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "error" => Some(Self::Error),
            "warning" => Some(Self::Warning),
            _ => None,
        }
    }
}

impl std::fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}
