//! Resolved configuration model
//!
//! Flat set of typed options. Values are produced by the settings resolver,
//! which guarantees the numeric fields are positive and the executable path
//! is non-empty.

use serde::{Deserialize, Serialize};

/// Settings namespace read by the resolver
pub const SETTINGS_NAMESPACE: &str = "godotFormatter";

/// Executable name used when no explicit path is configured
pub const DEFAULT_EXECUTABLE: &str = "gdscript-formatter";

/// Setting keys under [`SETTINGS_NAMESPACE`]
pub mod keys {
    pub const ENABLE_FORMATTER: &str = "enableFormatter";
    pub const ENABLE_LINTER: &str = "enableLinter";
    pub const INDENT_SIZE: &str = "indentSize";
    pub const USE_SPACES: &str = "useSpaces";
    pub const REORDER_CODE: &str = "reorderCode";
    pub const SAFE: &str = "safe";
    pub const EXECUTABLE_PATH: &str = "gdscriptFormatterPath";
    pub const USE_BUILT_IN: &str = "useBuiltInBinary";
    pub const MAX_LINE_LENGTH: &str = "maxLineLength";
    pub const IGNORED_RULES: &str = "ignoredRules";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub enabled_format: bool,
    pub enabled_lint: bool,
    pub indent_size: u32,
    pub use_spaces: bool,
    pub reorder_code: bool,
    pub safe: bool,
    pub executable_path: String,
    pub use_built_in: bool,
    pub max_line_length: u32,
    pub ignored_rules: Vec<String>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            enabled_format: defaults::enabled_format(),
            enabled_lint: defaults::enabled_lint(),
            indent_size: defaults::indent_size(),
            use_spaces: defaults::use_spaces(),
            reorder_code: defaults::reorder_code(),
            safe: defaults::safe(),
            executable_path: defaults::executable_path(),
            use_built_in: defaults::use_built_in(),
            max_line_length: defaults::max_line_length(),
            ignored_rules: Vec::new(),
        }
    }
}

impl Configuration {
    /// Whether `--reorder-code` may be passed; safe mode suppresses it
    pub fn reorder_allowed(&self) -> bool {
        self.reorder_code && !self.safe
    }
}

pub(crate) mod defaults {
    pub fn enabled_format() -> bool {
        true
    }
    pub fn enabled_lint() -> bool {
        true
    }
    pub fn indent_size() -> u32 {
        4
    }
    pub fn use_spaces() -> bool {
        false
    }
    pub fn reorder_code() -> bool {
        false
    }
    pub fn safe() -> bool {
        true
    }
    pub fn executable_path() -> String {
        super::DEFAULT_EXECUTABLE.to_string()
    }
    pub fn use_built_in() -> bool {
        true
    }
    pub fn max_line_length() -> u32 {
        100
    }
}
