//! Command construction for the external formatter
//!
//! Commands are argument vectors and are spawned without a shell, so no
//! argument is ever quoted for execution. Quoting only happens when a
//! command is rendered for logs and error messages.

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::models::config::{Configuration, DEFAULT_EXECUTABLE};

/// Line terminator appended to the stdin payload
#[cfg(windows)]
pub const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_ENDING: &str = "\n";

/// Invocation mode of the external tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Format,
    Lint,
}

impl Mode {
    /// Whether an exit code counts as success in this mode.
    ///
    /// The linter reports "findings present" with exit code 1.
    pub fn accepts(self, exit_code: i32) -> bool {
        match self {
            Self::Format => exit_code == 0,
            Self::Lint => exit_code == 0 || exit_code == 1,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Format => write!(f, "format"),
            Self::Lint => write!(f, "lint"),
        }
    }
}

/// Fully built command line for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub mode: Mode,
}

impl CommandInvocation {
    /// Single-string rendering with consistent quoting
    pub fn display(&self) -> String {
        let program = self.program.to_string_lossy();
        std::iter::once(quote_arg(&program))
            .chain(self.args.iter().map(|a| quote_arg(a)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for CommandInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Document text followed by exactly one platform line terminator
pub fn stdin_payload(text: &str) -> Vec<u8> {
    let mut payload = Vec::with_capacity(text.len() + LINE_ENDING.len());
    payload.extend_from_slice(text.as_bytes());
    payload.extend_from_slice(LINE_ENDING.as_bytes());
    payload
}

/// Location of the binary shipped next to the host: `<exe dir>/../binaries/<name>`
pub fn default_built_in_path() -> PathBuf {
    let name = if cfg!(windows) {
        format!("{}.exe", DEFAULT_EXECUTABLE)
    } else {
        DEFAULT_EXECUTABLE.to_string()
    };

    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("..")
        .join("binaries")
        .join(name)
}

/// Builds deterministic command lines from a configuration snapshot
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    built_in: PathBuf,
}

impl CommandBuilder {
    /// Create a builder that falls back to `built_in` when the bundled binary is enabled
    pub fn new(built_in: impl Into<PathBuf>) -> Self {
        Self {
            built_in: built_in.into(),
        }
    }

    /// Location of the bundled binary
    pub fn built_in(&self) -> &Path {
        &self.built_in
    }

    /// Bundled binary when `useBuiltInBinary` is set, otherwise the configured path
    pub fn executable(&self, config: &Configuration) -> PathBuf {
        if config.use_built_in {
            self.built_in.clone()
        } else {
            PathBuf::from(&config.executable_path)
        }
    }

    /// Build the command line for one invocation
    pub fn build(
        &self,
        mode: Mode,
        config: &Configuration,
        document_path: Option<&Path>,
    ) -> CommandInvocation {
        let args = match mode {
            Mode::Format => format_args(config),
            Mode::Lint => lint_args(config, document_path),
        };

        CommandInvocation {
            program: self.executable(config),
            args,
            mode,
        }
    }
}

fn format_args(config: &Configuration) -> Vec<String> {
    let mut args = vec![format!("--indent-size={}", config.indent_size)];
    if config.use_spaces {
        args.push("--use-spaces".to_string());
    }
    if config.reorder_allowed() {
        args.push("--reorder-code".to_string());
    }
    if config.safe {
        args.push("--safe".to_string());
    }
    args
}

fn lint_args(config: &Configuration, document_path: Option<&Path>) -> Vec<String> {
    let mut args = vec!["lint".to_string()];
    if let Some(path) = document_path {
        args.push(path.to_string_lossy().into_owned());
    }
    args.push("--max-line-length".to_string());
    args.push(config.max_line_length.to_string());
    if !config.ignored_rules.is_empty() {
        args.push("--disable".to_string());
        args.push(config.ignored_rules.join(","));
    }
    args
}

fn needs_quoting(arg: &str) -> bool {
    arg.is_empty() || arg.chars().any(|c| c.is_whitespace() || c == '"' || c == '\'')
}

/// Quote an argument for display if it contains whitespace or quotes
#[cfg(not(windows))]
pub fn quote_arg(arg: &str) -> Cow<'_, str> {
    if !needs_quoting(arg) {
        return Cow::Borrowed(arg);
    }
    Cow::Owned(format!("'{}'", arg.replace('\'', r"'\''")))
}

/// Quote an argument for display if it contains whitespace or quotes
#[cfg(windows)]
pub fn quote_arg(arg: &str) -> Cow<'_, str> {
    if !needs_quoting(arg) {
        return Cow::Borrowed(arg);
    }
    Cow::Owned(format!("\"{}\"", arg.replace('"', "\\\"")))
}
