//! Error types for godot-formatter

use thiserror::Error;

pub type FormatterResult<T> = std::result::Result<T, FormatterError>;

#[derive(Debug, Error)]
pub enum FormatterError {
    #[error("{0}")]
    Invoke(#[from] InvokeError),

    #[error("Edit rejected: {0}")]
    Edit(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FormatterError {
    /// Exit code of the external tool, when the failure came from one
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Invoke(err) => err.exit_code(),
            _ => None,
        }
    }
}

/// Failures of a single subprocess invocation
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("Failed to start '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command: {command}, Code: {code}, Error: {}", fragment(.stderr, .stdout))]
    Exit {
        command: String,
        code: i32,
        stdout: String,
        stderr: String,
    },

    #[error("I/O error while running '{command}': {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl InvokeError {
    const FRAGMENT_LIMIT: usize = 500;

    pub fn is_spawn_failure(&self) -> bool {
        matches!(self, Self::Spawn { .. })
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Exit { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn command(&self) -> &str {
        match self {
            Self::Spawn { command, .. } | Self::Exit { command, .. } | Self::Io { command, .. } => {
                command
            }
        }
    }
}

/// Prefer stderr; fall back to stdout when the tool reported on stdout only.
fn fragment(stderr: &str, stdout: &str) -> String {
    let text = if stderr.trim().is_empty() {
        stdout.trim()
    } else {
        stderr.trim()
    };

    if text.is_empty() {
        return "<no output>".to_string();
    }

    match text.char_indices().nth(InvokeError::FRAGMENT_LIMIT) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Settings parse error in {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Settings file already exists: {0} (use --force to overwrite)")]
    AlreadyExists(String),

    #[error("Settings serialize error: {0}")]
    Serialize(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
