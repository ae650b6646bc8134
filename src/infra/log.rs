//! Host-facing log channel
//!
//! Keeps the lines shown to the user in the host's output panel and mirrors
//! each one to `tracing`.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

/// Name of the output channel the host displays
pub const CHANNEL_NAME: &str = "Godot Formatter";

const MAX_LINES: usize = 1000;

/// Bounded line buffer behind the host output channel
#[derive(Debug)]
pub struct LogSink {
    name: String,
    lines: Mutex<VecDeque<String>>,
    capacity: usize,
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new(CHANNEL_NAME)
    }
}

impl LogSink {
    /// Create a channel with the default capacity
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_capacity(name, MAX_LINES)
    }

    /// Create a channel keeping at most `capacity` lines
    pub fn with_capacity(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            lines: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a line, evicting the oldest one when full
    pub fn append_line(&self, line: impl Into<String>) {
        let line = line.into();
        tracing::warn!(channel = %self.name, "{}", line);

        let mut lines = self.lines.lock().unwrap_or_else(PoisonError::into_inner);
        if lines.len() >= self.capacity {
            lines.pop_front();
        }
        lines.push_back(line);
    }

    /// Snapshot of the buffered lines, oldest first
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
