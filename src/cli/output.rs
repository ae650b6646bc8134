//! JSON output for CLI commands

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Value, json};

/// Shared output settings for every command
#[derive(Debug, Clone)]
pub struct OutputContext {
    /// Paths under this root are printed relative to it
    root: PathBuf,
}

impl OutputContext {
    /// Create a new output context rooted at `root`
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Project root used for relative paths
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a user-supplied path against the root
    pub fn absolute_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Path relative to the root, or the full path when outside it
    pub fn relative_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| path.display().to_string())
    }

    /// Print data fields at the top level next to `"success": true`
    pub fn print_success_flat<T: Serialize>(&self, data: T) {
        print_json(&success_flat(data));
    }

    /// Print `{"success": false, "error": ...}`
    pub fn print_error(&self, message: &str) {
        print_json(&error(message));
    }
}

fn success_flat<T: Serialize>(data: T) -> Value {
    let mut value = serde_json::to_value(data).unwrap_or_else(|_| json!({}));
    match value.as_object_mut() {
        Some(obj) => {
            obj.insert("success".to_string(), json!(true));
            value
        }
        None => json!({ "success": true, "data": value }),
    }
}

fn error(message: &str) -> Value {
    json!({
        "success": false,
        "error": message
    })
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Failed to serialize output: {e}"),
    }
}
