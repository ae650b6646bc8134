//! Settings resolution
//!
//! Reads the `godotFormatter` namespace from a [`SettingsSource`] into a
//! typed [`Configuration`]. Missing or wrong-typed entries fall back to their
//! defaults without surfacing an error. The resolved configuration is cached
//! as an immutable snapshot and replaced wholesale on every relevant change.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;

use crate::models::config::{Configuration, SETTINGS_NAMESPACE, defaults, keys};

/// Read-only view of the host's settings store
pub trait SettingsSource: Send + Sync {
    fn get(&self, namespace: &str, key: &str) -> Option<Value>;
}

/// In-memory settings store the host writes into
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: RwLock<HashMap<String, Value>>,
}

impl MemorySettings {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `namespace.key`
    pub fn set(&self, namespace: &str, key: &str, value: impl Into<Value>) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(qualified(namespace, key), value.into());
    }

    /// Remove `namespace.key`
    pub fn remove(&self, namespace: &str, key: &str) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&qualified(namespace, key));
    }
}

impl SettingsSource for MemorySettings {
    fn get(&self, namespace: &str, key: &str) -> Option<Value> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&qualified(namespace, key))
            .cloned()
    }
}

fn qualified(namespace: &str, key: &str) -> String {
    format!("{}.{}", namespace, key)
}

/// Notification that some settings sections changed
#[derive(Debug, Clone, Default)]
pub struct SettingsChange {
    sections: Vec<String>,
    everything: bool,
}

impl SettingsChange {
    /// A change touching the given sections
    pub fn sections<I, S>(sections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sections: sections.into_iter().map(Into::into).collect(),
            everything: false,
        }
    }

    /// A change that affects every namespace (e.g. the settings file was replaced)
    pub fn everything() -> Self {
        Self {
            sections: Vec::new(),
            everything: true,
        }
    }

    /// Whether `namespace` or one of its keys changed
    pub fn affects(&self, namespace: &str) -> bool {
        self.everything
            || self.sections.iter().any(|section| {
                section == namespace
                    || section
                        .strip_prefix(namespace)
                        .is_some_and(|rest| rest.starts_with('.'))
            })
    }
}

pub type ChangeListener = Box<dyn Fn(&Arc<Configuration>) + Send + Sync>;

/// Resolves and caches the configuration
pub struct SettingsResolver {
    source: Arc<dyn SettingsSource>,
    current: RwLock<Arc<Configuration>>,
    listeners: RwLock<Vec<ChangeListener>>,
}

impl SettingsResolver {
    /// Create a resolver and resolve the initial configuration
    pub fn new(source: Arc<dyn SettingsSource>) -> Self {
        let initial = Arc::new(resolve_from(source.as_ref()));
        Self {
            source,
            current: RwLock::new(initial),
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Read every option with its default; never fails and has no side effects
    pub fn resolve(&self) -> Configuration {
        resolve_from(self.source.as_ref())
    }

    /// Cached configuration; callers keep the snapshot for a whole request
    pub fn snapshot(&self) -> Arc<Configuration> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Register a listener called with every newly resolved configuration.
    ///
    /// Listeners must not register further listeners from inside the callback.
    pub fn on_change<F>(&self, listener: F)
    where
        F: Fn(&Arc<Configuration>) + Send + Sync + 'static,
    {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(listener));
    }

    /// Re-resolve if the change touches our namespace. Returns whether it did.
    pub fn handle_change(&self, change: &SettingsChange) -> bool {
        if !change.affects(SETTINGS_NAMESPACE) {
            return false;
        }
        self.reload();
        true
    }

    /// Unconditionally re-resolve, replace the cache and notify listeners
    pub fn reload(&self) -> Arc<Configuration> {
        let resolved = Arc::new(self.resolve());
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&resolved);
        tracing::debug!("Configuration reloaded: {:?}", resolved);

        for listener in self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
        {
            listener(&resolved);
        }
        resolved
    }
}

fn resolve_from(source: &dyn SettingsSource) -> Configuration {
    let get = |key: &str| source.get(SETTINGS_NAMESPACE, key);

    Configuration {
        enabled_format: read_bool(get(keys::ENABLE_FORMATTER), defaults::enabled_format()),
        enabled_lint: read_bool(get(keys::ENABLE_LINTER), defaults::enabled_lint()),
        indent_size: read_positive(get(keys::INDENT_SIZE), defaults::indent_size()),
        use_spaces: read_bool(get(keys::USE_SPACES), defaults::use_spaces()),
        reorder_code: read_bool(get(keys::REORDER_CODE), defaults::reorder_code()),
        safe: read_bool(get(keys::SAFE), defaults::safe()),
        executable_path: read_path(get(keys::EXECUTABLE_PATH), defaults::executable_path()),
        use_built_in: read_bool(get(keys::USE_BUILT_IN), defaults::use_built_in()),
        max_line_length: read_positive(
            get(keys::MAX_LINE_LENGTH),
            defaults::max_line_length(),
        ),
        ignored_rules: read_rules(get(keys::IGNORED_RULES)),
    }
}

fn read_bool(value: Option<Value>, default: bool) -> bool {
    value.and_then(|v| v.as_bool()).unwrap_or(default)
}

fn read_positive(value: Option<Value>, default: u32) -> u32 {
    value
        .and_then(|v| {
            v.as_u64().or_else(|| {
                // Hosts backed by JSON numbers may hand over 4.0 for 4
                v.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= 1.0 && *f <= f64::from(u32::MAX))
                    .map(|f| f as u64)
            })
        })
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

fn read_path(value: Option<Value>, default: String) -> String {
    value
        .as_ref()
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or(default)
}

/// Comma-separated string or array of strings; order kept, duplicates removed
fn read_rules(value: Option<Value>) -> Vec<String> {
    let raw: Vec<String> = match value {
        Some(Value::String(s)) => s.split(',').map(str::to_string).collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    };

    let mut rules: Vec<String> = Vec::with_capacity(raw.len());
    for rule in raw {
        let rule = rule.trim();
        if !rule.is_empty() && !rules.iter().any(|r| r == rule) {
            rules.push(rule.to_string());
        }
    }
    rules
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;

    fn resolver_with(settings: &[(&str, Value)]) -> (Arc<MemorySettings>, SettingsResolver) {
        let source = Arc::new(MemorySettings::new());
        for (key, value) in settings {
            source.set(SETTINGS_NAMESPACE, key, value.clone());
        }
        let resolver = SettingsResolver::new(source.clone());
        (source, resolver)
    }

    #[test]
    fn test_empty_source_yields_defaults() {
        let (_, resolver) = resolver_with(&[]);
        assert_eq!(resolver.resolve(), Configuration::default());
        assert_eq!(*resolver.snapshot(), Configuration::default());
    }

    #[test]
    fn test_reads_typed_values() {
        let (_, resolver) = resolver_with(&[
            (keys::ENABLE_FORMATTER, json!(false)),
            (keys::INDENT_SIZE, json!(2)),
            (keys::USE_SPACES, json!(true)),
            (keys::REORDER_CODE, json!(true)),
            (keys::SAFE, json!(false)),
            (keys::EXECUTABLE_PATH, json!("  /opt/gdscript-formatter  ")),
            (keys::USE_BUILT_IN, json!(false)),
            (keys::MAX_LINE_LENGTH, json!(120)),
            (keys::IGNORED_RULES, json!("max-line-length, unused-var")),
        ]);
        let config = resolver.resolve();
        assert!(!config.enabled_format);
        assert_eq!(config.indent_size, 2);
        assert!(config.use_spaces);
        assert!(config.reorder_code);
        assert!(!config.safe);
        assert_eq!(config.executable_path, "/opt/gdscript-formatter");
        assert!(!config.use_built_in);
        assert_eq!(config.max_line_length, 120);
        assert_eq!(config.ignored_rules, vec!["max-line-length", "unused-var"]);
    }

    #[test]
    fn test_wrong_types_fall_back() {
        let (_, resolver) = resolver_with(&[
            (keys::ENABLE_LINTER, json!("yes")),
            (keys::INDENT_SIZE, json!("4")),
            (keys::MAX_LINE_LENGTH, json!(-5)),
            (keys::EXECUTABLE_PATH, json!(42)),
            (keys::IGNORED_RULES, json!({"rule": true})),
        ]);
        assert_eq!(resolver.resolve(), Configuration::default());
    }

    #[test]
    fn test_non_positive_numbers_fall_back() {
        let (_, resolver) = resolver_with(&[
            (keys::INDENT_SIZE, json!(0)),
            (keys::MAX_LINE_LENGTH, json!(2.5)),
        ]);
        let config = resolver.resolve();
        assert_eq!(config.indent_size, 4);
        assert_eq!(config.max_line_length, 100);
    }

    #[test]
    fn test_integral_float_accepted() {
        let (_, resolver) = resolver_with(&[(keys::INDENT_SIZE, json!(8.0))]);
        assert_eq!(resolver.resolve().indent_size, 8);
    }

    #[test]
    fn test_blank_path_falls_back_to_default_executable() {
        let (_, resolver) = resolver_with(&[(keys::EXECUTABLE_PATH, json!("   "))]);
        assert_eq!(resolver.resolve().executable_path, "gdscript-formatter");
    }

    #[test]
    fn test_rules_from_array_are_deduplicated() {
        let (_, resolver) = resolver_with(&[(
            keys::IGNORED_RULES,
            json!(["b", " a ", "b", "", 7]),
        )]);
        assert_eq!(resolver.resolve().ignored_rules, vec!["b", "a"]);
    }

    #[test]
    fn test_rules_string_with_empty_segments() {
        let (_, resolver) = resolver_with(&[(keys::IGNORED_RULES, json!(",a,,b ,"))]);
        assert_eq!(resolver.resolve().ignored_rules, vec!["a", "b"]);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let (_, resolver) = resolver_with(&[(keys::INDENT_SIZE, json!(3))]);
        assert_eq!(resolver.resolve(), resolver.resolve());
    }

    #[test]
    fn test_handle_change_filters_namespace() {
        let (source, resolver) = resolver_with(&[]);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        resolver.on_change(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        source.set(SETTINGS_NAMESPACE, keys::INDENT_SIZE, json!(8));

        assert!(!resolver.handle_change(&SettingsChange::sections(["editor.fontSize"])));
        assert_eq!(resolver.snapshot().indent_size, 4);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert!(resolver.handle_change(&SettingsChange::sections(["godotFormatter.indentSize"])));
        assert_eq!(resolver.snapshot().indent_size, 8);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reload_replaces_whole_configuration() {
        let (source, resolver) = resolver_with(&[
            (keys::INDENT_SIZE, json!(8)),
            (keys::USE_SPACES, json!(true)),
        ]);
        let before = resolver.snapshot();
        assert!(before.use_spaces);

        source.remove(SETTINGS_NAMESPACE, keys::USE_SPACES);
        resolver.reload();

        let after = resolver.snapshot();
        assert!(!after.use_spaces);
        assert_eq!(after.indent_size, 8);
        // snapshots taken earlier are untouched
        assert!(before.use_spaces);
    }

    #[test]
    fn test_settings_change_affects() {
        assert!(SettingsChange::sections(["godotFormatter"]).affects(SETTINGS_NAMESPACE));
        assert!(SettingsChange::sections(["godotFormatter.safe"]).affects(SETTINGS_NAMESPACE));
        assert!(!SettingsChange::sections(["godotFormatterX"]).affects(SETTINGS_NAMESPACE));
        assert!(!SettingsChange::default().affects(SETTINGS_NAMESPACE));
        assert!(SettingsChange::everything().affects(SETTINGS_NAMESPACE));
    }
}
